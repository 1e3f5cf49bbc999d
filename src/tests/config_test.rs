#[cfg(test)]
mod tests {
    use crate::cli::{CliOptions, THRESHOLD_DISABLED};
    use crate::config::MonitorConfig;

    fn options_for(pid: i32) -> CliOptions {
        CliOptions {
            pid: Some(pid),
            process_name: None,
            cpu_threshold: THRESHOLD_DISABLED,
            cpu_below: false,
            commit_threshold_mib: THRESHOLD_DISABLED,
            commit_below: false,
            threshold_seconds: 1,
            dumps_to_collect: 1,
            timer_only: true,
            diagnostics: false,
        }
    }

    fn config_for_self() -> MonitorConfig {
        MonitorConfig::from_options(options_for(std::process::id() as i32))
    }

    #[test]
    fn initialization_runs_once() {
        let config = config_for_self();
        assert!(config.initialize());
        config.record_dump();
        assert!(
            !config.initialize(),
            "a second initialize must observe the latch"
        );
        assert_eq!(
            config.dumps_collected(),
            1,
            "a second initialize must not reset state"
        );
    }

    #[test]
    fn prints_are_gated_to_one_caller() {
        let config = config_for_self();
        config.initialize();
        assert!(config.print_banner());
        assert!(!config.print_banner());
        assert!(config.print_configuration());
        assert!(!config.print_configuration());
    }

    #[test]
    fn quit_counter_is_sticky() {
        let config = config_for_self();
        config.initialize();
        assert!(!config.quit_requested());
        config.request_quit();
        config.request_quit();
        assert!(config.quit_requested());
        assert!(config.quit_event.is_set());
    }

    #[test]
    fn gcore_slot_roundtrip() {
        let config = config_for_self();
        config.initialize();
        assert_eq!(config.gcore_pid(), None);
        config.set_gcore_pid(4321);
        assert_eq!(config.gcore_pid(), Some(4321));
        config.clear_gcore_pid();
        assert_eq!(config.gcore_pid(), None);
    }

    #[test]
    fn kernel_facts_are_cached() {
        let config = config_for_self();
        assert!(config.n_cpus >= 1);
        assert!(config.clock_ticks >= 1);
    }

    #[test]
    fn teardown_releases_the_owned_name() {
        let config = config_for_self();
        config.initialize();
        config.set_process_name("demo".to_string());
        config.teardown();
        assert_eq!(config.process_name(), None);
        // the record can be brought back up afterwards
        assert!(config.initialize());
    }
}
