#[cfg(test)]
mod tests {
    use std::process::{Child, Command};
    use std::thread;
    use std::time::Duration;

    use crate::cli::{CliOptions, THRESHOLD_DISABLED};
    use crate::config::MonitorConfig;
    use crate::errors::MonitorError;
    use crate::process_discovery::{
        extract_name, is_pid_active, lookup_by_pid, read_process_name, wait_for_process_name,
    };

    fn spawn_sleep(seconds: &str) -> Child {
        Command::new("sleep")
            .arg(seconds)
            .spawn()
            .expect("spawn sleep")
    }

    fn reap(mut child: Child) {
        child.kill().ok();
        child.wait().ok();
    }

    fn wait_options(name: &str) -> CliOptions {
        CliOptions {
            pid: None,
            process_name: Some(name.to_string()),
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

    #[test]
    fn lookup_finds_the_current_process() {
        assert!(lookup_by_pid(std::process::id() as i32));
        assert!(!lookup_by_pid(999_999_999));
    }

    #[test]
    fn probe_tracks_process_death() {
        let mut child = spawn_sleep("30");
        let pid = child.id() as i32;
        assert!(is_pid_active(pid));
        child.kill().expect("kill child");
        child.wait().expect("reap child");
        assert!(!is_pid_active(pid));
    }

    #[test]
    fn name_extraction_follows_the_cmdline_rules() {
        let argv = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            extract_name(&argv(&["/usr/bin/target", "-x"])),
            Some("target".to_string())
        );
        assert_eq!(extract_name(&argv(&["target"])), Some("target".to_string()));
        assert_eq!(
            extract_name(&argv(&["sudo", "/opt/app/bin/worker"])),
            Some("worker".to_string())
        );
        assert_eq!(
            extract_name(&argv(&["", "relative/path/tool"])),
            Some("tool".to_string())
        );
        assert_eq!(extract_name(&argv(&["sudo"])), None);
        assert_eq!(extract_name(&[]), None);
    }

    #[test]
    fn reads_the_name_of_a_live_child() {
        let child = spawn_sleep("30");
        let pid = child.id() as i32;
        assert_eq!(read_process_name(pid), Some("sleep".to_string()));
        reap(child);
    }

    #[test]
    fn ambiguous_names_mark_the_target_terminated() {
        let first = spawn_sleep("30");
        let second = spawn_sleep("30");
        thread::sleep(Duration::from_millis(50));

        let config = MonitorConfig::from_options(wait_options("sleep"));
        config.initialize();
        let result = wait_for_process_name(&config, "sleep");
        assert!(matches!(
            result,
            Err(MonitorError::TargetAmbiguous { .. })
        ));
        assert!(config.terminated());

        reap(first);
        reap(second);
    }

    #[test]
    fn a_unique_name_resolves_to_its_pid() {
        // A uniquely named copy of sleep keeps this stable on busy hosts.
        let dir = tempfile::tempdir().expect("tempdir");
        let unique = format!("procmon-test-{}", std::process::id());
        let path = dir.path().join(&unique);
        std::fs::copy("/bin/sleep", &path).expect("copy sleep");
        let child = Command::new(&path).arg("30").spawn().expect("spawn copy");
        thread::sleep(Duration::from_millis(50));

        let config = MonitorConfig::from_options(wait_options(&unique));
        config.initialize();
        let pid = wait_for_process_name(&config, &unique).expect("resolve name");
        assert_eq!(pid, child.id() as i32);

        reap(child);
    }
}
