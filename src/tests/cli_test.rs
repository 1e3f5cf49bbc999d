#[cfg(test)]
mod tests {
    use crate::cli::{parse_arguments, THRESHOLD_DISABLED};
    use crate::config::cpu_count;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn self_pid() -> String {
        std::process::id().to_string()
    }

    #[test]
    fn accepts_a_plain_pid_target() {
        let pid = self_pid();
        let options = parse_arguments(&args(&["-p", &pid])).expect("parse");
        assert_eq!(options.pid, Some(std::process::id() as i32));
        assert_eq!(options.process_name, None);
        assert!(options.timer_only);
        assert_eq!(options.dumps_to_collect, 1);
        assert_eq!(options.threshold_seconds, 10);
    }

    #[test]
    fn cpu_bounds_follow_the_cpu_count() {
        let pid = self_pid();
        let limit = 100 * cpu_count();
        assert!(parse_arguments(&args(&["-p", &pid, "-C", "0"])).is_ok());
        assert!(parse_arguments(&args(&["-p", &pid, "-C", &limit.to_string()])).is_ok());
        assert!(parse_arguments(&args(&["-p", &pid, "-C", &(limit + 1).to_string()])).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let pid = self_pid();
        assert!(parse_arguments(&args(&["-p", &pid, "-s", "0"])).is_err());
        assert!(parse_arguments(&args(&["-p", &pid, "-s", "1"])).is_ok());
    }

    #[test]
    fn thresholds_can_only_be_set_once() {
        let pid = self_pid();
        assert!(parse_arguments(&args(&["-p", &pid, "-C", "50", "-c", "10"])).is_err());
        assert!(parse_arguments(&args(&["-p", &pid, "-M", "100", "-m", "10"])).is_err());
    }

    #[test]
    fn exactly_one_target_is_required() {
        assert!(parse_arguments(&args(&["-n", "2"])).is_err());
        assert!(parse_arguments(&args(&["-p", &self_pid(), "-w", "bash"])).is_err());
    }

    #[test]
    fn nonexistent_pids_are_rejected() {
        assert!(parse_arguments(&args(&["-p", "999999999"])).is_err());
    }

    #[test]
    fn numeric_arguments_must_be_digits() {
        let pid = self_pid();
        assert!(parse_arguments(&args(&["-p", &pid, "-n", "3x"])).is_err());
        assert!(parse_arguments(&args(&["-p", &pid, "-n", "-3"])).is_err());
        assert!(parse_arguments(&args(&["-p", &pid, "-n", " 3 "])).is_ok());
    }

    #[test]
    fn lower_cpu_form_sets_the_direction() {
        let pid = self_pid();
        let options = parse_arguments(&args(&["-p", &pid, "-c", "25"])).expect("parse");
        assert!(options.cpu_below);
        assert_eq!(options.cpu_threshold, 25);
        assert!(!options.timer_only);
    }

    #[test]
    fn any_threshold_disables_the_timer_mode() {
        let pid = self_pid();
        let options = parse_arguments(&args(&["-p", &pid, "-M", "100"])).expect("parse");
        assert!(!options.timer_only);
        assert_eq!(options.commit_threshold_mib, 100);
        assert_eq!(options.cpu_threshold, THRESHOLD_DISABLED);
    }

    #[test]
    fn help_exits_with_a_usage_error() {
        assert!(parse_arguments(&args(&["-h"])).is_err());
    }

    #[test]
    fn a_zero_dump_count_is_accepted() {
        let pid = self_pid();
        let options = parse_arguments(&args(&["-p", &pid, "-n", "0"])).expect("parse");
        assert_eq!(options.dumps_to_collect, 0);
    }

    #[test]
    fn parsing_is_repeatable() {
        let pid = self_pid();
        let argv = args(&["-p", &pid, "-C", "80", "-n", "5", "-s", "2", "-d"]);
        let first = parse_arguments(&argv).expect("first parse");
        let second = parse_arguments(&argv).expect("second parse");
        assert_eq!(first, second);
    }

    #[test]
    fn waiting_on_a_name_skips_the_pid_probe() {
        let options =
            parse_arguments(&args(&["-w", "some-process", "-n", "2"])).expect("parse");
        assert_eq!(options.process_name.as_deref(), Some("some-process"));
        assert_eq!(options.pid, None);
        assert_eq!(options.dumps_to_collect, 2);
    }
}
