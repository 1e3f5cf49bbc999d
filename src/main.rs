// src/main.rs

use std::env;
use std::process::exit;
use std::sync::Arc;

use procmon::cli;
use procmon::config::MonitorConfig;
use procmon::log;
use procmon::logger::{self, LogLevel};
use procmon::monitor;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match cli::parse_arguments(&args) {
        Ok(options) => options,
        Err(err) => exit(err.exit_code()),
    };

    if options.diagnostics {
        logger::set_log_level(LogLevel::Debug);
    }

    let config = Arc::new(MonitorConfig::from_options(options));
    if let Err(err) = monitor::monitor_target(&config) {
        log!(LogLevel::Error, "{}", err);
        exit(err.exit_code());
    }
}
