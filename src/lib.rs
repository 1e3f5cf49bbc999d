// Linux process observer: watches one target process and writes a bounded
// number of core dumps when it crosses configured resource thresholds.
pub mod cli;
pub mod config;
pub mod core_dump;
pub mod errors;
pub mod events;
pub mod logger;
pub mod monitor;
pub mod process_discovery;
pub mod signals;
pub mod triggers;

// tests
#[path = "../src/tests/events_test.rs"]
mod events_test;

#[path = "../src/tests/cli_test.rs"]
mod cli_test;

#[path = "../src/tests/config_test.rs"]
mod config_test;

#[path = "../src/tests/process_discovery_test.rs"]
mod process_discovery_test;

#[path = "../src/tests/monitor_test.rs"]
mod monitor_test;
