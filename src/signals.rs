// src/signals.rs

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::sys::signal::{SigSet, Signal};

use crate::config::MonitorConfig;
use crate::errors::MonitorError;
use crate::log;
use crate::logger::LogLevel;

/// The signal set owned by the coordinator thread.
fn monitor_sigset() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTERM);
    set
}

/// Blocks INT and TERM on the calling thread. Must run before any worker is
/// spawned so every thread inherits the mask and delivery funnels into the
/// coordinator's blocking wait.
///
/// # Errors
/// - [`MonitorError::Primitive`] when the mask cannot be installed. Fatal.
pub fn block_monitor_signals() -> Result<(), MonitorError> {
    monitor_sigset()
        .thread_block()
        .map_err(|err| MonitorError::Primitive(format!("failed to block signals: {err}")))
}

/// Spawns the signal coordinator: a thread performing a blocking wait on
/// {INT, TERM}. On delivery it raises the quit counter, signals the quit
/// event and kills the process group of any in-flight gcore child so the
/// child's descendants are reaped too.
pub fn spawn_coordinator(config: Arc<MonitorConfig>) -> Result<JoinHandle<()>, MonitorError> {
    thread::Builder::new()
        .name("signal-coordinator".to_string())
        .spawn(move || coordinate(config))
        .map_err(|err| {
            MonitorError::Primitive(format!("failed to spawn signal coordinator: {err}"))
        })
}

fn coordinate(config: Arc<MonitorConfig>) {
    let set = monitor_sigset();
    loop {
        match set.wait() {
            Ok(Signal::SIGINT) | Ok(Signal::SIGTERM) => {
                log!(LogLevel::Info, "Interrupt received, stopping the monitor");
                config.request_quit();
                if let Some(gcore_pid) = config.gcore_pid() {
                    log!(
                        LogLevel::Debug,
                        "Killing in-flight core dump process group {}",
                        gcore_pid
                    );
                    // Negative PID addresses the whole process group.
                    let _ = unsafe { libc::kill(-gcore_pid, libc::SIGKILL) };
                }
                return;
            }
            Ok(other) => {
                // Defensive: the set only holds INT and TERM.
                log!(LogLevel::Warn, "Ignoring unexpected signal {:?}", other);
            }
            Err(err) => {
                log!(LogLevel::Error, "Signal wait failed: {}", err);
                config.request_quit();
                return;
            }
        }
    }
}
