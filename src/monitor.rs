// src/monitor.rs

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::config::MonitorConfig;
use crate::errors::MonitorError;
use crate::events::{self, ManualResetEvent, MultiWaitState, WaitState};
use crate::log;
use crate::logger::LogLevel;
use crate::process_discovery;
use crate::signals;
use crate::triggers;

/// Outcome of a sampler-facing wait on the quit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorWait {
    /// The quit event signaled; shut down.
    Quit,
    /// The supplied side event signaled first.
    Event,
    /// The timeout elapsed with monitoring still live.
    Timeout,
    /// Monitoring is over: limit reached, terminated flag set or the target
    /// is gone.
    Abandoned,
}

impl MonitorConfig {
    /// The liveness-and-budget predicate consumed by every sampler tick.
    ///
    /// True iff the dump budget has room, the terminated flag is clear and
    /// the target still answers a signal-0 probe. A failed probe sets the
    /// terminated flag, so a false result is permanent.
    pub fn continue_monitoring(&self) -> bool {
        if self.dumps_collected() >= self.dumps_to_collect {
            return false;
        }
        if self.terminated() {
            return false;
        }
        let pid = self.pid();
        if pid <= 0 {
            return false;
        }
        if !process_discovery::is_pid_active(pid) {
            log!(LogLevel::Info, "Target process {} is no longer alive", pid);
            self.set_terminated();
            return false;
        }
        true
    }

    /// Blocks on the quit event for at most `timeout_ms`. The monitoring
    /// guard is checked before the wait and again on timeout.
    pub fn wait_for_quit(&self, timeout_ms: u64) -> MonitorWait {
        if !self.continue_monitoring() {
            return MonitorWait::Abandoned;
        }
        match self.quit_event.wait(Duration::from_millis(timeout_ms)) {
            WaitState::Signaled => MonitorWait::Quit,
            WaitState::TimedOut => {
                if self.continue_monitoring() {
                    MonitorWait::Timeout
                } else {
                    MonitorWait::Abandoned
                }
            }
        }
    }

    /// Blocks on the quit event or `event`, whichever signals first. Quit
    /// wins a tie; quit with monitoring already over degrades to
    /// [`MonitorWait::Abandoned`].
    pub fn wait_for_quit_or_event(
        &self,
        event: &ManualResetEvent,
        timeout_ms: u64,
    ) -> MonitorWait {
        if !self.continue_monitoring() {
            return MonitorWait::Abandoned;
        }
        match events::wait_any(
            &[&self.quit_event, event],
            Duration::from_millis(timeout_ms),
        ) {
            MultiWaitState::Signaled(0) => {
                if self.continue_monitoring() {
                    MonitorWait::Quit
                } else {
                    MonitorWait::Abandoned
                }
            }
            MultiWaitState::Signaled(_) => MonitorWait::Event,
            MultiWaitState::TimedOut => {
                if self.continue_monitoring() {
                    MonitorWait::Timeout
                } else {
                    MonitorWait::Abandoned
                }
            }
            MultiWaitState::Abandoned => MonitorWait::Abandoned,
        }
    }
}

/// Runs a full monitoring session: banner and configuration echo, target
/// resolution, signal coordinator, one sampler thread per enabled trigger,
/// shutdown join and teardown.
///
/// # Errors
/// - [`MonitorError::TargetAmbiguous`] when the name wait matches more than
///   one process.
/// - [`MonitorError::Primitive`] on thread-creation, thread-join or
///   signal-mask failures. Fatal to the process.
pub fn monitor_target(config: &Arc<MonitorConfig>) -> Result<(), MonitorError> {
    config.initialize();
    config.print_banner();
    config.print_configuration();

    if config.wait_for_name {
        let name = config.process_name().unwrap_or_default();
        log!(LogLevel::Info, "Waiting for a process named {} to appear", name);
        let pid = process_discovery::wait_for_process_name(config, &name)?;
        config.set_pid(pid);
    } else if config.process_name().is_none() {
        match process_discovery::read_process_name(config.pid()) {
            Some(name) => config.set_process_name(name),
            None => log!(
                LogLevel::Debug,
                "Could not resolve a name for PID {}",
                config.pid()
            ),
        }
    }

    signals::block_monitor_signals()?;
    let coordinator = signals::spawn_coordinator(Arc::clone(config))?;

    let mut samplers: Vec<JoinHandle<()>> = Vec::new();
    if config.cpu_threshold >= 0 {
        samplers.push(spawn_sampler(
            "cpu-sampler",
            Arc::clone(config),
            triggers::cpu_sampler,
        )?);
    }
    if config.commit_threshold_mib >= 0 {
        samplers.push(spawn_sampler(
            "commit-sampler",
            Arc::clone(config),
            triggers::commit_sampler,
        )?);
    }
    if config.timer_only {
        samplers.push(spawn_sampler(
            "timer-sampler",
            Arc::clone(config),
            triggers::timer_sampler,
        )?);
    }

    config.start_event.signal();
    log!(
        LogLevel::Debug,
        "Monitoring started with {} sampler thread(s)",
        samplers.len()
    );

    for handle in samplers {
        handle
            .join()
            .map_err(|_| MonitorError::Primitive("sampler thread panicked".to_string()))?;
    }

    // Samplers have drained. Close the quit gate, then unblock the
    // coordinator's signal wait with a self-raised SIGTERM so it can be
    // joined.
    config.request_quit();
    signal::kill(Pid::this(), Signal::SIGTERM)
        .map_err(|err| MonitorError::Primitive(format!("failed to raise shutdown signal: {err}")))?;
    coordinator
        .join()
        .map_err(|_| MonitorError::Primitive("signal coordinator panicked".to_string()))?;

    log!(
        LogLevel::Info,
        "Monitoring complete: {} of {} dump(s) collected",
        config.dumps_collected(),
        config.dumps_to_collect
    );
    config.teardown();
    Ok(())
}

fn spawn_sampler(
    name: &str,
    config: Arc<MonitorConfig>,
    body: fn(Arc<MonitorConfig>),
) -> Result<JoinHandle<()>, MonitorError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(config))
        .map_err(|err| MonitorError::Primitive(format!("failed to spawn {name}: {err}")))
}
