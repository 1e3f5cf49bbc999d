// src/triggers.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use procfs::process::Process;

use crate::config::MonitorConfig;
use crate::core_dump;
use crate::log;
use crate::logger::LogLevel;
use crate::monitor::MonitorWait;

const MIB: u64 = 1024 * 1024;

/// Sampler prologue: the start gate synchronizes the cold-start reads, and a
/// quit before start exits the thread without a single sample.
fn await_start(config: &MonitorConfig) -> bool {
    loop {
        match config.wait_for_quit_or_event(&config.start_event, 100) {
            MonitorWait::Event => return true,
            MonitorWait::Timeout => continue,
            MonitorWait::Quit | MonitorWait::Abandoned => return false,
        }
    }
}

/// CPU trigger loop: one `/proc/<pid>/stat` read per tick, interval-delta
/// percent usage compared against the configured threshold and direction.
pub fn cpu_sampler(config: Arc<MonitorConfig>) {
    if !await_start(&config) {
        return;
    }

    let mut previous = read_cpu_ticks(config.pid());
    let mut previous_at = Instant::now();

    loop {
        match config.wait_for_quit(config.threshold_seconds * 1000) {
            MonitorWait::Quit | MonitorWait::Abandoned => break,
            MonitorWait::Timeout | MonitorWait::Event => {}
        }

        let current = match read_cpu_ticks(config.pid()) {
            Some(ticks) => ticks,
            None => {
                log!(LogLevel::Debug, "Could not sample CPU for PID {}", config.pid());
                continue;
            }
        };
        let now = Instant::now();
        let usage = match previous {
            Some(prev) => cpu_percent(prev, current, now - previous_at, config.clock_ticks),
            None => 0.0,
        };
        previous = Some(current);
        previous_at = now;

        log!(
            LogLevel::Debug,
            "CPU usage for PID {}: {:.1}%",
            config.pid(),
            usage
        );
        let triggered = if config.cpu_below {
            usage < config.cpu_threshold as f64
        } else {
            usage >= config.cpu_threshold as f64
        };
        if triggered {
            dump_on_trigger(&config, &format!("CPU usage {:.1}%", usage));
        }
    }
}

/// Commit trigger loop: resident set from `/proc/<pid>/statm`, in MiB,
/// compared against the configured threshold and direction.
pub fn commit_sampler(config: Arc<MonitorConfig>) {
    if !await_start(&config) {
        return;
    }

    loop {
        match config.wait_for_quit(config.threshold_seconds * 1000) {
            MonitorWait::Quit | MonitorWait::Abandoned => break,
            MonitorWait::Timeout | MonitorWait::Event => {}
        }

        let resident_mib = match read_resident_mib(config.pid()) {
            Some(mib) => mib,
            None => {
                log!(
                    LogLevel::Debug,
                    "Could not sample resident memory for PID {}",
                    config.pid()
                );
                continue;
            }
        };

        log!(
            LogLevel::Debug,
            "Resident memory for PID {}: {} MiB",
            config.pid(),
            resident_mib
        );
        let triggered = if config.commit_below {
            (resident_mib as i64) < config.commit_threshold_mib
        } else {
            resident_mib as i64 >= config.commit_threshold_mib
        };
        if triggered {
            dump_on_trigger(&config, &format!("resident memory {} MiB", resident_mib));
        }
    }
}

/// Timer-only loop: a dump on every tick until the budget is spent.
pub fn timer_sampler(config: Arc<MonitorConfig>) {
    if !await_start(&config) {
        return;
    }

    loop {
        match config.wait_for_quit(config.threshold_seconds * 1000) {
            MonitorWait::Quit | MonitorWait::Abandoned => break,
            MonitorWait::Timeout | MonitorWait::Event => dump_on_trigger(&config, "timer"),
        }
    }
}

/// Shared trigger tail: serialize on the dump slot, re-check the budget and
/// liveness under it, write the core image and count it.
fn dump_on_trigger(config: &MonitorConfig, reason: &str) {
    config.dump_slot.acquire();
    if !config.continue_monitoring() {
        config.dump_slot.release();
        return;
    }
    log!(
        LogLevel::Info,
        "Trigger fired ({}), writing core dump {} of {}",
        reason,
        config.dumps_collected() + 1,
        config.dumps_to_collect
    );
    match core_dump::write_core_dump(config) {
        Ok(path) => {
            config.record_dump();
            log!(LogLevel::Info, "Core dump written to {}", path.display());
        }
        Err(err) => log!(LogLevel::Error, "Core dump failed: {}", err),
    }
    config.dump_slot.release();
}

fn read_cpu_ticks(pid: i32) -> Option<u64> {
    let stat = Process::new(pid).ok()?.stat().ok()?;
    Some(stat.utime + stat.stime)
}

fn cpu_percent(previous: u64, current: u64, elapsed: Duration, clock_ticks: i64) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return 0.0;
    }
    let delta = current.saturating_sub(previous) as f64;
    delta / clock_ticks as f64 / seconds * 100.0
}

fn read_resident_mib(pid: i32) -> Option<u64> {
    let statm = Process::new(pid).ok()?.statm().ok()?;
    Some(statm.resident * procfs::page_size() / MIB)
}
