// src/config.rs

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::cli::CliOptions;
use crate::events::{ManualResetEvent, Semaphore};
use crate::log;
use crate::logger::LogLevel;

/// Sentinel stored in the gcore-child slot when no dump is in flight.
pub const NO_PID: i32 = -1;

lazy_static::lazy_static! {
    /// Number of online CPUs, fixed for the process lifetime.
    static ref CPU_COUNT: i64 = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

    /// Kernel clock ticks per second.
    static ref CLOCK_TICKS: i64 = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
}

pub fn cpu_count() -> i64 {
    (*CPU_COUNT).max(1)
}

pub fn clock_ticks() -> i64 {
    (*CLOCK_TICKS).max(1)
}

/// The shared monitoring record.
///
/// Trigger selection and policy are sealed before any sampler starts; the
/// runtime fields are scalars with atomic load/store discipline, so no
/// broader lock is needed. One instance is shared (via `Arc`) between the
/// controller, the sampler threads and the signal coordinator.
pub struct MonitorConfig {
    // Target identity. The PID is resolved late for the name form and the
    // name is resolved late for the PID form.
    pid: AtomicI32,
    process_name: Mutex<Option<String>>,
    pub wait_for_name: bool,

    // Trigger selection, sealed.
    pub cpu_threshold: i64,
    pub cpu_below: bool,
    pub commit_threshold_mib: i64,
    pub commit_below: bool,
    pub timer_only: bool,

    // Policy, sealed.
    pub threshold_seconds: u64,
    pub dumps_to_collect: u32,
    pub diagnostics: bool,

    // Kernel facts cached at construction.
    pub n_cpus: i64,
    pub clock_ticks: i64,

    // Runtime state.
    dumps_collected: AtomicU32,
    terminated: AtomicBool,
    quit: AtomicU32,
    gcore_pid: AtomicI32,

    // Coordination.
    pub quit_event: ManualResetEvent,
    pub start_event: ManualResetEvent,
    init_done: ManualResetEvent,
    banner_printed: ManualResetEvent,
    config_printed: ManualResetEvent,
    pub dump_slot: Semaphore,
}

impl MonitorConfig {
    /// Builds the record from a validated option set and caches the kernel
    /// facts the samplers need.
    pub fn from_options(options: CliOptions) -> Self {
        Self {
            pid: AtomicI32::new(options.pid.unwrap_or(NO_PID)),
            wait_for_name: options.process_name.is_some(),
            process_name: Mutex::new(options.process_name),
            cpu_threshold: options.cpu_threshold,
            cpu_below: options.cpu_below,
            commit_threshold_mib: options.commit_threshold_mib,
            commit_below: options.commit_below,
            timer_only: options.timer_only,
            threshold_seconds: options.threshold_seconds,
            dumps_to_collect: options.dumps_to_collect,
            diagnostics: options.diagnostics,
            n_cpus: cpu_count(),
            clock_ticks: clock_ticks(),
            dumps_collected: AtomicU32::new(0),
            terminated: AtomicBool::new(false),
            quit: AtomicU32::new(0),
            gcore_pid: AtomicI32::new(NO_PID),
            quit_event: ManualResetEvent::new(),
            start_event: ManualResetEvent::new(),
            init_done: ManualResetEvent::new(),
            banner_printed: ManualResetEvent::new(),
            config_printed: ManualResetEvent::new(),
            dump_slot: Semaphore::new(1),
        }
    }

    /// One-shot initialization of the runtime state. The first caller zeroes
    /// the counters and resets the runtime latches and returns true; later
    /// callers observe the init latch and return false without touching
    /// anything.
    pub fn initialize(&self) -> bool {
        if !self.init_done.signal_once() {
            return false;
        }
        self.dumps_collected.store(0, Ordering::SeqCst);
        self.terminated.store(false, Ordering::SeqCst);
        self.quit.store(0, Ordering::SeqCst);
        self.gcore_pid.store(NO_PID, Ordering::SeqCst);
        self.quit_event.reset();
        self.start_event.reset();
        log!(LogLevel::Trace, "Monitor configuration initialized");
        true
    }

    /// Releases the coordination state: every latch is cleared and the owned
    /// process name is dropped. The record can be re-initialized afterwards.
    pub fn teardown(&self) {
        self.quit_event.reset();
        self.start_event.reset();
        self.banner_printed.reset();
        self.config_printed.reset();
        self.init_done.reset();
        self.process_name.lock().unwrap().take();
        log!(LogLevel::Trace, "Monitor configuration torn down");
    }

    pub fn pid(&self) -> i32 {
        self.pid.load(Ordering::SeqCst)
    }

    pub fn set_pid(&self, pid: i32) {
        self.pid.store(pid, Ordering::SeqCst);
    }

    pub fn process_name(&self) -> Option<String> {
        self.process_name.lock().unwrap().clone()
    }

    pub fn set_process_name(&self, name: String) {
        *self.process_name.lock().unwrap() = Some(name);
    }

    pub fn dumps_collected(&self) -> u32 {
        self.dumps_collected.load(Ordering::SeqCst)
    }

    /// Counts a successful dump. Callers hold the dump slot across the dump
    /// and this increment, so a concurrent reader sees either the old pair
    /// or a consistent new one.
    pub fn record_dump(&self) {
        self.dumps_collected.fetch_add(1, Ordering::SeqCst);
    }

    pub fn terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// One-way: the terminated flag is never cleared while monitoring.
    pub fn set_terminated(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    /// Raises the quit counter and broadcasts the quit event to every
    /// sampler wait.
    pub fn request_quit(&self) {
        self.quit.fetch_add(1, Ordering::SeqCst);
        self.quit_event.signal();
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst) != 0
    }

    pub fn gcore_pid(&self) -> Option<i32> {
        match self.gcore_pid.load(Ordering::SeqCst) {
            NO_PID => None,
            pid => Some(pid),
        }
    }

    pub fn set_gcore_pid(&self, pid: i32) {
        self.gcore_pid.store(pid, Ordering::SeqCst);
    }

    pub fn clear_gcore_pid(&self) {
        self.gcore_pid.store(NO_PID, Ordering::SeqCst);
    }

    /// Prints the startup banner. Only the first caller prints; later
    /// callers get false.
    pub fn print_banner(&self) -> bool {
        if !self.banner_printed.signal_once() {
            return false;
        }
        println!(
            "procmon v{} - Core dump collector for Linux processes",
            env!("CARGO_PKG_VERSION")
        );
        println!();
        true
    }

    /// Echoes the effective configuration. Only the first caller prints;
    /// later callers get false.
    pub fn print_configuration(&self) -> bool {
        if !self.config_printed.signal_once() {
            return false;
        }
        let target = match self.process_name() {
            Some(name) => name,
            None => format!("PID {}", self.pid()),
        };
        println!("Target:\t\t\t{}", target);
        println!(
            "CPU threshold:\t\t{}",
            threshold_text(self.cpu_threshold, self.cpu_below, "%")
        );
        println!(
            "Commit threshold:\t{}",
            threshold_text(self.commit_threshold_mib, self.commit_below, " MiB")
        );
        println!("Sampling interval:\t{} s", self.threshold_seconds);
        println!("Dumps to collect:\t{}", self.dumps_to_collect);
        println!("Timer mode:\t\t{}", if self.timer_only { "on" } else { "off" });
        println!();
        true
    }
}

fn threshold_text(threshold: i64, below: bool, unit: &str) -> String {
    if threshold < 0 {
        "disabled".to_string()
    } else if below {
        format!("< {}{}", threshold, unit)
    } else {
        format!(">= {}{}", threshold, unit)
    }
}
