// src/process_discovery.rs

use std::fs;
use std::io;
use std::thread;
use std::time::Duration;

use procfs::process::Process;

use crate::config::MonitorConfig;
use crate::errors::MonitorError;
use crate::log;
use crate::logger::LogLevel;

/// Pause between `/proc` scan passes while waiting for a named process.
const NAME_SCAN_BACKOFF: Duration = Duration::from_millis(100);

/// Probes `/proc/<pid>` for an existing, readable process entry. The stat
/// read doubles as the readability check; a caller seeing `false` for a PID
/// it expected to find should suggest elevated privileges.
pub fn lookup_by_pid(pid: i32) -> bool {
    match Process::new(pid) {
        Ok(process) => process.stat().is_ok(),
        Err(_) => false,
    }
}

/// Checks whether a PID is alive by sending signal 0. The kernel performs
/// the permission checks but delivers nothing.
///
/// `EPERM` means the process exists but belongs to another user, so it still
/// counts as alive.
pub fn is_pid_active(pid: i32) -> bool {
    let ret = unsafe { libc::kill(pid, 0) };
    if ret == 0 {
        true
    } else {
        matches!(
            io::Error::last_os_error().raw_os_error(),
            Some(libc::EPERM)
        )
    }
}

/// Reads the executable name of `pid` from its NUL-separated command line.
/// Returns `None` when the file is unreadable or empty (kernel threads).
pub fn read_process_name(pid: i32) -> Option<String> {
    let process = Process::new(pid).ok()?;
    let cmdline = process.cmdline().ok()?;
    extract_name(&cmdline)
}

/// Name-extraction rule: first non-empty argv element, skipping a leading
/// `sudo`; a path keeps only the component after the last `/`.
pub fn extract_name(argv: &[String]) -> Option<String> {
    let mut elements = argv.iter().filter(|arg| !arg.is_empty());
    let mut candidate = elements.next()?;
    if candidate == "sudo" {
        candidate = elements.next()?;
    }
    let name = match candidate.rsplit('/').next() {
        Some(base) if !base.is_empty() => base,
        _ => candidate.as_str(),
    };
    Some(name.to_string())
}

/// Scans `/proc` until exactly one process matches `name`, returning its PID.
///
/// Each pass enumerates the numeric `/proc` entries in a stable alphabetic
/// order, so the outcome does not depend on readdir order when two matches
/// exist. A pass with no match backs off briefly and rescans; a pass with two
/// or more matches marks the target terminated and fails the wait.
///
/// # Errors
/// - [`MonitorError::TargetAmbiguous`] when a pass finds more than one
///   matching process.
/// - [`MonitorError::Io`] when `/proc` cannot be enumerated.
pub fn wait_for_process_name(config: &MonitorConfig, name: &str) -> Result<i32, MonitorError> {
    loop {
        let scan = scan_process_names()?;
        let matches: Vec<i32> = scan
            .iter()
            .filter(|(_, candidate)| candidate == name)
            .map(|(pid, _)| *pid)
            .collect();

        match matches.len() {
            0 => thread::sleep(NAME_SCAN_BACKOFF),
            1 => {
                let pid = matches[0];
                log!(LogLevel::Debug, "Found process {} with PID {}", name, pid);
                return Ok(pid);
            }
            count => {
                config.set_terminated();
                log!(
                    LogLevel::Error,
                    "More than one matching process found ({}), exiting...",
                    count
                );
                return Err(MonitorError::TargetAmbiguous {
                    name: name.to_string(),
                    count,
                });
            }
        }
    }
}

/// One `/proc` pass: numeric entries only, alphabetic order, names resolved
/// with the cmdline rule. The returned buffer lives for a single scan.
fn scan_process_names() -> Result<Vec<(i32, String)>, MonitorError> {
    let mut entries: Vec<String> = Vec::new();
    for entry in fs::read_dir("/proc")? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.is_empty() && file_name.bytes().all(|b| b.is_ascii_digit()) {
            entries.push(file_name);
        }
    }
    entries.sort();

    let mut names = Vec::new();
    for entry in entries {
        let pid: i32 = match entry.parse() {
            Ok(pid) => pid,
            Err(_) => continue,
        };
        if let Some(name) = read_process_name(pid) {
            names.push((pid, name));
        }
    }
    Ok(names)
}
