// src/core_dump.rs

use std::io;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use chrono::Local;

use crate::config::MonitorConfig;
use crate::errors::MonitorError;
use crate::log;
use crate::logger::LogLevel;

/// Spawns `gcore` against the target and waits for it to finish.
///
/// The child runs in its own session and process group (`setsid`), so the
/// signal coordinator can address it and any of its descendants with a
/// single negative-PID kill. Its PID is published in the configuration while
/// the dump is in flight and cleared after reaping.
///
/// # Errors
/// - [`MonitorError::Io`] when the child cannot be spawned or reaped.
/// - [`MonitorError::DumpChild`] when gcore exits unsuccessfully; the caller
///   does not count the dump.
pub fn write_core_dump(config: &MonitorConfig) -> Result<PathBuf, MonitorError> {
    let pid = config.pid();
    let base = config
        .process_name()
        .unwrap_or_else(|| format!("pid{}", pid));
    let prefix = format!("{}_{}", base, Local::now().format("%y%m%d_%H%M%S"));

    let mut command = Command::new("gcore");
    command.arg("-o").arg(&prefix).arg(pid.to_string());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn()?;
    config.set_gcore_pid(child.id() as i32);
    log!(
        LogLevel::Trace,
        "gcore child {} started for PID {}",
        child.id(),
        pid
    );

    let output = child.wait_with_output();
    config.clear_gcore_pid();
    let output = output?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MonitorError::DumpChild(format!(
            "gcore exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    // gcore names the image <prefix>.<pid>
    Ok(PathBuf::from(format!("{}.{}", prefix, pid)))
}
