// src/cli.rs

use crate::config::cpu_count;
use crate::errors::MonitorError;
use crate::log;
use crate::logger::LogLevel;
use crate::process_discovery;

/// Threshold value meaning "trigger disabled".
pub const THRESHOLD_DISABLED: i64 = -1;

/// Default seconds between samples and dumps when `-s` is not supplied.
pub const DEFAULT_THRESHOLD_SECONDS: u64 = 10;

/// Default number of dumps to collect when `-n` is not supplied.
pub const DEFAULT_DUMP_COUNT: u32 = 1;

/// A validated monitoring request, produced from argv by
/// [`parse_arguments`]. Parsing the same argv twice yields equal records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub pid: Option<i32>,
    pub process_name: Option<String>,
    pub cpu_threshold: i64,
    pub cpu_below: bool,
    pub commit_threshold_mib: i64,
    pub commit_below: bool,
    pub threshold_seconds: u64,
    pub dumps_to_collect: u32,
    pub timer_only: bool,
    pub diagnostics: bool,
}

/// Parses and validates a flat argv (without the program name).
///
/// On any failure the specific error is logged, the usage text is printed
/// and the error is returned; the caller exits nonzero without starting any
/// thread. `-h` takes the same path without the error log line.
pub fn parse_arguments(args: &[String]) -> Result<CliOptions, MonitorError> {
    match parse_inner(args) {
        Ok(options) => Ok(options),
        Err(err) => {
            if !matches!(err, MonitorError::InvalidUsage(ref reason) if reason == "help requested")
            {
                log!(LogLevel::Error, "{}", err);
            }
            print_usage();
            Err(err)
        }
    }
}

fn parse_inner(args: &[String]) -> Result<CliOptions, MonitorError> {
    let mut pid: Option<i32> = None;
    let mut process_name: Option<String> = None;
    let mut cpu_threshold = THRESHOLD_DISABLED;
    let mut cpu_below = false;
    let mut cpu_set = false;
    let mut commit_threshold_mib = THRESHOLD_DISABLED;
    let mut commit_below = false;
    let mut commit_set = false;
    let mut threshold_seconds = DEFAULT_THRESHOLD_SECONDS;
    let mut dumps_to_collect = DEFAULT_DUMP_COUNT;
    let mut diagnostics = false;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "-p" | "--pid" => {
                let value = numeric_argument(flag, iter.next())?;
                let value = i32::try_from(value)
                    .map_err(|_| usage(format!("PID out of range: {value}")))?;
                pid = Some(value);
            }
            "-C" | "--cpu" | "-c" | "--lower-cpu" => {
                if cpu_set {
                    return Err(usage("CPU threshold specified more than once"));
                }
                cpu_set = true;
                cpu_below = matches!(flag.as_str(), "-c" | "--lower-cpu");
                cpu_threshold = numeric_argument(flag, iter.next())?;
            }
            "-M" | "--memory" | "-m" | "--lower-mem" => {
                if commit_set {
                    return Err(usage("memory threshold specified more than once"));
                }
                commit_set = true;
                commit_below = matches!(flag.as_str(), "-m" | "--lower-mem");
                commit_threshold_mib = numeric_argument(flag, iter.next())?;
            }
            "-n" | "--number-of-dumps" => {
                let value = numeric_argument(flag, iter.next())?;
                dumps_to_collect = u32::try_from(value)
                    .map_err(|_| usage(format!("dump count out of range: {value}")))?;
            }
            "-s" | "--time-between-dumps" => {
                let value = numeric_argument(flag, iter.next())?;
                if value == 0 {
                    return Err(usage("time between dumps must be greater than zero"));
                }
                threshold_seconds = value as u64;
            }
            "-w" | "--wait" => {
                let value = iter
                    .next()
                    .ok_or_else(|| usage(format!("{flag} requires a process name")))?;
                process_name = Some(value.clone());
            }
            "-d" | "--diag" => diagnostics = true,
            "-h" | "--help" => return Err(usage("help requested")),
            other => return Err(usage(format!("unknown option: {other}"))),
        }
    }

    // exactly one way of naming the target
    if pid.is_some() == process_name.is_some() {
        return Err(usage("exactly one of -p <pid> or -w <name> must be supplied"));
    }

    let max_cpu = 100 * cpu_count();
    if cpu_set && !(0..=max_cpu).contains(&cpu_threshold) {
        return Err(usage(format!("CPU threshold must lie in [0, {max_cpu}]")));
    }
    if commit_set && commit_threshold_mib < 0 {
        return Err(usage("memory threshold must be at least 0 MiB"));
    }

    if let Some(pid) = pid {
        if !process_discovery::lookup_by_pid(pid) {
            return Err(MonitorError::TargetNotFound(pid));
        }
    }

    let timer_only =
        cpu_threshold == THRESHOLD_DISABLED && commit_threshold_mib == THRESHOLD_DISABLED;

    Ok(CliOptions {
        pid,
        process_name,
        cpu_threshold,
        cpu_below,
        commit_threshold_mib,
        commit_below,
        threshold_seconds,
        dumps_to_collect,
        timer_only,
        diagnostics,
    })
}

fn usage(reason: impl Into<String>) -> MonitorError {
    MonitorError::InvalidUsage(reason.into())
}

/// Numeric option arguments are digits with optional surrounding whitespace;
/// anything else fails, including a leading sign.
fn numeric_argument(flag: &str, value: Option<&String>) -> Result<i64, MonitorError> {
    let raw = value.ok_or_else(|| usage(format!("{flag} requires a numeric argument")))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(usage(format!(
            "{flag} requires a numeric argument, got \"{raw}\""
        )));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| usage(format!("{flag} argument out of range: \"{raw}\"")))
}

/// Prints the option grammar.
pub fn print_usage() {
    println!("Usage: procmon [OPTIONS...] -p <pid>");
    println!("       procmon [OPTIONS...] -w <name>");
    println!();
    println!("Options:");
    println!("  -p, --pid <pid>                Target the process with this PID");
    println!("  -w, --wait <name>              Wait for a process with this name to appear");
    println!("  -C, --cpu <percent>            Dump when CPU usage is at or above this threshold");
    println!("  -c, --lower-cpu <percent>      Dump when CPU usage is below this threshold");
    println!("  -M, --memory <MiB>             Dump when resident memory is at or above this threshold");
    println!("  -m, --lower-mem <MiB>          Dump when resident memory is below this threshold");
    println!("  -n, --number-of-dumps <count>  Number of dumps to collect before exiting (default 1)");
    println!("  -s, --time-between-dumps <s>   Seconds between samples and dumps (default 10)");
    println!("  -d, --diag                     Enable diagnostic logging");
    println!("  -h, --help                     Print this message and exit");
}
