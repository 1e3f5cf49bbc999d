// src/errors.rs

use thiserror::Error;

/// Failure kinds surfaced by the monitor core.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Bad flags, conflicting targets or out-of-range values. The parser has
    /// already printed the usage text when this is returned.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// The `-p` probe failed: no such PID, or it is not visible to this user.
    #[error("no process matching PID {0} found; try elevated privileges")]
    TargetNotFound(i32),

    /// A name scan matched two or more processes in a single pass.
    #[error("more than one process matches the name \"{name}\" ({count} found)")]
    TargetAmbiguous { name: String, count: usize },

    /// Thread creation/join or signal-mask manipulation failed. Fatal.
    #[error("monitor primitive failure: {0}")]
    Primitive(String),

    /// The core-dump child exited unsuccessfully. Recoverable; the sampler
    /// skips counting the dump.
    #[error("core dump child failed: {0}")]
    DumpChild(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            MonitorError::Primitive(_) => -1,
            _ => 1,
        }
    }
}
