//! Error types for the target tracker.
//!
//! Cycle-wide failures (`RefreshError`) are returned to the caller; per-process
//! failures (`ProcessReadError`) are collected into the refresh report and only
//! logged.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`ProcessSource`](crate::process::ProcessSource).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid format in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SourceError::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single candidate process was left out of a refresh.
#[derive(Error, Debug)]
pub enum ProcessReadError {
    #[error("Failed to read name of pid {pid}: {source}")]
    Name { pid: u32, source: SourceError },

    #[error("Process {pid} has an empty name")]
    EmptyName { pid: u32 },

    #[error("Failed to read command line of pid {pid}: {source}")]
    CommandLine { pid: u32, source: SourceError },

    #[error("Failed to get if process \"{name}\" (pid {pid}) is 64 bit: {source}")]
    WordSize {
        pid: u32,
        name: String,
        source: SourceError,
    },
}

impl ProcessReadError {
    pub fn pid(&self) -> u32 {
        match self {
            ProcessReadError::Name { pid, .. }
            | ProcessReadError::EmptyName { pid }
            | ProcessReadError::CommandLine { pid, .. }
            | ProcessReadError::WordSize { pid, .. } => *pid,
        }
    }
}

/// Failure of a whole refresh cycle. The registry keeps its previous state.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Unable to retrieve cpu usage of processes: {0}")]
    CpuUtilization(#[source] SourceError),

    #[error("Unable to enumerate processes: {0}")]
    ProcessTable(#[source] SourceError),
}

/// Failure of one poller cycle.
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("Process list refresh did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Refresh task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure while encoding or decoding function metadata.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported metadata version {found} (newest known version is {max})")]
    UnsupportedVersion { found: u32, max: u32 },

    #[error("Metadata version 0 is not a valid schema version")]
    InvalidVersion,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure while saving or loading a capture file.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Error opening {} : {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing the capture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Error decoding function record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_error_display() {
        let err = RefreshError::CpuUtilization(SourceError::format("/proc/stat", "no cpu line"));
        assert_eq!(
            err.to_string(),
            "Unable to retrieve cpu usage of processes: Invalid format in /proc/stat: no cpu line"
        );
    }

    #[test]
    fn test_process_read_error_pid() {
        let err = ProcessReadError::WordSize {
            pid: 42,
            name: "bash".to_string(),
            source: SourceError::format("/proc/42/exe", "not an ELF file"),
        };
        assert_eq!(err.pid(), 42);
        assert!(err.to_string().contains("\"bash\" (pid 42)"));
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = CodecError::UnsupportedVersion { found: 9, max: 4 };
        assert!(err.to_string().contains("9"));
        assert!(err.to_string().contains("4"));
    }
}
