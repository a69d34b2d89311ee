//! Abstract process-table source consumed by the registry.
//!
//! The registry never touches the filesystem directly; hosts with a different
//! way of enumerating processes provide their own implementation.

use ahash::AHashMap as HashMap;

use crate::error::SourceError;

/// CPU utilization per pid, as a fraction of one core.
pub type CpuUsageMap = HashMap<u32, f64>;

pub trait ProcessSource: Send + Sync {
    /// CPU utilization of every process, in one batched query.
    fn cpu_utilization(&self) -> Result<CpuUsageMap, SourceError>;

    /// Raw candidate identifiers; entries that are not pids are filtered by the caller.
    fn candidates(&self) -> Result<Vec<String>, SourceError>;

    fn read_name(&self, pid: u32) -> Result<String, SourceError>;

    /// Command line arguments; the first one is the executable path.
    fn read_command_line(&self, pid: u32) -> Result<Vec<String>, SourceError>;

    fn is_64_bit(&self, pid: u32) -> Result<bool, SourceError>;
}

/// Parses a candidate identifier as a positive pid.
pub fn parse_pid(candidate: &str) -> Option<u32> {
    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    candidate.parse::<u32>().ok().filter(|pid| *pid > 0)
}
