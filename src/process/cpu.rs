//! CPU utilization sampling for the process list.
//!
//! Utilization is computed from the delta of `utime + stime` in
//! `<root>/<pid>/stat` between two samples, as a fraction of one core. The first
//! sample of a pid reports `0.0`.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

use crate::error::SourceError;
use crate::process::scanner::list_pids;
use crate::process::source::CpuUsageMap;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    100.0
}

/// System clock ticks per second (for CPU time calculation).
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// CPU time of one process at the moment it was sampled.
#[derive(Clone, Copy, Debug)]
pub struct CpuEntry {
    pub cpu_time_seconds: f64,
    pub last_updated: Instant,
}

/// Parse total CPU time (user+system) in seconds from `<proc_path>/stat`.
///
/// Fields are counted after the closing parenthesis of `comm`, which may itself
/// contain spaces.
pub fn parse_cpu_time_seconds(proc_path: &Path) -> Result<f64, SourceError> {
    let stat_path = proc_path.join("stat");
    let content = fs::read_to_string(&stat_path).map_err(|e| SourceError::io(&stat_path, e))?;
    parse_stat_cpu_time(&content)
        .map(|ticks| ticks / *CLK_TCK)
        .ok_or_else(|| SourceError::format(&stat_path, "invalid stat format"))
}

/// Returns `utime + stime` in clock ticks.
fn parse_stat_cpu_time(content: &str) -> Option<f64> {
    let after_comm = &content[content.rfind(')')? + 1..];
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    // field 14 (utime) and 15 (stime), counted from field 3 (state)
    let utime: f64 = fields.get(11)?.parse().ok()?;
    let stime: f64 = fields.get(12)?.parse().ok()?;
    Some(utime + stime)
}

/// Batched CPU sampler keeping the previous sample of every pid.
#[derive(Default)]
pub struct CpuSampler {
    previous: Mutex<HashMap<u32, CpuEntry>>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples every process under `root`. Fails only if `root` cannot be listed;
    /// processes whose `stat` cannot be read are left out of the map.
    pub fn sample(&self, root: &Path) -> Result<CpuUsageMap, SourceError> {
        let pids = list_pids(root)?;
        let now = Instant::now();

        let mut previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = HashMap::with_capacity(pids.len());
        let mut usage = CpuUsageMap::with_capacity(pids.len());

        for pid in pids {
            let cpu_time_seconds = match parse_cpu_time_seconds(&root.join(pid.to_string())) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Failed to read CPU time for pid {}: {}", pid, e);
                    continue;
                }
            };

            let fraction = previous
                .get(&pid)
                .map(|entry| {
                    let dt = now.duration_since(entry.last_updated).as_secs_f64();
                    let delta_cpu = cpu_time_seconds - entry.cpu_time_seconds;
                    if dt > 0.0 && delta_cpu > 0.0 {
                        delta_cpu / dt
                    } else {
                        0.0
                    }
                })
                .unwrap_or(0.0);

            usage.insert(pid, fraction);
            current.insert(
                pid,
                CpuEntry {
                    cpu_time_seconds,
                    last_updated: now,
                },
            );
        }

        // pids that vanished are forgotten here
        *previous = current;
        Ok(usage)
    }
}
