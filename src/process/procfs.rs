//! Linux `/proc` backed process source.

use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::process::cpu::CpuSampler;
use crate::process::scanner::{list_candidates, read_command_line, read_is_64_bit, read_process_name};
use crate::process::source::{CpuUsageMap, ProcessSource};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Reads processes from a procfs tree: one directory per pid containing
/// `comm`, `cmdline`, `stat` and `exe`.
pub struct ProcfsSource {
    root: PathBuf,
    cpu: CpuSampler,
}

impl ProcfsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cpu: CpuSampler::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pid_path(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcessSource for ProcfsSource {
    fn cpu_utilization(&self) -> Result<CpuUsageMap, SourceError> {
        self.cpu.sample(&self.root)
    }

    fn candidates(&self) -> Result<Vec<String>, SourceError> {
        let mut names = list_candidates(&self.root)?;
        // only directories can be processes
        names.retain(|name| self.root.join(name).is_dir());
        Ok(names)
    }

    fn read_name(&self, pid: u32) -> Result<String, SourceError> {
        read_process_name(&self.pid_path(pid))
    }

    fn read_command_line(&self, pid: u32) -> Result<Vec<String>, SourceError> {
        read_command_line(&self.pid_path(pid))
    }

    fn is_64_bit(&self, pid: u32) -> Result<bool, SourceError> {
        read_is_64_bit(&self.pid_path(pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_candidates_only_directories() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("12")).expect("mkdir");
        fs::write(dir.path().join("uptime"), "1.0 2.0").expect("write");

        let source = ProcfsSource::new(dir.path());
        assert_eq!(source.candidates().expect("candidates"), vec!["12".to_string()]);
    }

    #[test]
    fn test_reads_per_process_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let pid_dir = dir.path().join("7");
        fs::create_dir(&pid_dir).expect("mkdir");
        fs::write(pid_dir.join("comm"), "sleep\n").expect("write comm");
        fs::write(pid_dir.join("cmdline"), b"/bin/sleep\x0030\x00").expect("write cmdline");
        fs::write(pid_dir.join("exe"), [0x7f, b'E', b'L', b'F', 2]).expect("write exe");

        let source = ProcfsSource::new(dir.path());
        assert_eq!(source.read_name(7).expect("name"), "sleep");
        assert_eq!(
            source.read_command_line(7).expect("cmdline"),
            vec!["/bin/sleep", "30"]
        );
        assert!(source.is_64_bit(7).expect("word size"));
        assert!(source.read_name(8).is_err());
    }
}
