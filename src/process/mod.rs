//! Process-related modules for the live process list.
//!
//! This module provides:
//! - `source`: the `ProcessSource` abstraction over the host process table
//! - `procfs`: the Linux `/proc` implementation
//! - `scanner`: per-process file readers
//! - `cpu`: batched CPU utilization sampling
//! - `registry`: reconciliation of the live table with the cached list

pub mod cpu;
pub mod procfs;
pub mod registry;
pub mod scanner;
pub mod source;

pub use cpu::{CpuSampler, CLK_TCK};
pub use procfs::{ProcfsSource, DEFAULT_PROC_ROOT};
pub use registry::{ProcessRegistry, ProcessSnapshot, ProcessTable, RefreshReport};
pub use scanner::should_include_process;
pub use source::{parse_pid, CpuUsageMap, ProcessSource};
