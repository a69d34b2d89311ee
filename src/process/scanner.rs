//! Process scanning utilities for reading process entries from a procfs tree.
//!
//! These functions read the per-process files the registry needs: `comm` for the
//! name, NUL-delimited `cmdline` for the arguments and the ELF header behind
//! `exe` for the word size.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::SourceError;
use crate::process::source::parse_pid;

/// ELF identification: magic followed by the class byte.
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELF_CLASS_32: u8 = 1;
const ELF_CLASS_64: u8 = 2;

/// Lists the entry names of `root`. Non-pid entries are kept; the registry
/// filters them.
pub fn list_candidates(root: &Path) -> Result<Vec<String>, SourceError> {
    let entries = fs::read_dir(root).map_err(|e| SourceError::io(root, e))?;
    let mut out = Vec::new();
    for entry in entries.flatten() {
        if let Some(name) = entry.file_name().to_str() {
            out.push(name.to_string());
        }
    }
    Ok(out)
}

/// Lists pids present under `root`, used by the batched CPU query.
pub fn list_pids(root: &Path) -> Result<Vec<u32>, SourceError> {
    Ok(list_candidates(root)?
        .iter()
        .filter_map(|name| parse_pid(name))
        .collect())
}

/// Reads the process name from `comm`, without the trailing newline.
pub fn read_process_name(proc_path: &Path) -> Result<String, SourceError> {
    let comm = proc_path.join("comm");
    let content = fs::read_to_string(&comm).map_err(|e| SourceError::io(&comm, e))?;
    Ok(content.trim_end().to_string())
}

/// Reads the NUL-separated arguments from `cmdline`.
pub fn read_command_line(proc_path: &Path) -> Result<Vec<String>, SourceError> {
    let cmdline = proc_path.join("cmdline");
    let content = fs::read(&cmdline).map_err(|e| SourceError::io(&cmdline, e))?;
    Ok(split_command_line(&content))
}

/// Splits raw `cmdline` content into arguments.
///
/// Only the terminating NUL is removed; empty arguments inside argv are kept.
pub fn split_command_line(content: &[u8]) -> Vec<String> {
    let content = content.strip_suffix(&[0u8]).unwrap_or(content);
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split(|&b| b == 0u8)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

/// Determines the word size from the ELF class of the executable behind `exe`.
pub fn read_is_64_bit(proc_path: &Path) -> Result<bool, SourceError> {
    let exe = proc_path.join("exe");
    let mut ident = [0u8; 5];
    File::open(&exe)
        .and_then(|mut f| f.read_exact(&mut ident))
        .map_err(|e| SourceError::io(&exe, e))?;

    if ident[..4] != ELF_MAGIC {
        return Err(SourceError::format(&exe, "not an ELF executable"));
    }
    match ident[4] {
        ELF_CLASS_64 => Ok(true),
        ELF_CLASS_32 => Ok(false),
        other => Err(SourceError::format(
            &exe,
            format!("unknown ELF class {other}"),
        )),
    }
}

/// Determines if a process should be shown based on name filters.
pub fn should_include_process(name: &str, include: &[String], exclude: &[String]) -> bool {
    if exclude.iter().any(|s| name.contains(s.as_str())) {
        return false;
    }
    if !include.is_empty() {
        return include.iter().any(|s| name.contains(s.as_str()));
    }
    true
}
