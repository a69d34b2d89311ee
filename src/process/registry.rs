//! Process registry: the cached process list and its reconciliation with the
//! live process table.
//!
//! A refresh reuses the snapshot of every pid it already knows (only the CPU
//! usage is updated) and reads name, command line and word size for new pids.
//! A pid that fails any of those reads is skipped for this cycle; the refresh
//! itself only fails when the CPU map or the candidate list are unavailable.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::error::{ProcessReadError, RefreshError};
use crate::process::source::{parse_pid, CpuUsageMap, ProcessSource};

/// One process as of the last refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub full_path: String,
    pub command_line: String,
    pub is_64_bit: bool,
    pub cpu_usage: f64,
}

/// Ordered snapshot sequence plus its pid index. Built and replaced as one value.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: Vec<ProcessSnapshot>,
    index: HashMap<u32, usize>,
}

impl ProcessTable {
    fn from_processes(processes: Vec<ProcessSnapshot>) -> Self {
        let index = processes
            .iter()
            .enumerate()
            .map(|(i, p)| (p.pid, i))
            .collect();
        Self { processes, index }
    }

    pub fn processes(&self) -> &[ProcessSnapshot] {
        &self.processes
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessSnapshot> {
        self.index.get(&pid).map(|&i| &self.processes[i])
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.index.contains_key(&pid)
    }

    /// Indexed pids, in no particular order.
    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Result of processing one candidate pid.
#[derive(Debug)]
enum CandidateOutcome {
    Reused(ProcessSnapshot),
    Added(ProcessSnapshot),
    Skipped(ProcessReadError),
}

/// Summary of a successful refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub candidates: usize,
    pub reused: usize,
    pub added: usize,
    pub dropped: usize,
    /// New processes left out because the table was already at `max_processes`.
    pub capped: usize,
    pub skipped: Vec<ProcessReadError>,
    pub duration: Duration,
}

impl RefreshReport {
    pub fn total(&self) -> usize {
        self.reused + self.added
    }
}

#[derive(Debug, Default)]
pub struct ProcessRegistry {
    table: ProcessTable,
    max_processes: Option<usize>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the size of the refreshed table.
    ///
    /// Known processes that are still alive are always kept; new processes
    /// fill the remaining room in scan order.
    pub fn with_max_processes(mut self, max: Option<usize>) -> Self {
        self.max_processes = max;
        self
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn processes(&self) -> &[ProcessSnapshot] {
        self.table.processes()
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessSnapshot> {
        self.table.get(pid)
    }

    /// Refreshes the process list. On error the previous list is kept unchanged.
    pub fn refresh(&mut self, source: &dyn ProcessSource) -> Result<RefreshReport, RefreshError> {
        let (table, report) = self.reconcile(source)?;
        self.install(table);
        Ok(report)
    }

    /// Builds the next table without modifying the registry.
    #[instrument(skip_all)]
    pub fn reconcile(
        &self,
        source: &dyn ProcessSource,
    ) -> Result<(ProcessTable, RefreshReport), RefreshError> {
        let start = Instant::now();

        let cpu_usage = source
            .cpu_utilization()
            .map_err(RefreshError::CpuUtilization)?;
        let candidates = source.candidates().map_err(RefreshError::ProcessTable)?;

        let mut seen = HashSet::with_capacity(candidates.len());
        let mut pids: Vec<u32> = candidates
            .iter()
            .filter_map(|c| parse_pid(c))
            .filter(|pid| seen.insert(*pid))
            .collect();

        // par_iter keeps scan order in the collected result
        let outcomes: Vec<CandidateOutcome> = pids
            .par_iter()
            .map(|&pid| self.process_candidate(pid, &cpu_usage, source))
            .collect();

        let mut report = RefreshReport {
            candidates: pids.len(),
            ..RefreshReport::default()
        };
        let mut room = self.max_processes.map(|max| {
            let known = outcomes
                .iter()
                .filter(|o| matches!(o, CandidateOutcome::Reused(_)))
                .count();
            max.saturating_sub(known)
        });
        let mut processes = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Reused(p) => {
                    report.reused += 1;
                    processes.push(p);
                }
                CandidateOutcome::Added(p) => {
                    if let Some(left) = room.as_mut() {
                        if *left == 0 {
                            report.capped += 1;
                            continue;
                        }
                        *left -= 1;
                    }
                    report.added += 1;
                    processes.push(p);
                }
                CandidateOutcome::Skipped(e) => {
                    debug!("Skipping process: {}", e);
                    report.skipped.push(e);
                }
            }
        }

        let table = ProcessTable::from_processes(processes);
        report.dropped = self
            .table
            .pids()
            .filter(|pid| !table.contains(*pid))
            .count();
        report.duration = start.elapsed();

        if report.capped > 0 {
            debug!(
                "Left out {} new processes, table is capped at {:?}",
                report.capped, self.max_processes
            );
        }
        info!(
            "Process list refreshed: {} processes ({} reused, {} added, {} dropped, {} skipped) in {:.2}ms",
            table.len(),
            report.reused,
            report.added,
            report.dropped,
            report.skipped.len(),
            report.duration.as_secs_f64() * 1000.0
        );
        Ok((table, report))
    }

    /// Replaces the sequence and its index in one step.
    pub fn install(&mut self, table: ProcessTable) {
        self.table = table;
    }

    fn process_candidate(
        &self,
        pid: u32,
        cpu_usage: &CpuUsageMap,
        source: &dyn ProcessSource,
    ) -> CandidateOutcome {
        let cpu = cpu_usage.get(&pid).copied().unwrap_or(0.0);

        if let Some(known) = self.table.get(pid) {
            let mut process = known.clone();
            process.cpu_usage = cpu;
            return CandidateOutcome::Reused(process);
        }

        match read_new_process(pid, cpu, source) {
            Ok(process) => CandidateOutcome::Added(process),
            Err(e) => CandidateOutcome::Skipped(e),
        }
    }
}

fn read_new_process(
    pid: u32,
    cpu_usage: f64,
    source: &dyn ProcessSource,
) -> Result<ProcessSnapshot, ProcessReadError> {
    let name = source
        .read_name(pid)
        .map_err(|source| ProcessReadError::Name { pid, source })?;
    if name.is_empty() {
        return Err(ProcessReadError::EmptyName { pid });
    }

    let args = source
        .read_command_line(pid)
        .map_err(|source| ProcessReadError::CommandLine { pid, source })?;

    let is_64_bit = source
        .is_64_bit(pid)
        .map_err(|source| ProcessReadError::WordSize {
            pid,
            name: name.clone(),
            source,
        })?;

    Ok(ProcessSnapshot {
        pid,
        name,
        full_path: args.first().cloned().unwrap_or_default(),
        command_line: args.join(" "),
        is_64_bit,
        cpu_usage,
    })
}
