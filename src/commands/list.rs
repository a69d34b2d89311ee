//! List command implementation.
//!
//! Refreshes the process list and prints it.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::config::Config;
use herakles_target_tracker::process::should_include_process;
use herakles_target_tracker::{ProcessRegistry, ProcessSnapshot, ProcfsSource};

/// Pause between the warm-up refresh and the reported one, so CPU usage has a
/// sampling window.
const CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(250);

/// Refreshes the process list and prints the processes passing the name filters.
pub fn command_list(format: OutputFormat, verbose: bool, config: &Config) -> Result<()> {
    let source = ProcfsSource::new(config.proc_root());
    let mut registry = ProcessRegistry::new().with_max_processes(config.max_processes);

    registry
        .refresh(&source)
        .context("Initial process list refresh failed")?;
    std::thread::sleep(CPU_SAMPLE_WINDOW);
    let report = registry
        .refresh(&source)
        .context("Process list refresh failed")?;

    let shown: Vec<&ProcessSnapshot> = registry
        .processes()
        .iter()
        .filter(|p| should_include_process(&p.name, config.include_names(), config.exclude_names()))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&shown)?),
        OutputFormat::Table => {
            println!(
                "{:>8}  {:<20}  {:>6}  {:>5}  COMMAND",
                "PID", "NAME", "CPU%", "BITS"
            );
            for p in &shown {
                println!(
                    "{:>8}  {:<20}  {:>6.1}  {:>5}  {}",
                    p.pid,
                    truncate(&p.name, 20),
                    p.cpu_usage * 100.0,
                    if p.is_64_bit { 64 } else { 32 },
                    p.command_line
                );
            }
            println!(
                "\n📊 {} shown, {} total, {} skipped ({:.2}ms)",
                shown.len(),
                report.total(),
                report.skipped.len(),
                report.duration.as_secs_f64() * 1000.0
            );
        }
    }

    if verbose {
        for skipped in &report.skipped {
            eprintln!("   ⚠️  {}", skipped);
        }
    }

    Ok(())
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut out: String = name.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
