//! Inspect command implementation.
//!
//! Prints the functions stored in a capture file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::cli::OutputFormat;
use herakles_target_tracker::capture::load_selection;
use herakles_target_tracker::{ApiRole, SelectionRegistry, StatsSnapshot};

#[derive(Debug, Serialize)]
struct FunctionRow {
    name: String,
    pretty_name: String,
    module: String,
    virtual_address: u64,
    size: u64,
    api_role: ApiRole,
    calling_convention: &'static str,
    selected: bool,
    stats: Option<StatsSnapshot>,
}

/// Loads `capture` into a fresh selection and prints every stored function.
pub fn command_inspect(capture: &Path, format: OutputFormat) -> Result<()> {
    let registry = SelectionRegistry::new();
    let loaded = load_selection(capture, &registry)
        .with_context(|| format!("Failed to load capture {}", capture.display()))?;

    let rows: Vec<FunctionRow> = loaded
        .functions
        .iter()
        .map(|f| FunctionRow {
            name: f.name().to_string(),
            pretty_name: f.pretty_name().to_string(),
            module: f.loaded_module_path().to_string(),
            virtual_address: f.virtual_address(),
            size: f.size(),
            api_role: f.api_role(),
            calling_convention: f.calling_convention_str(),
            // a later record at the same address replaces an earlier one
            selected: registry
                .get(f.virtual_address())
                .is_some_and(|owner| Arc::ptr_eq(&owner, f)),
            stats: f.stats_snapshot(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&rows)?),
        OutputFormat::Table => {
            let header = &loaded.header;
            println!("📦 Capture \"{}\"", header.capture_name);
            println!(
                "   saved {} (format v{}, {} functions)",
                header.saved_at.to_rfc3339(),
                header.format_version,
                header.function_count
            );
            println!();
            for row in &rows {
                let marker = if row.selected { "✅" } else { "  " };
                println!(
                    "{} {:#018x}  {:>6}  {:<20}  {}",
                    marker, row.virtual_address, row.size, row.calling_convention, row.pretty_name
                );
                if row.api_role != ApiRole::None {
                    println!("   ├─ API role: {}", row.api_role);
                }
                match &row.stats {
                    Some(stats) if stats.count > 0 => println!(
                        "   └─ calls: {}, mean: {:.0}ns, min: {}ns, max: {}ns, std dev: {:.0}ns",
                        stats.count,
                        stats.mean_ns,
                        stats.min_ns,
                        stats.max_ns,
                        stats.std_dev_ns()
                    ),
                    Some(_) => println!("   └─ no calls recorded"),
                    None => println!("   └─ stats were never recorded"),
                }
            }
            let selected = rows.iter().filter(|r| r.selected).count();
            println!(
                "\n📊 {} functions, {} selected ({} lost to address collisions)",
                rows.len(),
                selected,
                rows.len() - selected
            );
        }
    }

    Ok(())
}
