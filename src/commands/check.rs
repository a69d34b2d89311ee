//! Check command implementation.
//!
//! Validates system requirements and configuration.

use anyhow::{bail, Result};

use crate::config::{validate_effective_config, Config};
use herakles_target_tracker::process::scanner::list_pids;
use herakles_target_tracker::{ProcessRegistry, ProcfsSource};

/// Validates the process source, one refresh and the configuration.
pub fn command_check(config: &Config) -> Result<()> {
    println!("🔍 Herakles Target Tracker - System Check");
    println!("==========================================");

    let mut all_ok = true;
    let root = config.proc_root();

    println!("\n📁 Checking {} ...", root.display());
    match list_pids(&root) {
        Ok(pids) if pids.is_empty() => {
            println!("   ❌ No process entries found");
            all_ok = false;
        }
        Ok(pids) => println!("   ✅ Can list {} process entries", pids.len()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n🔄 Running one refresh...");
    let source = ProcfsSource::new(&root);
    let mut registry = ProcessRegistry::new().with_max_processes(config.max_processes);
    match registry.refresh(&source) {
        Ok(report) => {
            println!(
                "   ✅ {} processes listed in {:.2}ms",
                report.total(),
                report.duration.as_secs_f64() * 1000.0
            );
            if !report.skipped.is_empty() {
                println!(
                    "   ⚠️  {} processes skipped (missing permissions or exited during the scan)",
                    report.skipped.len()
                );
            }
        }
        Err(e) => {
            println!("   ❌ Refresh failed: {}", e);
            all_ok = false;
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        bail!("Some checks failed - please review warnings")
    }
}
