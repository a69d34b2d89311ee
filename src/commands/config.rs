//! Config command implementation.
//!
//! Generates configuration files in various formats.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(output: Option<PathBuf>, format: ConfigFormat, commented: bool) -> Result<()> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("herakles-target-tracker.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Target Tracker Configuration
# ======================================
#
# Process Source
# --------------
# proc_root: "/proc"           # Root of the process filesystem
#
# Refresh Loop
# ------------
# refresh_interval_ms: 1000    # Time between process list refreshes
# refresh_timeout_ms: 800      # Abandon a refresh after this long (<= interval)
# max_processes: null          # Cap the table; known processes stay, new ones fill the rest (null = all)
# parallelism: null            # Parallel threads for reading new processes (null = auto)
#
# Display Filters
# ---------------
# include_names: null          # Show only processes whose name contains one of these
# exclude_names: null          # Hide processes whose name contains one of these
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_loads_back() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("generated.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml, true).expect("generate");

        let content = fs::read_to_string(&path).expect("read generated");
        assert!(content.starts_with("# Herakles Target Tracker Configuration"));

        let loaded = crate::config::load_config(Some(&path)).expect("load generated");
        assert_eq!(loaded.refresh_interval_ms, Config::default().refresh_interval_ms);
    }
}
