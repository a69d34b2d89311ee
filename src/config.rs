//! Configuration management for herakles-target-tracker.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat};
use herakles_target_tracker::process::DEFAULT_PROC_ROOT;

// Default configuration constants
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REFRESH_TIMEOUT_MS: u64 = 800;

const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/herakles/target-tracker.yaml",
    "/etc/herakles/target-tracker.yml",
    "/etc/herakles/target-tracker.json",
    "./herakles-target-tracker.yaml",
    "./herakles-target-tracker.yml",
    "./herakles-target-tracker.json",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Process source
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    // Refresh loop
    #[serde(alias = "refresh-interval-ms")]
    pub refresh_interval_ms: Option<u64>,
    #[serde(alias = "refresh-timeout-ms")]
    pub refresh_timeout_ms: Option<u64>,
    #[serde(alias = "max-processes")]
    pub max_processes: Option<usize>,
    pub parallelism: Option<usize>,

    // Display filters
    #[serde(alias = "include-names")]
    pub include_names: Option<Vec<String>>,
    #[serde(alias = "exclude-names")]
    pub exclude_names: Option<Vec<String>>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            refresh_interval_ms: Some(DEFAULT_REFRESH_INTERVAL_MS),
            refresh_timeout_ms: Some(DEFAULT_REFRESH_TIMEOUT_MS),
            max_processes: None,
            parallelism: None,
            include_names: None,
            exclude_names: None,
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(
            self.refresh_interval_ms
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS),
        )
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms.unwrap_or(DEFAULT_REFRESH_TIMEOUT_MS))
    }

    pub fn include_names(&self) -> &[String] {
        self.include_names.as_deref().unwrap_or_default()
    }

    pub fn exclude_names(&self) -> &[String] {
        self.exclude_names.as_deref().unwrap_or_default()
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    let interval = cfg.refresh_interval_ms.unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
    let timeout = cfg.refresh_timeout_ms.unwrap_or(DEFAULT_REFRESH_TIMEOUT_MS);

    if interval == 0 {
        bail!("refresh_interval_ms must be greater than 0");
    }
    if timeout == 0 {
        bail!("refresh_timeout_ms must be greater than 0");
    }
    if timeout > interval {
        bail!(
            "refresh_timeout_ms ({}) must not exceed refresh_interval_ms ({})",
            timeout,
            interval
        );
    }

    let root = cfg.proc_root();
    if !root.is_dir() {
        bail!("proc_root {} is not a directory", root.display());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
            other => bail!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                other
            ),
        }
    }

    Ok(())
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(ms) = args.refresh_interval_ms {
        config.refresh_interval_ms = Some(ms);
    }
    if let Some(ms) = args.refresh_timeout_ms {
        config.refresh_timeout_ms = Some(ms);
    }
    if args.max_processes.is_some() {
        config.max_processes = args.max_processes;
    }
    if args.parallelism.is_some() {
        config.parallelism = args.parallelism;
    }

    // Parse comma-separated include/exclude names
    if let Some(include_str) = &args.include_names {
        config.include_names = Some(split_names(include_str));
    }
    if let Some(exclude_str) = &args.exclude_names {
        config.exclude_names = Some(split_names(exclude_str));
    }

    Ok(config)
}

/// Loads the configuration file, falling back to defaults when none exists.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Renders configuration in the requested format.
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: &ConfigFormat) -> Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
