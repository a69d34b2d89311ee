//! CLI arguments and subcommands for herakles-target-tracker.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for process and function listings
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-target-tracker",
    about = "Live process list and instrumentable function catalogue for native profiling",
    long_about = "Live process list and instrumentable function catalogue for native profiling.\n\n\
                  Keeps the list of host processes available for instrumentation up to date, \
                  reusing cached entries for known pids and skipping processes that cannot be \
                  read, and inspects saved function selections.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-target-tracker"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides log_level from the config file, default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the process filesystem
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(long)]
    pub refresh_interval_ms: Option<u64>,

    /// Refresh timeout in milliseconds
    #[arg(long)]
    pub refresh_timeout_ms: Option<u64>,

    /// Cap on the process table size (known processes are kept, new ones fill the rest)
    #[arg(long)]
    pub max_processes: Option<usize>,

    /// Parallel processing threads (0 = auto)
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Include only processes matching these names (comma-separated)
    #[arg(long)]
    pub include_names: Option<String>,

    /// Exclude processes matching these names (comma-separated)
    #[arg(long)]
    pub exclude_names: Option<String>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the process list once and print it
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Also print processes that could not be read
        #[arg(long)]
        verbose: bool,
    },

    /// Keep the process list refreshed until interrupted
    Watch {
        /// Stop after N refreshes (0 = run until Ctrl-C)
        #[arg(short = 'n', long, default_value_t = 0)]
        iterations: u64,
    },

    /// Print the functions stored in a capture file
    Inspect {
        /// Capture file written by a previous session
        capture: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate configuration and system requirements
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
