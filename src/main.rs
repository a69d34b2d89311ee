//! herakles-target-tracker - version 0.1.0
//!
//! Command-line front end for the target tracking library with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

use cli::{Args, Commands, LogLevel, OutputFormat};
use commands::{command_check, command_config, command_inspect, command_list, command_watch};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Effective log level: CLI > config file > info.
fn resolve_log_level(config: &Config, args: &Args) -> LevelFilter {
    if let Some(level) = &args.log_level {
        return match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        };
    }
    match config.log_level.as_deref() {
        Some("off") => LevelFilter::OFF,
        Some("error") => LevelFilter::ERROR,
        Some("warn") => LevelFilter::WARN,
        Some("debug") => LevelFilter::DEBUG,
        Some("trace") => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    }
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = resolve_log_level(config, args);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {}", log_level);
}

/// Sizes the global rayon pool used to read new processes.
fn configure_parallelism(config: &Config) {
    if let Some(threads) = config.parallelism {
        if threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
            {
                Ok(()) => debug!("Rayon thread pool configured with {} threads", threads),
                Err(e) => error!("Failed to set rayon thread pool: {}", e),
            }
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, &args.config_format);
    }

    let config = resolve_config(&args)?;
    setup_logging(&config, &args);

    let command = args.command.unwrap_or(Commands::List {
        format: OutputFormat::Table,
        verbose: false,
    });

    // Commands that run without a validated configuration
    match command {
        Commands::Config {
            output,
            format,
            commented,
        } => return command_config(output, format, commented),
        Commands::Check => return command_check(&config),
        Commands::Inspect { capture, format } => return command_inspect(&capture, format),
        _ => {}
    }

    if let Err(e) = validate_effective_config(&config) {
        bail!("Configuration invalid: {}", e);
    }
    configure_parallelism(&config);

    match command {
        Commands::List { format, verbose } => command_list(format, verbose, &config),
        Commands::Watch { iterations } => {
            info!("Starting herakles-target-tracker");
            command_watch(iterations, &config).await
        }
        Commands::Config { .. } | Commands::Check | Commands::Inspect { .. } => Ok(()),
    }
}
