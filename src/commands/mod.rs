//! CLI command implementations for herakles-target-tracker.
//!
//! This module provides implementations for all CLI subcommands:
//! - `list`: One-shot process list refresh
//! - `watch`: Periodic refresh until interrupted
//! - `inspect`: Capture file listing
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod inspect;
pub mod list;
pub mod watch;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use inspect::command_inspect;
pub use list::command_list;
pub use watch::command_watch;
