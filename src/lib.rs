//! Herakles Target Tracker Library
//!
//! Target tracking core for a native profiler. It keeps the live list of host
//! processes available for instrumentation and the catalogue of functions that
//! can be selected for tracing inside an instrumented process.
//!
//! # Features
//!
//! - **Process list reconciliation**: [`ProcessRegistry`] merges the live process
//!   table with the cached list, keeping stable fields of known pids and skipping
//!   processes that cannot be read
//! - **Function catalogue**: [`Function`] with API role classification, calling
//!   convention lookup and shared timing statistics
//! - **Selection**: [`SelectionRegistry`], a lock-guarded map of selected
//!   functions that never keeps a function alive
//! - **Versioned metadata**: [`codec`] records readable across schema versions,
//!   and [`capture`] files holding a whole selection
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_target_tracker::{Function, ProcessRegistry, ProcfsSource, SelectionRegistry};
//! use std::sync::Arc;
//!
//! let mut processes = ProcessRegistry::new();
//! let report = processes.refresh(&ProcfsSource::default()).expect("refresh");
//! println!("{} processes, {} skipped", report.total(), report.skipped.len());
//!
//! let selection = SelectionRegistry::new();
//! let start = Arc::new(Function::new(
//!     "_ZN9orbit_api5StartEPKc",
//!     "orbit_api::Start(char const*)",
//!     0x2000,
//!     0,
//!     64,
//!     "orbit_api.cc",
//!     10,
//! ));
//! start.select(&selection);
//! assert!(start.is_selected(&selection));
//! ```

pub mod capture;
pub mod codec;
pub mod error;
pub mod function;
pub mod poller;
pub mod process;
pub mod selection;
pub mod stats;

// Re-export main types for convenience
pub use error::{CaptureError, CodecError, PollError, ProcessReadError, RefreshError, SourceError};
pub use function::{ApiRole, Function};
pub use poller::{PollerStats, ProcessPoller, SharedProcessRegistry};
pub use process::{ProcessRegistry, ProcessSnapshot, ProcessSource, ProcfsSource, RefreshReport};
pub use selection::SelectionRegistry;
pub use stats::{FunctionStats, StatsSnapshot, Timer};
