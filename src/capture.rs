//! Saving and loading the selected function set.
//!
//! A capture file is a JSON document with a header and one versioned
//! [`FunctionRecord`] per selected function.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::codec::{self, FunctionRecord, CURRENT_VERSION};
use crate::error::CaptureError;
use crate::function::Function;
use crate::selection::SelectionRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureHeader {
    pub capture_name: String,
    pub saved_at: DateTime<Utc>,
    pub format_version: u32,
    pub function_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CaptureDocument {
    header: CaptureHeader,
    functions: Vec<FunctionRecord>,
}

/// Functions read from a capture. The caller owns them; a registry only holds
/// weak links.
#[derive(Debug)]
pub struct LoadedCapture {
    pub header: CaptureHeader,
    pub functions: Vec<Arc<Function>>,
}

/// Writes every live selected function of `registry` to `path`.
#[instrument(skip(registry))]
pub fn save_selection(
    path: &Path,
    capture_name: &str,
    registry: &SelectionRegistry,
) -> Result<CaptureHeader, CaptureError> {
    let start = Instant::now();
    let functions: Vec<FunctionRecord> = registry
        .selected_functions()
        .iter()
        .map(|f| codec::encode(f))
        .collect();

    let header = CaptureHeader {
        capture_name: capture_name.to_string(),
        saved_at: Utc::now(),
        format_version: CURRENT_VERSION,
        function_count: functions.len(),
    };
    let document = CaptureDocument {
        header: header.clone(),
        functions,
    };

    let file = File::create(path).map_err(|source| CaptureError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;

    info!(
        "Saved {} selected functions to \"{}\" in {:.2}ms",
        header.function_count,
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(header)
}

/// Reads and decodes a capture without touching any registry.
pub fn read_capture(path: &Path) -> Result<LoadedCapture, CaptureError> {
    let file = File::open(path).map_err(|source| CaptureError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let document: CaptureDocument = serde_json::from_reader(BufReader::new(file))?;

    let functions = document
        .functions
        .iter()
        .enumerate()
        .map(|(index, record)| {
            codec::decode(record)
                .map(Arc::new)
                .map_err(|source| CaptureError::Record { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoadedCapture {
        header: document.header,
        functions,
    })
}

/// Replaces the selection in `registry` with the functions stored in `path`.
/// The registry is only modified once every record decoded successfully.
#[instrument(skip(registry))]
pub fn load_selection(
    path: &Path,
    registry: &SelectionRegistry,
) -> Result<LoadedCapture, CaptureError> {
    let start = Instant::now();
    let capture = read_capture(path)?;

    registry.clear();
    for function in &capture.functions {
        registry.insert(function.virtual_address(), function);
    }

    info!(
        "Loaded {} functions from \"{}\" in {:.2}ms",
        capture.functions.len(),
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(capture)
}
