//! Versioned function metadata records.
//!
//! Every record carries a mandatory `version`. Readers accept any version up to
//! [`CURRENT_VERSION`] and only honour the fields that existed in the record's
//! version:
//!
//! | version | fields added |
//! |---------|--------------|
//! | 1 | name, pretty_name, address, size, file, line |
//! | 2 | load_bias, module_base_address |
//! | 3 | loaded_module_path, calling_convention |
//! | 4 | stats |
//!
//! Unknown fields are ignored, so a record written by a newer writer that kept
//! its version number stays readable.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::function::Function;
use crate::stats::StatsSnapshot;

pub const CURRENT_VERSION: u32 = 4;

const LOAD_BIAS_SINCE: u32 = 2;
const CALLING_CONVENTION_SINCE: u32 = 3;
const STATS_SINCE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub version: u32,
    pub name: String,
    pub pretty_name: String,
    pub address: u64,
    pub size: u64,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_bias: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_base_address: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_module_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_convention: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSnapshot>,
}

fn check_version(version: u32) -> Result<(), CodecError> {
    match version {
        0 => Err(CodecError::InvalidVersion),
        v if v > CURRENT_VERSION => Err(CodecError::UnsupportedVersion {
            found: v,
            max: CURRENT_VERSION,
        }),
        _ => Ok(()),
    }
}

/// Encodes with the current schema.
pub fn encode(function: &Function) -> FunctionRecord {
    FunctionRecord {
        version: CURRENT_VERSION,
        name: function.name().to_string(),
        pretty_name: function.pretty_name().to_string(),
        address: function.address(),
        size: function.size(),
        file: function.file().to_string(),
        line: function.line(),
        load_bias: Some(function.load_bias()),
        module_base_address: Some(function.module_base_address()),
        loaded_module_path: Some(function.loaded_module_path().to_string()),
        calling_convention: Some(function.calling_convention()),
        stats: function.stats_snapshot(),
    }
}

/// Encodes for a reader that only knows `version`; newer fields are left out.
pub fn encode_as(function: &Function, version: u32) -> Result<FunctionRecord, CodecError> {
    check_version(version)?;
    let mut record = encode(function);
    record.version = version;
    strip_newer_fields(&mut record);
    Ok(record)
}

fn strip_newer_fields(record: &mut FunctionRecord) {
    if record.version < LOAD_BIAS_SINCE {
        record.load_bias = None;
        record.module_base_address = None;
    }
    if record.version < CALLING_CONVENTION_SINCE {
        record.loaded_module_path = None;
        record.calling_convention = None;
    }
    if record.version < STATS_SINCE {
        record.stats = None;
    }
}

/// Rebuilds a function from a record of any supported version.
///
/// Records older than version 4 start with fresh zeroed statistics, as a newly
/// loaded function would. A version 4 record without stats yields a function
/// whose statistics were never recorded.
pub fn decode(record: &FunctionRecord) -> Result<Function, CodecError> {
    check_version(record.version)?;
    let mut record = record.clone();
    strip_newer_fields(&mut record);

    let mut function = Function::without_stats(
        record.name,
        record.pretty_name,
        record.address,
        record.load_bias.unwrap_or(0),
        record.size,
        record.file,
        record.line,
    );
    if let Some(base) = record.module_base_address {
        function.set_module_base_address(base);
    }
    if let Some(path) = record.loaded_module_path {
        function.set_loaded_module_path(path);
    }
    if let Some(code) = record.calling_convention {
        function.set_calling_convention(code);
    }

    if record.version < STATS_SINCE {
        function.reset_stats();
    } else if let Some(snapshot) = &record.stats {
        function.restore_stats(snapshot);
    }
    Ok(function)
}

pub fn encode_json(function: &Function) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&encode(function))?)
}

pub fn decode_json(json: &str) -> Result<Function, CodecError> {
    let record: FunctionRecord = serde_json::from_str(json)?;
    decode(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ApiRole;
    use crate::stats::Timer;

    fn sample_function() -> Function {
        let mut f = Function::new(
            "_ZN9orbit_api5StartEPKc",
            "orbit_api::Start(char const*)",
            0x2000,
            0x1000,
            128,
            "/src/orbit_api.cc",
            12,
        );
        f.set_module_base_address(0x5555_0000);
        f.set_loaded_module_path("/usr/lib/liborbit.so");
        f.set_calling_convention(7);
        f.update_stats(&Timer::new(0, 100));
        f.update_stats(&Timer::new(0, 300));
        f
    }

    #[test]
    fn test_round_trip_current_version() {
        let original = sample_function();
        let json = encode_json(&original).expect("encode");
        let decoded = decode_json(&json).expect("decode");

        assert_eq!(decoded.name(), original.name());
        assert_eq!(decoded.pretty_name(), original.pretty_name());
        assert_eq!(decoded.address(), original.address());
        assert_eq!(decoded.load_bias(), original.load_bias());
        assert_eq!(decoded.size(), original.size());
        assert_eq!(decoded.file(), original.file());
        assert_eq!(decoded.line(), original.line());
        assert_eq!(decoded.module_base_address(), original.module_base_address());
        assert_eq!(decoded.loaded_module_path(), original.loaded_module_path());
        assert_eq!(decoded.calling_convention_str(), "NEAR_STD");
        assert_eq!(decoded.api_role(), ApiRole::TimerStart);
        assert_eq!(decoded.stats_snapshot(), original.stats_snapshot());
    }

    #[test]
    fn test_round_trip_keeps_float_stats_exact() {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            seed >> 33
        };

        for i in 0..500u64 {
            let f = Function::new(format!("f{i}"), format!("f{i}()"), i, 0, 4, "", 0);
            let samples = 3 + next() % 17;
            for _ in 0..samples {
                let start = next() % 1_000_000;
                f.update_stats(&Timer::new(start, start + 1 + next() % 400_000));
            }

            let json = encode_json(&f).expect("encode");
            let decoded = decode_json(&json).expect("decode");
            assert_eq!(decoded.stats_snapshot(), f.stats_snapshot(), "function f{i}");
        }
    }

    #[test]
    fn test_version_is_mandatory() {
        let json = r#"{"name":"f","pretty_name":"f()","address":1,"size":2,"file":"","line":0}"#;
        assert!(matches!(decode_json(json), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_rejects_future_and_zero_versions() {
        let mut record = encode(&sample_function());
        record.version = CURRENT_VERSION + 1;
        assert!(matches!(
            decode(&record),
            Err(CodecError::UnsupportedVersion { found: 5, max: 4 })
        ));
        record.version = 0;
        assert!(matches!(decode(&record), Err(CodecError::InvalidVersion)));
    }

    #[test]
    fn test_version_one_ignores_newer_fields() {
        // fields beyond the record's version are ignored even when present
        let json = r#"{
            "version": 1,
            "name": "f", "pretty_name": "f()",
            "address": 4096, "size": 8, "file": "f.cc", "line": 3,
            "load_bias": 1024, "calling_convention": 2,
            "stats": {"count": 9, "total_ns": 9, "min_ns": 1, "max_ns": 1, "mean_ns": 1.0, "variance_ns": 0.0}
        }"#;
        let f = decode_json(json).expect("decode v1");
        assert_eq!(f.load_bias(), 0);
        assert_eq!(f.virtual_address(), 4096);
        assert_eq!(f.calling_convention_str(), "UnknownCallConv");
        assert_eq!(f.stats().map(|s| s.count()), Some(0));
    }

    #[test]
    fn test_version_four_without_stats_never_recorded() {
        let json = r#"{"version":4,"name":"f","pretty_name":"f()","address":1,"size":2,"file":"","line":0}"#;
        let f = decode_json(json).expect("decode");
        assert!(f.stats().is_none());
    }

    #[test]
    fn test_encode_as_older_version() {
        let record = encode_as(&sample_function(), 2).expect("encode v2");
        assert_eq!(record.version, 2);
        assert_eq!(record.load_bias, Some(0x1000));
        assert!(record.calling_convention.is_none());
        assert!(record.stats.is_none());

        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("stats"));
        assert!(encode_as(&sample_function(), 9).is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"version":3,"name":"f","pretty_name":"f()","address":1,"size":2,"file":"","line":0,"future_field":true}"#;
        assert!(decode_json(json).is_ok());
    }
}
