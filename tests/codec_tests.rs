//! Reading function metadata written by every schema version.

use herakles_target_tracker::codec::{decode_json, encode, encode_as, encode_json, CURRENT_VERSION};
use herakles_target_tracker::error::CodecError;
use herakles_target_tracker::{ApiRole, Function, Timer};

fn sample_function() -> Function {
    let mut f = Function::new(
        "_ZN9orbit_api4StopEv",
        "orbit_api::Stop()",
        0x4010,
        0x1000,
        32,
        "orbit_api.cc",
        88,
    );
    f.set_module_base_address(0x5555_0000_0000);
    f.set_loaded_module_path("/usr/lib/liborbit.so");
    f.set_calling_convention(0);
    f.update_stats(&Timer::new(0, 250));
    f
}

#[test]
fn test_version_one_text() {
    let json = r#"{"version":1,"name":"main","pretty_name":"main(int, char**)","address":4096,"size":64,"file":"main.cc","line":12}"#;
    let f = decode_json(json).expect("decode v1");

    assert_eq!(f.name(), "main");
    assert_eq!(f.address(), 4096);
    assert_eq!(f.load_bias(), 0);
    assert_eq!(f.module_base_address(), 0);
    assert_eq!(f.loaded_module_path(), "");
    assert_eq!(f.calling_convention(), -1);
    assert_eq!(f.calling_convention_str(), "UnknownCallConv");
    let stats = f.stats_snapshot().expect("old records get fresh stats");
    assert_eq!(stats.count, 0);
}

#[test]
fn test_version_two_text() {
    let json = r#"{"version":2,"name":"f","pretty_name":"f()","address":8192,"size":8,"file":"f.cc","line":1,"load_bias":4096,"module_base_address":65536}"#;
    let f = decode_json(json).expect("decode v2");
    assert_eq!(f.offset(), 4096);
    assert_eq!(f.virtual_address(), 65536 + 4096);
}

#[test]
fn test_version_three_text_with_api_name() {
    let json = r#"{"version":3,"name":"t","pretty_name":"orbit_api::TrackDouble(char const*, double)","address":1,"size":1,"file":"","line":0,"loaded_module_path":"/lib/liba.so","calling_convention":1}"#;
    let f = decode_json(json).expect("decode v3");
    assert_eq!(f.loaded_module_path(), "/lib/liba.so");
    assert_eq!(f.calling_convention_str(), "FAR_C");
    assert_eq!(f.api_role(), ApiRole::TrackDouble);
}

#[test]
fn test_current_version_keeps_recorded_stats() {
    let original = sample_function();
    let json = encode_json(&original).expect("encode");
    let decoded = decode_json(&json).expect("decode");

    assert_eq!(encode(&decoded), encode(&original));
    let stats = decoded.stats_snapshot().expect("stats");
    assert_eq!(stats.count, 1);
    assert_eq!(stats.max_ns, 250);
}

#[test]
fn test_version_four_without_stats() {
    let json = r#"{"version":4,"name":"g","pretty_name":"g()","address":16,"size":4,"file":"g.cc","line":2}"#;
    let f = decode_json(json).expect("decode");
    assert!(f.stats().is_none());
}

#[test]
fn test_newer_fields_in_old_record_are_ignored() {
    let json = r#"{"version":1,"name":"h","pretty_name":"h()","address":32,"size":4,"file":"","line":0,"load_bias":16,"calling_convention":2}"#;
    let f = decode_json(json).expect("decode");
    assert_eq!(f.load_bias(), 0);
    assert_eq!(f.calling_convention(), -1);
}

#[test]
fn test_unknown_fields_and_bad_versions() {
    let extra = r#"{"version":4,"name":"x","pretty_name":"x()","address":1,"size":1,"file":"","line":0,"inlined_into":"y"}"#;
    assert!(decode_json(extra).is_ok());

    let future = format!(
        r#"{{"version":{},"name":"x","pretty_name":"","address":1,"size":1,"file":"","line":0}}"#,
        CURRENT_VERSION + 1
    );
    assert!(matches!(
        decode_json(&future),
        Err(CodecError::UnsupportedVersion { .. })
    ));

    let zero = r#"{"version":0,"name":"x","pretty_name":"","address":1,"size":1,"file":"","line":0}"#;
    assert!(matches!(decode_json(zero), Err(CodecError::InvalidVersion)));

    let missing = r#"{"name":"x","pretty_name":"","address":1,"size":1,"file":"","line":0}"#;
    assert!(matches!(decode_json(missing), Err(CodecError::Json(_))));
}

#[test]
fn test_encode_for_older_reader() {
    let record = encode_as(&sample_function(), 2).expect("encode v2");
    assert_eq!(record.version, 2);
    assert_eq!(record.load_bias, Some(0x1000));
    assert!(record.loaded_module_path.is_none());
    assert!(record.stats.is_none());

    let json = serde_json::to_string(&record).expect("serialize");
    assert!(!json.contains("stats"));
}
