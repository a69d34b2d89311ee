//! Saving and restoring a selection through capture files.

use herakles_target_tracker::capture::{load_selection, read_capture, save_selection};
use herakles_target_tracker::codec::CURRENT_VERSION;
use herakles_target_tracker::error::CaptureError;
use herakles_target_tracker::{Function, SelectionRegistry, Timer};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn selected(registry: &SelectionRegistry, name: &str, address: u64) -> Arc<Function> {
    let mut f = Function::new(name, format!("{name}(int)"), address, 0x1000, 24, "src.cc", 7);
    f.set_module_base_address(0x4000_0000);
    f.set_loaded_module_path("/opt/game/bin/game");
    let f = Arc::new(f);
    f.select(registry);
    f
}

#[test]
fn test_save_then_load_restores_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let registry = SelectionRegistry::new();
    let tick = selected(&registry, "Tick", 0x1200);
    let render = selected(&registry, "Render", 0x1800);
    tick.update_stats(&Timer::new(10, 60));

    let header = save_selection(&path, "frame loop", &registry).expect("save");
    assert_eq!(header.capture_name, "frame loop");
    assert_eq!(header.format_version, CURRENT_VERSION);
    assert_eq!(header.function_count, 2);

    let restored = SelectionRegistry::new();
    let loaded = load_selection(&path, &restored).expect("load");

    assert_eq!(loaded.header, header);
    assert_eq!(loaded.functions.len(), 2);
    assert_eq!(
        restored.selected_addresses(),
        vec![tick.virtual_address(), render.virtual_address()]
    );

    let tick_again = &loaded.functions[0];
    assert_eq!(tick_again.name(), "Tick");
    assert_eq!(tick_again.loaded_module_path(), "/opt/game/bin/game");
    assert_eq!(tick_again.stats_snapshot().expect("stats").count, 1);
}

#[test]
fn test_saved_statistics_reload_bit_for_bit() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let registry = SelectionRegistry::new();
    let functions: Vec<Arc<Function>> = (0..40u64)
        .map(|i| {
            let f = selected(&registry, &format!("f{i}"), 0x1000 + i * 0x40);
            for k in 1..=(3 + i % 9) {
                let start = (i * 7_919 + k * 104_729) % 1_000_003;
                f.update_stats(&Timer::new(start, start + (k * 48_271 + i * 16_807) % 250_000));
            }
            f
        })
        .collect();

    save_selection(&path, "stats", &registry).expect("save");
    let restored = SelectionRegistry::new();
    let loaded = load_selection(&path, &restored).expect("load");

    for (original, reloaded) in functions.iter().zip(&loaded.functions) {
        assert_eq!(reloaded.name(), original.name());
        assert_eq!(reloaded.stats_snapshot(), original.stats_snapshot());
    }
}

#[test]
fn test_loaded_selection_lives_as_long_as_the_capture() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let registry = SelectionRegistry::new();
    let _f = selected(&registry, "Update", 0x2000);
    save_selection(&path, "s", &registry).expect("save");

    let restored = SelectionRegistry::new();
    let loaded = load_selection(&path, &restored).expect("load");
    assert_eq!(restored.len(), 1);

    drop(loaded);
    assert!(restored.is_empty());
}

#[test]
fn test_load_replaces_previous_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let source = SelectionRegistry::new();
    let _saved = selected(&source, "Saved", 0x3000);
    save_selection(&path, "s", &source).expect("save");

    let target = SelectionRegistry::new();
    let old = selected(&target, "Old", 0x9000);
    let _loaded = load_selection(&path, &target).expect("load");

    assert!(!old.is_selected(&target));
    assert_eq!(target.len(), 1);
}

#[test]
fn test_dead_functions_are_not_saved() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");

    let registry = SelectionRegistry::new();
    let keep = selected(&registry, "Keep", 0x100);
    drop(selected(&registry, "Gone", 0x200));

    let header = save_selection(&path, "s", &registry).expect("save");
    assert_eq!(header.function_count, 1);
    let capture = read_capture(&path).expect("read");
    assert_eq!(capture.functions[0].name(), keep.name());
}

#[test]
fn test_corrupt_capture_is_a_parse_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write");

    let registry = SelectionRegistry::new();
    let err = load_selection(&path, &registry).expect_err("corrupt file");
    assert!(matches!(err, CaptureError::Parse(_)));
}

#[test]
fn test_unwritable_destination() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("missing-dir").join("session.json");

    let registry = SelectionRegistry::new();
    let err = save_selection(&path, "s", &registry).expect_err("no parent dir");
    assert!(matches!(err, CaptureError::Open { .. }));
}
