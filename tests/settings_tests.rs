//! Settings Tests
//!
//! Tests for:
//! - Default tree reads and typed accessors
//! - Set/get with subscriber notification order and (old, new) payloads
//! - Unsubscribe
//! - Atomic save/load round-trips and malformed-file fallback
//! - Preset bundles

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lumen::settings::{Preset, SettingValue, Settings};

static NEXT_FILE: AtomicU64 = AtomicU64::new(0);

/// Unique temp file per test so parallel tests never collide.
fn temp_settings_path() -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "lumen_settings_test_{}_{n}.json",
        std::process::id()
    ))
}

// ============================================================================
// Defaults and typed reads
// ============================================================================

#[test]
fn missing_paths_read_the_default_tree() {
    let settings = Settings::with_file(temp_settings_path());
    assert_eq!(settings.get_int("window.width", 0), 1280);
    assert_eq!(settings.get_int("window.height", 0), 720);
    assert!(settings.get_bool("graphics.shadows_enabled", false));
    assert_eq!(settings.get_int("graphics.octree_max_depth", 0), 8);
    assert_eq!(settings.get_int("graphics.octree_max_objects_per_node", 0), 10);
}

#[test]
fn unknown_path_falls_back_to_caller_default() {
    let settings = Settings::with_file(temp_settings_path());
    assert_eq!(settings.get_int("no.such.key", 42), 42);
    assert!(settings.get("no.such.key").is_none());
    assert!(settings.validate_path("no.such.key").is_err());
    assert!(settings.validate_path("graphics.gamma").is_ok());
}

#[test]
fn int_coerces_to_float_reads() {
    let settings = Settings::with_file(temp_settings_path());
    settings.set("graphics.gamma", SettingValue::Int(2), false);
    assert!((settings.get_float("graphics.gamma", 0.0) - 2.0).abs() < 1e-9);
}

// ============================================================================
// Subscribers
// ============================================================================

#[test]
fn subscribers_fire_in_registration_order_with_old_and_new() {
    let settings = Settings::with_file(temp_settings_path());
    let calls = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let calls = Arc::clone(&calls);
        settings.subscribe("graphics.msaa_samples", move |old, new| {
            calls
                .lock()
                .unwrap()
                .push((tag, old.clone(), new.clone()));
        });
    }

    settings.set("graphics.msaa_samples", SettingValue::Int(8), false);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls.iter().map(|(tag, _, _)| *tag).collect::<Vec<_>>(),
        vec!["first", "second", "third"]
    );
    for (_, old, new) in calls.iter() {
        assert_eq!(*old, SettingValue::Int(4), "old value is the default");
        assert_eq!(*new, SettingValue::Int(8));
    }
}

#[test]
fn subscriber_only_fires_on_exact_path() {
    let settings = Settings::with_file(temp_settings_path());
    let count = Arc::new(Mutex::new(0));

    let c = Arc::clone(&count);
    settings.subscribe("graphics.gamma", move |_, _| {
        *c.lock().unwrap() += 1;
    });

    settings.set("graphics.msaa_samples", SettingValue::Int(2), false);
    settings.set("graphics.gamma", SettingValue::Float(1.8), false);

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn unsubscribe_stops_notifications() {
    let settings = Settings::with_file(temp_settings_path());
    let count = Arc::new(Mutex::new(0));

    let c = Arc::clone(&count);
    let id = settings.subscribe("window.vsync", move |_, _| {
        *c.lock().unwrap() += 1;
    });

    settings.set("window.vsync", SettingValue::Bool(false), false);
    settings.unsubscribe(id);
    settings.set("window.vsync", SettingValue::Bool(true), false);

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn gpu_bound_subscriber_work_can_defer_through_a_channel() {
    // Settings callbacks run on the calling thread; GPU work crosses to
    // the render thread through a queue.
    let settings = Settings::with_file(temp_settings_path());
    let (tx, rx) = flume::unbounded::<u32>();

    settings.subscribe("graphics.shadow_map_size", move |_, new| {
        if let Some(size) = new.as_int() {
            let _ = tx.send(size as u32);
        }
    });

    settings.set("graphics.shadow_map_size", SettingValue::Int(4096), false);
    assert_eq!(rx.try_recv(), Ok(4096));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn save_then_load_round_trips_every_touched_path() {
    let path = temp_settings_path();

    let settings = Settings::with_file(path.clone());
    settings.set("graphics.shadow_map_size", SettingValue::Int(4096), false);
    settings.set("window.title", SettingValue::Str("Round Trip".into()), false);
    settings.set("graphics.gamma", SettingValue::Float(1.9), false);
    settings.set("window.vsync", SettingValue::Bool(false), false);
    settings.save().expect("save should succeed");

    let reloaded = Settings::with_file(path.clone());
    reloaded.load();
    assert_eq!(reloaded.get_int("graphics.shadow_map_size", 0), 4096);
    assert_eq!(reloaded.get_string("window.title", ""), "Round Trip");
    assert!((reloaded.get_float("graphics.gamma", 0.0) - 1.9).abs() < 1e-9);
    assert!(!reloaded.get_bool("window.vsync", true));

    let _ = std::fs::remove_file(path);
}

#[test]
fn set_with_save_persists_immediately() {
    let path = temp_settings_path();

    {
        let settings = Settings::with_file(path.clone());
        settings.set("graphics.msaa_samples", SettingValue::Int(2), true);
    }

    let reloaded = Settings::with_file(path.clone());
    reloaded.load();
    assert_eq!(reloaded.get_int("graphics.msaa_samples", 0), 2);

    let _ = std::fs::remove_file(path);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let path = temp_settings_path();
    std::fs::write(&path, "{ this is not json").expect("write garbage");

    let settings = Settings::with_file(path.clone());
    settings.load();

    // Defaults survive the malformed overlay.
    assert_eq!(settings.get_int("window.width", 0), 1280);

    let _ = std::fs::remove_file(path);
}

#[test]
fn persisted_file_is_a_nested_tree() {
    let path = temp_settings_path();

    let settings = Settings::with_file(path.clone());
    settings.set("graphics.bloom", SettingValue::Bool(true), false);
    settings.set("window.width", SettingValue::Int(1920), false);
    settings.save().expect("save should succeed");

    let raw = std::fs::read_to_string(&path).expect("read back");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(json["graphics"]["bloom"], serde_json::Value::Bool(true));
    assert_eq!(json["window"]["width"], serde_json::json!(1920));

    let _ = std::fs::remove_file(path);
}

// ============================================================================
// Presets
// ============================================================================

#[test]
fn preset_applies_its_whole_bundle_then_saves_once() {
    let path = temp_settings_path();
    let settings = Settings::with_file(path.clone());

    Preset::Ultra.apply(&settings);
    assert_eq!(settings.get_int("graphics.msaa_samples", 0), 8);
    assert_eq!(settings.get_int("graphics.shadow_map_size", 0), 4096);
    assert!(settings.get_bool("graphics.bloom", false));

    // Persisted in the same call.
    let reloaded = Settings::with_file(path.clone());
    reloaded.load();
    assert_eq!(reloaded.get_int("graphics.shadow_map_size", 0), 4096);

    Preset::Low.apply(&settings);
    assert_eq!(settings.get_int("graphics.msaa_samples", 0), 0);
    assert!(!settings.get_bool("graphics.shadows_enabled", true));

    let _ = std::fs::remove_file(path);
}

#[test]
fn unknown_preset_name_is_an_error() {
    assert!("high".parse::<Preset>().is_ok());
    assert!("ULTRA".parse::<Preset>().is_ok());
    assert!("cinematic".parse::<Preset>().is_err());
}

#[test]
fn preset_sets_fire_subscribers() {
    let settings = Settings::with_file(temp_settings_path());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s = Arc::clone(&seen);
    settings.subscribe("graphics.shadow_map_size", move |_, new| {
        s.lock().unwrap().push(new.clone());
    });

    Preset::Medium.apply(&settings);
    assert_eq!(seen.lock().unwrap().as_slice(), &[SettingValue::Int(1024)]);

    let _ = std::fs::remove_file(settings.file_path());
}
