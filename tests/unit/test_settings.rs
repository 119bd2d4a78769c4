//! Unit tests for settings storage
//!
//! Exercises the TOML settings file: defaults for missing files and keys,
//! fallback on unparsable content, gap persistence and atomic saves.

use snaptile::config::{
    FileSettingsStore, FileStoreConfig, GapChange, Settings, SettingsStore, SettingsStoreError,
};
use snaptile::models::TilingSteps;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileSettingsStore {
    FileSettingsStore::new(FileStoreConfig {
        config_dir: dir.path().join("snaptile"),
        file_name: "settings.toml".to_string(),
    })
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.settings_path().exists());
    assert_eq!(store.load(), Settings::default());
}

#[test]
fn initialize_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let path = store.initialize().unwrap();
    assert!(path.exists());
    assert_eq!(store.read().unwrap(), Settings::default());

    store.set_gap_size(12).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.load().gap_size, 12);
}

#[test]
fn gap_size_persists_across_stores() {
    let dir = TempDir::new().unwrap();
    store_in(&dir).set_gap_size(8).unwrap();

    let reopened = store_in(&dir);
    assert_eq!(reopened.load().gap_size, 8);
    assert!(!reopened.settings_path().with_extension("tmp").exists());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        "gap-size = 5\ntiling-steps-side = \"0.5, 0.25\"\ntiling-steps-timeout = 400\n",
    )
    .unwrap();

    let config = FileSettingsStore::at_path(&path).load().tiling_config();
    assert_eq!(config.gap_size, 5);
    assert_eq!(config.side_steps, "0.5, 0.25".parse::<TilingSteps>().unwrap());
    assert_eq!(config.center_steps, TilingSteps::default_center());
    assert_eq!(config.gesture_timeout, Duration::from_millis(400));
    assert!(config.animate);
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "gap-size = \"wide\"\n").unwrap();

    let store = FileSettingsStore::at_path(&path);
    assert!(matches!(store.read(), Err(SettingsStoreError::Parse(_))));
    assert_eq!(store.load(), Settings::default());
}

#[test]
fn gap_writes_refuse_to_clobber_broken_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "enable-inner-gaps = maybe\n").unwrap();

    let store = FileSettingsStore::at_path(&path);
    assert!(store.set_gap_size(3).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "enable-inner-gaps = maybe\n");
}

#[test]
fn out_of_range_values_are_sanitized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "gap-size = 250\ngap-size-max = 500\ngap-size-increments = 0\n").unwrap();

    let settings = FileSettingsStore::at_path(&path).load();
    let config = settings.tiling_config();
    assert_eq!(config.gap_size, 100);
    assert_eq!(settings.stepped_gap_size(GapChange::Increase), 100);
    assert_eq!(settings.stepped_gap_size(GapChange::Decrease), 99);
}

#[test]
fn saved_file_uses_kebab_case_keys() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&Settings::default()).unwrap();

    let content = fs::read_to_string(store.settings_path()).unwrap();
    assert!(content.contains("gap-size = 0"));
    assert!(content.contains("enable-window-animation = true"));
    assert!(content.contains("tiling-steps-center = \"0.25;0.15, 0.5;0.3\""));
}
