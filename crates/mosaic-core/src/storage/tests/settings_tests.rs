#![cfg(test)]

use tempfile::tempdir;

use crate::storage::{SettingsStore, StorageError};

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::load(dir.path().join("settings.json")).unwrap();
    assert!(!store.contains_key("anything"));
    assert!(store.get_string_list("anything").is_empty());
}

#[test]
fn save_and_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut store = SettingsStore::empty(&path);
    store.set("window/width", 1280).unwrap();
    store
        .set_string_list(
            "PluginManager/PluginSpec.DisabledPlugins",
            vec!["Editor".to_string(), "Help".to_string()],
        )
        .unwrap();
    store.save().unwrap();

    let reloaded = SettingsStore::load(&path).unwrap();
    assert_eq!(reloaded.get::<i64>("window/width"), Some(1280));
    assert_eq!(
        reloaded.get_string_list("PluginManager/PluginSpec.DisabledPlugins"),
        ["Editor".to_string(), "Help".to_string()]
    );
}

#[test]
fn mistyped_value_reads_as_none() {
    let dir = tempdir().unwrap();
    let mut store = SettingsStore::empty(dir.path().join("settings.json"));
    store.set("key", "text").unwrap();

    assert_eq!(store.get::<i64>("key"), None);
    assert!(store.get_string_list("key").is_empty());
}

#[test]
fn remove_deletes_the_key() {
    let dir = tempdir().unwrap();
    let mut store = SettingsStore::empty(dir.path().join("settings.json"));
    store.set("key", 1).unwrap();

    assert!(store.remove("key"));
    assert!(!store.remove("key"));
    assert!(!store.contains_key("key"));
}

#[test]
fn corrupt_file_is_a_deserialization_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    match SettingsStore::load(&path) {
        Err(StorageError::Deserialization { path: error_path, .. }) => {
            assert_eq!(error_path, path);
        }
        other => panic!("expected deserialization error, got {other:?}"),
    }
}
