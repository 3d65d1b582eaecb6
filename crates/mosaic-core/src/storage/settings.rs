use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::storage::error::StorageError;

/// Key/value settings persisted as one JSON file.
///
/// Missing files read as empty settings; [`save`](Self::save) creates
/// the parent directories as needed. Values are stored as JSON and
/// converted through serde on access, so any serializable type works as
/// a value.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: HashMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// Loads the settings from `path`, or empty settings when the file
    /// does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                StorageError::Deserialization {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StorageError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        Ok(Self { path, values })
    }

    /// In-memory settings that save to `path` later.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// A string-list value; missing or mistyped keys read as empty.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get(key).unwrap_or_default()
    }

    pub fn set_string_list(
        &mut self,
        key: &str,
        values: Vec<String>,
    ) -> Result<(), StorageError> {
        self.set(key, values)
    }

    /// Writes the settings back to their file.
    pub fn save(&self) -> Result<(), StorageError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    operation: "create_dir",
                    path: parent.to_path_buf(),
                    source,
                })?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let contents = serde_json::to_string_pretty(&self.values).map_err(|source| {
            StorageError::Serialization {
                key: "<document>".to_string(),
                source,
            }
        })?;

        // Write into a sibling temporary file, then persist it over the
        // target, atomically replacing any previous settings.
        let temp_file = NamedTempFile::new_in(&parent).map_err(|source| StorageError::Io {
            operation: "create_temp_file",
            path: parent.clone(),
            source,
        })?;
        temp_file
            .as_file()
            .write_all(contents.as_bytes())
            .map_err(|source| StorageError::Io {
                operation: "write_temp_file",
                path: temp_file.path().to_path_buf(),
                source,
            })?;
        temp_file
            .persist(&self.path)
            .map_err(|error| StorageError::Io {
                operation: "persist_temp_file",
                path: self.path.clone(),
                source: error.error,
            })?;
        Ok(())
    }
}
