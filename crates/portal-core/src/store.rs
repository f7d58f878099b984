//! Key/value persistence for record collections
//!
//! Each page stores its whole collection as one JSON array under
//! `<entity>_<userId>`, e.g. `tickets_user1`.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use portal_domain::{normalize_row, Record};

use crate::error::StorageError;

/// Trait for key/value storage backends
pub trait KeyValueStore {
    /// Read the value under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
}

/// In-memory store implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Storage key for one entity type in one user scope.
pub fn storage_key(entity: &str, user_id: &str) -> String {
    format!("{}_{}", entity, user_id)
}

/// Reads and writes whole record collections for one user.
#[derive(Debug, Clone)]
pub struct RecordRepository<S> {
    store: S,
    user_id: String,
}

impl<S: KeyValueStore> RecordRepository<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn key_for<T: Record>(&self) -> String {
        storage_key(T::ENTITY, &self.user_id)
    }

    /// Load the stored collection, or the default dataset when nothing is stored.
    pub fn load<T: Record>(&self, now: DateTime<Utc>) -> Result<Vec<T>, StorageError> {
        let key = self.key_for::<T>();
        let Some(text) = self.store.get(&key)? else {
            let defaults = T::default_dataset(now);
            info!(key = %key, count = defaults.len(), "Nothing stored, using default dataset");
            return Ok(defaults);
        };

        let malformed = |message: String| StorageError::Malformed {
            key: key.clone(),
            message,
        };

        let value: Value = serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(malformed("expected a JSON array".to_string()));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(mut row) => {
                    normalize_row(&mut row);
                    T::from_row(row).map_err(|e| malformed(format!("item {}: {}", i, e)))
                }
                _ => Err(malformed(format!("item {} is not an object", i))),
            })
            .collect::<Result<Vec<T>, StorageError>>()?;

        debug!(key = %key, count = records.len(), "Loaded records");
        Ok(records)
    }

    /// Replace the stored collection.
    pub fn save<T: Record>(&mut self, records: &[T]) -> Result<(), StorageError> {
        let key = self.key_for::<T>();
        let text = serde_json::to_string(records)?;
        self.store.set(&key, text)?;
        debug!(key = %key, count = records.len(), "Saved records");
        Ok(())
    }

    /// Drop the stored collection so the next load yields the defaults.
    pub fn reset<T: Record>(&mut self) -> Result<bool, StorageError> {
        let key = self.key_for::<T>();
        let removed = self.store.remove(&key)?;
        info!(key = %key, removed, "Reset stored records");
        Ok(removed)
    }
}
