//! Persistent keyword tracking
//!
//! This module provides:
//! - A small key-value storage seam (`KeyValueStore`) with file-backed and
//!   in-memory implementations
//! - `KeywordStore`, which keeps the bounded list of keywords seen across
//!   sessions under the `chat_keywords` key

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Storage key holding the tracked keywords as a JSON array of strings.
pub const KEYWORDS_KEY: &str = "chat_keywords";

/// Most recent keywords kept after a merge.
pub const MAX_TRACKED_KEYWORDS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================
// File-backed storage
// ============================================

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }
}

// ============================================
// In-memory storage
// ============================================

/// Process-local storage; keyword tracking through it lasts one session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// ============================================
// Keyword store
// ============================================

pub struct KeywordStore<S> {
    store: S,
}

impl<S: KeyValueStore> KeywordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the tracked keywords. Missing or unreadable data loads as empty.
    pub fn load(&self) -> Vec<String> {
        let raw = match self.store.get(KEYWORDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read tracked keywords: {}", err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(word) => Some(word),
                    _ => None,
                })
                .collect(),
            Ok(_) => {
                debug!("tracked keywords are not a JSON array, ignoring");
                Vec::new()
            }
            Err(err) => {
                debug!("tracked keywords are not valid JSON: {}", err);
                Vec::new()
            }
        }
    }

    /// Persist the keyword list. Failures are logged and swallowed.
    pub fn save(&self, keywords: &[String]) {
        if let Err(err) = self.try_save(keywords) {
            warn!("failed to persist tracked keywords: {}", err);
        }
    }

    pub fn try_save(&self, keywords: &[String]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(keywords)?;
        self.store.set(KEYWORDS_KEY, &serialized)
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

/// Union of `existing` and `new` in first-occurrence order, keeping only the
/// last `MAX_TRACKED_KEYWORDS` entries.
pub fn merge(existing: &[String], new: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + new.len());
    for word in existing.iter().chain(new) {
        if !merged.contains(word) {
            merged.push(word.clone());
        }
    }
    if merged.len() > MAX_TRACKED_KEYWORDS {
        merged.drain(..merged.len() - MAX_TRACKED_KEYWORDS);
    }
    merged
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}
