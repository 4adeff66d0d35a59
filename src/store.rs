//! Key-value persistence collaborator for high scores and preferences.
//!
//! Values are plain strings; callers decide the encoding. The file store keeps
//! every key in one JSON object and re-reads it on each access, so several
//! handles can share one file without clobbering each other's keys.

use crate::core::constants::STORE_FILENAME;
use crate::utils::persistence::{save_json_at, save_path};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// JSON object on disk, by default ~/.snake/store.json.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::at(save_path(STORE_FILENAME)?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries for a read-modify-write. A corrupt file is replaced rather
    /// than blocking every future write.
    fn entries_for_update(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match self.read_entries() {
            Err(StoreError::Malformed(e)) => {
                warn!(path = %self.path.display(), error = %e, "discarding malformed store");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        save_json_at(&self.path, &entries)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries_for_update()?;
        if entries.remove(key).is_some() {
            save_json_at(&self.path, &entries)?;
        }
        Ok(())
    }
}

/// The store the binary runs on: ~/.snake/store.json when it can be opened,
/// otherwise an in-memory map so the game still starts with a zeroed table.
#[derive(Debug, Clone)]
pub enum LocalStore {
    File(JsonFileStore),
    Memory(MemoryStore),
}

impl LocalStore {
    pub fn open_default() -> Self {
        Self::or_memory(JsonFileStore::open_default())
    }

    pub fn or_memory(opened: Result<JsonFileStore, StoreError>) -> Self {
        match opened {
            Ok(store) => LocalStore::File(store),
            Err(e) => {
                warn!(error = %e, "store unavailable, scores and preferences will not persist");
                LocalStore::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, LocalStore::File(_))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            LocalStore::File(store) => store.get(key),
            LocalStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            LocalStore::File(store) => store.set(key, value),
            LocalStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            LocalStore::File(store) => store.remove(key),
            LocalStore::Memory(store) => store.remove(key),
        }
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Rc::new(RefCell::new(map)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
