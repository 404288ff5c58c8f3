//! Backing key-value stores.
//!
//! Every collection is mirrored to a single string key holding its JSON serialisation. The
//! store is a plain string-to-string map with synchronous get/set/remove; it knows nothing about
//! records.
//!
//! ## Backends
//!
//! - [`MemoryStore`]: process-local map, used by tests and throwaway sessions.
//! - [`FileStore`]: one `<key>.json` file per key under a data directory.
//!
//! There is no locking across processes. Two processes writing the same key race and the last
//! write wins.

use crate::constants::STORE_FILE_EXTENSION;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors raised by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Key contains characters that cannot map onto a single file name
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Data directory does not exist and could not be created
    #[error("failed to create data directory {path}: {source}", path = path.display())]
    DataDirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// In-memory store lock was poisoned by a panicking writer
    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string-keyed, string-valued store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory store.
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
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store: each key lives in `<data_dir>/<key>.json`.
///
/// Writes go to a hidden temporary file in the same directory which is then renamed over the
/// target, so a crash mid-write leaves the previous value intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DataDirCreation`] if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::DataDirCreation {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self
            .data_dir
            .join(format!("{key}.{STORE_FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        let tmp = self
            .data_dir
            .join(format!(".{key}.{STORE_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Keys must map onto a single plain file name: ASCII alphanumerics, `_` and `-`.
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("medicalOrders").unwrap(), None);

        store.set("medicalOrders", "[]").unwrap();
        assert_eq!(store.get("medicalOrders").unwrap().as_deref(), Some("[]"));

        store.remove("medicalOrders").unwrap();
        assert_eq!(store.get("medicalOrders").unwrap(), None);
        store.remove("medicalOrders").unwrap();
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        store.set("vitalSigns", r#"[{"id":"sv-1"}]"#).unwrap();
        assert!(dir.path().join("vitalSigns.json").is_file());

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("vitalSigns").unwrap().as_deref(),
            Some(r#"[{"id":"sv-1"}]"#)
        );
    }

    #[test]
    fn file_store_creates_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.data_dir(), nested.as_path());
    }

    #[test]
    fn file_store_overwrite_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("epicrisis", "[1]").unwrap();
        store.set("epicrisis", "[2]").unwrap();

        assert_eq!(store.get("epicrisis").unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join(".epicrisis.json.tmp").exists());
    }

    #[test]
    fn file_store_remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.remove("appointments").unwrap();
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for key in ["", "../escape", "a/b", "dot.key", "sp ace"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {key:?}");
        }
    }
}
