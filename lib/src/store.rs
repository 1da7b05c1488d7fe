//! Key-value backing for the message cache
//!
//! The cache only needs `get`, `set` and `delete` over string keys. Tests use
//! [`MemoryStore`]; the CLI persists entries with [`FileStore`], a flat JSON
//! object rewritten on every change.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

/// Default file name for the CLI's persistent cache
pub const DEFAULT_STORE_FILENAME: &str = "sealmint-cache.json";

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object in a single file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open an existing store file or create an empty one
    ///
    /// # Arguments
    /// * `path` - Location of the JSON file
    ///
    /// # Returns
    /// * The loaded store, or an error if the file exists but cannot be read
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            Self::load_entries(&path)?
        } else {
            BTreeMap::new()
        };

        let store = Self {
            path,
            entries: Mutex::new(entries),
        };
        if !store.path.exists() {
            store.save_to_file(&lock(&store.entries))?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_to_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json_data = serde_json::to_string_pretty(entries)?;
        let mut file = fs::File::create(&self.path)?;
        file.write_all(json_data.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.save_to_file(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.save_to_file(&entries)?;
        }
        Ok(())
    }
}

// A panic while holding the lock leaves the map itself intact.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.delete("k").unwrap();
        assert_eq!(store.get("k"), None);
        // Deleting a missing key is not an error
        store.delete("k").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);

        {
            let store = FileStore::open_or_create(&path).unwrap();
            assert!(path.exists());
            store.set("a", "first").unwrap();
            store.set("b", "second").unwrap();
            store.delete("a").unwrap();
        }

        let reopened = FileStore::open_or_create(&path).unwrap();
        assert_eq!(reopened.get("a"), None);
        assert_eq!(reopened.get("b").as_deref(), Some("second"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open_or_create(&path),
            Err(StoreError::Encoding(_))
        ));
    }
}
