//! Key-value storage backends for persisted state records.

use super::error::StorageError;
use crate::sync::lock;
use data_encoding::HEXUPPER;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String key-value store that persisted state records are written to.
///
/// Implementations must be shareable between hosts: every method takes
/// `&self`.
pub trait StateStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, optionally bounded by a byte quota over all values.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose values may not exceed `limit` bytes in total.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one JSON file per key.
///
/// Writes go to a temporary file that is then renamed over the target, so
/// a crash never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    ///
    /// Bytes outside `[A-Za-z0-9_.-]` are written as `%XX`, so distinct keys
    /// always get distinct files.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.') {
                file_name.push(char::from(byte));
            } else {
                file_name.push('%');
                file_name.push_str(&HEXUPPER.encode(&[byte]));
            }
        }
        self.dir.join(format!("{file_name}.json"))
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        if let Err(error) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(error.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_round_trips_values() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", "1").unwrap();
        storage.set("a", "2").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);

        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_quota_rejects_oversized_writes() {
        let storage = MemoryStorage::with_quota(8);
        storage.set("a", "12345").unwrap();

        let error = storage.set("b", "6789").unwrap_err();

        assert!(matches!(
            error,
            StorageError::QuotaExceeded {
                needed: 9,
                limit: 8,
                ..
            }
        ));
        assert_eq!(storage.get("b").unwrap(), None);
    }

    #[test]
    fn memory_quota_counts_replaced_value_once() {
        let storage = MemoryStorage::with_quota(5);
        storage.set("a", "12345").unwrap();

        storage.set("a", "54321").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some("54321"));
    }

    #[test]
    fn file_storage_round_trips_values() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("state")).unwrap();

        assert_eq!(storage.get("toggle machine state - local").unwrap(), None);

        storage
            .set("toggle machine state - local", "{\"v\":1}")
            .unwrap();

        assert_eq!(
            storage
                .get("toggle machine state - local")
                .unwrap()
                .as_deref(),
            Some("{\"v\":1}")
        );
    }

    #[test]
    fn file_storage_escapes_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let path = storage.path_for("auth machine state - https://app.example");

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "auth%20machine%20state%20-%20https%3A%2F%2Fapp.example.json"
        );
    }

    #[test]
    fn file_storage_keeps_similar_keys_apart() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let keys = [
            "toggle machine state - https://a.example",
            "toggle machine state - https_//a.example",
            "toggle machine state - https%3A//a.example",
        ];

        for (n, key) in keys.iter().enumerate() {
            storage.set(key, &n.to_string()).unwrap();
        }

        for (n, key) in keys.iter().enumerate() {
            assert_eq!(storage.get(key).unwrap(), Some(n.to_string()));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), keys.len());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        // A directory in the target's place makes the rename fail.
        fs::create_dir(storage.path_for("blocked")).unwrap();
        fs::write(storage.path_for("blocked").join("inner"), "x").unwrap();

        assert!(matches!(
            storage.set("blocked", "v"),
            Err(StorageError::Io(_))
        ));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["blocked.json".to_string()]);
    }

    #[test]
    fn file_storage_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set("k", "v").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();

        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn file_storage_remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.remove("absent").unwrap();
        storage.set("present", "x").unwrap();
        storage.remove("present").unwrap();

        assert_eq!(storage.get("present").unwrap(), None);
    }
}
