use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use super::StorageError;

/// A synchronous string key/value area, the equivalent of a browser's
/// `localStorage`.
pub trait StorageArea: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process storage area.
///
/// An optional quota (in bytes, keys and values counted) makes writes fail the
/// way a full browser storage does. Successful writes are kept in order and
/// can be inspected with [`MemoryStorage::writes`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        lock(&self.writes).clone()
    }

    fn used_bytes(items: &HashMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = lock(&self.items);

        if let Some(quota) = self.quota {
            let current = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = Self::used_bytes(&items) - current + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded(needed - quota));
            }
        }

        items.insert(key.to_string(), value.to_string());
        lock(&self.writes).push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Storage area backed by a directory, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageArea for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        // Replace the document atomically
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[test]
fn test_memory_storage_quota() {
    let storage = MemoryStorage::with_quota(16);
    storage.set_item("key", "0123456789").unwrap();
    // Overwriting the same key only counts the new value
    storage.set_item("key", "9876543210").unwrap();

    let err = storage.set_item("other", "0123456789").unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded(12)));
    assert_eq!(storage.get_item("other").unwrap(), None);
    assert_eq!(storage.writes().len(), 2);
}

#[test]
fn test_file_storage() {
    let dir = std::env::temp_dir().join(format!("geopins-storage-{}", std::process::id()));
    let storage = FileStorage::new(&dir);

    assert_eq!(storage.get_item("markers_data").unwrap(), None);
    storage.set_item("markers_data", r#"{"markers":[]}"#).unwrap();
    assert_eq!(
        storage.get_item("markers_data").unwrap().as_deref(),
        Some(r#"{"markers":[]}"#)
    );

    fs::remove_dir_all(dir).unwrap();
}
