//! Persistence gateway emulating a remote backend on top of a local storage
//! area. The whole state lives in one JSON object stored under a single
//! storage key; every call reads and rewrites that object, last writer wins.

pub mod storage;

use std::{sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::time::sleep;

pub use storage::{FileStorage, MemoryStorage, StorageArea};

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded by {0} bytes")]
    QuotaExceeded(usize),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored document is not a JSON object")]
    NotAnObject,
    #[error("Failed to read data")]
    Read(#[source] Box<StorageError>),
    #[error("Failed to save data")]
    Save(#[source] Box<StorageError>),
    #[error("Failed to get item")]
    Get(#[source] Box<StorageError>),
    #[error("Failed to update item")]
    Update(#[source] Box<StorageError>),
}

pub struct Backend {
    storage: Arc<dyn StorageArea>,
    storage_key: String,
    delay: Duration,
}

impl Backend {
    pub fn new(storage: Arc<dyn StorageArea>, storage_key: impl Into<String>, delay: Duration) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            delay,
        }
    }

    async fn simulate_delay(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }

    async fn get_all(&self) -> Result<Option<Map<String, Value>>, StorageError> {
        self.simulate_delay().await;

        let read = || -> Result<Option<Map<String, Value>>, StorageError> {
            let Some(data) = self.storage.get_item(&self.storage_key)? else {
                return Ok(None);
            };
            match serde_json::from_str::<Value>(&data)? {
                Value::Object(map) => Ok(Some(map)),
                Value::Null => Ok(None),
                _ => Err(StorageError::NotAnObject),
            }
        };

        read().map_err(|e| {
            log::error!("Error reading from storage: {e}");
            StorageError::Read(Box::new(e))
        })
    }

    async fn save(&self, data: &Map<String, Value>) -> Result<(), StorageError> {
        self.simulate_delay().await;

        let write = || -> Result<(), StorageError> {
            let json = serde_json::to_string(data)?;
            self.storage.set_item(&self.storage_key, &json)
        };

        write().map_err(|e| {
            log::error!("Error writing to storage: {e}");
            StorageError::Save(Box::new(e))
        })
    }

    async fn read_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_all().await?.and_then(|mut data| data.remove(key)) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn write_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let mut data = self.get_all().await?.unwrap_or_default();
        data.insert(key.to_string(), serde_json::to_value(value)?);
        self.save(&data).await
    }

    /// Returns the value stored under `key`, `None` if the document or the key
    /// does not exist.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.simulate_delay().await;

        self.read_item(key).await.map_err(|e| {
            log::error!("Error getting item `{key}`: {e}");
            StorageError::Get(Box::new(e))
        })
    }

    /// Replaces the value under `key`, keeping every other key of the document.
    pub async fn update_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.simulate_delay().await;

        self.write_item(key, value).await.map_err(|e| {
            log::error!("Error updating item `{key}`: {e}");
            StorageError::Update(Box::new(e))
        })
    }
}
