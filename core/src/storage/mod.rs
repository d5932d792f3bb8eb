//! Local key/value storage
//!
//! Values are JSON documents addressed by well-known string keys. The
//! browser build keeps these in `localStorage`; here they live in a
//! [`StorageBackend`], either on disk or in memory.

mod backend;
pub mod keys;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::Result;

/// Typed facade over a storage backend
#[derive(Clone)]
pub struct LocalStorage {
    backend: Arc<dyn StorageBackend>,
}

impl LocalStorage {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Storage kept entirely in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Storage persisted under `data_dir`, one file per key
    pub fn on_disk(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(data_dir)))
    }

    /// Read and decode the value stored under `key`.
    ///
    /// A value that no longer parses is treated as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get_raw(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding unreadable value under '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    /// Read a list, defaulting to empty when nothing is stored
    pub async fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string_pretty(value)?;
        self.backend.set_raw(key, raw).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let storage = LocalStorage::in_memory();
        let value: Option<Sample> = storage.get("missing").await.unwrap();
        assert!(value.is_none());

        let list: Vec<Sample> = storage.get_list("missing").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let storage = LocalStorage::in_memory();
        let sample = Sample {
            name: "alpha".to_string(),
            count: 3,
        };
        storage.set("sample", &sample).await.unwrap();

        let loaded: Option<Sample> = storage.get("sample").await.unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[tokio::test]
    async fn test_unreadable_value_treated_as_absent() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .set_raw("sample", "{not json".to_string())
            .await
            .unwrap();
        let storage = LocalStorage::new(backend);

        let loaded: Option<Sample> = storage.get("sample").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = LocalStorage::in_memory();
        storage.set(keys::API_TOKEN, "secret").await.unwrap();
        storage.remove(keys::API_TOKEN).await.unwrap();

        let token: Option<String> = storage.get(keys::API_TOKEN).await.unwrap();
        assert!(token.is_none());
    }
}
