//! Storage backends

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Raw string storage addressed by key
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get the raw value for a key
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Replace the raw value for a key
    async fn set_raw(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// File backend storing each key as `<dir>/<key>.json`
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(Error::InvalidInput(format!("Invalid storage key: {}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(Some(content))
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;

        tokio::fs::write(&path, value)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!("Persisted storage key {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_storage_roundtrip_and_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");

        let storage = FileStorage::new(&dir);
        assert!(storage.get_raw("openai_agents").await.unwrap().is_none());

        storage
            .set_raw("openai_agents", "[]".to_string())
            .await
            .unwrap();
        assert!(dir.join("openai_agents.json").exists());

        let reopened = FileStorage::new(&dir);
        assert_eq!(
            reopened.get_raw("openai_agents").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_file_storage_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set_raw("key", "1".to_string()).await.unwrap();
        storage.set_raw("key", "2".to_string()).await.unwrap();

        assert_eq!(storage.get_raw("key").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_file_storage_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.remove("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let result = storage.set_raw("../escape", "x".to_string()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
