//! Key-Value Storage using a JSON document

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed key-value store implementation
///
/// Persists all entries as a single JSON document:
/// - Async operations serialized behind one lock
/// - Writes go through a temporary file and an atomic rename
/// - Missing or unreadable documents start empty
///
/// The store holds a handful of small blobs (preferences, bookmarks,
/// last-read positions), so rewriting the whole document per mutation is
/// acceptable.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl FileKeyValueStore {
    /// Open a store backed by the given file, creating parent directories
    /// as needed. An existing document is loaded eagerly.
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(raw) => match serde_json::from_slice(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = ?path, "Corrupt store document, starting empty: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        debug!(path = ?path, "Initialized key-value store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn flush(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let raw = serde_json::to_vec(entries)
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to encode store: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await.map_err(BridgeError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(BridgeError::Io)?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).map(|v| Bytes::from(v.clone())))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_vec());
        self.flush(&entries).await?;
        debug!(key = key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
            debug!(key = key, "Deleted entry");
        }
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.flush(&entries).await?;
        debug!("Cleared all entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("bridge-desktop-test-{}", Uuid::new_v4()))
            .join("store.json")
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let path = temp_store_path();
        let store = FileKeyValueStore::new(path.clone()).await.unwrap();

        store.set("theme", Bytes::from_static(b"dark")).await.unwrap();
        let value = store.get("theme").await.unwrap();
        assert_eq!(value, Some(Bytes::from_static(b"dark")));

        store.delete("theme").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let path = temp_store_path();

        {
            let store = FileKeyValueStore::new(path.clone()).await.unwrap();
            store
                .set("last-read/2", Bytes::from_static(b"{\"verse\":255}"))
                .await
                .unwrap();
        }

        let reopened = FileKeyValueStore::new(path.clone()).await.unwrap();
        let value = reopened.get("last-read/2").await.unwrap();
        assert_eq!(value, Some(Bytes::from_static(b"{\"verse\":255}")));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn list_and_clear() {
        let path = temp_store_path();
        let store = FileKeyValueStore::new(path.clone()).await.unwrap();

        store.set("a", Bytes::from_static(b"1")).await.unwrap();
        store.set("b", Bytes::from_static(b"2")).await.unwrap();
        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);
        assert!(store.has_key("a").await.unwrap());

        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let path = temp_store_path();
        let store = FileKeyValueStore::new(path.clone()).await.unwrap();

        store.delete("never-set").await.unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
