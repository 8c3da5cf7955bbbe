//! Storage Abstractions
//!
//! Provides a platform-agnostic trait for small-blob key-value persistence.
//! The core stores user state (bookmarks, preferences, last-read positions)
//! as opaque byte blobs and enforces no schema at this layer.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Key-value blob storage trait
///
/// Abstracts platform-specific persistence:
/// - iOS: UserDefaults / files in the app container
/// - Android: SharedPreferences / DataStore
/// - Desktop: config files or OS-specific preferences
///
/// Values are opaque to the store; callers own serialization. Writes replace
/// any prior value for the key.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn save_position(store: &dyn KeyValueStore) -> Result<()> {
///     store.set("last-read/2", b"{\"verse\":255}".as_ref().into()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, replacing any existing value.
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;

    /// Delete the value stored under `key`.
    ///
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a key exists without retrieving it.
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// List all stored keys.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Remove every stored entry.
    ///
    /// Use with caution! This wipes all persisted user state.
    async fn clear_all(&self) -> Result<()>;
}
