//! # Bookmarks
//!
//! Saved verses with optional notes, persisted as one JSON blob through the
//! key-value bridge. The list is cached in memory so membership checks from
//! the UI are synchronous; every mutation rewrites the persisted blob.

use bridge_traits::{Clock, KeyValueStore};
use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Bookmark, Verse};

const BOOKMARKS_KEY: &str = "bookmarks";

/// Bookmark collection service.
pub struct BookmarkService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cached: RwLock<Vec<Bookmark>>,
}

impl BookmarkService {
    /// Load the persisted bookmark list.
    ///
    /// A missing blob starts an empty list; a corrupt blob is logged and
    /// replaced on the next mutation rather than failing startup.
    pub async fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let cached = match store.get(BOOKMARKS_KEY).await? {
            Some(raw) => match serde_json::from_slice::<Vec<Bookmark>>(&raw) {
                Ok(bookmarks) => bookmarks,
                Err(e) => {
                    warn!("Discarding corrupt bookmark blob: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        debug!(count = cached.len(), "Loaded bookmarks");

        Ok(Self {
            store,
            clock,
            cached: RwLock::new(cached),
        })
    }

    /// Bookmark a verse. Re-bookmarking an already saved verse updates its
    /// note and timestamp instead of duplicating it.
    pub async fn add(&self, verse: &Verse, note: Option<String>) -> Result<Bookmark> {
        let bookmark = Bookmark {
            verse: verse.to_ref(),
            timestamp_millis: self.clock.now_unix_millis(),
            note,
        };

        {
            let mut cached = self.cached.write();
            cached.retain(|b| b.verse.number != verse.number);
            cached.insert(0, bookmark.clone());
        }
        self.persist().await?;

        Ok(bookmark)
    }

    /// Remove the bookmark for a verse by its global number.
    ///
    /// Returns `true` when a bookmark was actually removed.
    pub async fn remove(&self, verse_number: u32) -> Result<bool> {
        let removed = {
            let mut cached = self.cached.write();
            let before = cached.len();
            cached.retain(|b| b.verse.number != verse_number);
            cached.len() != before
        };

        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Whether a verse is currently bookmarked.
    pub fn is_bookmarked(&self, verse_number: u32) -> bool {
        self.cached
            .read()
            .iter()
            .any(|b| b.verse.number == verse_number)
    }

    /// All bookmarks, newest first.
    pub fn all(&self) -> Vec<Bookmark> {
        self.cached.read().clone()
    }

    async fn persist(&self) -> Result<()> {
        let raw = serde_json::to_vec(&*self.cached.read())?;
        self.store.set(BOOKMARKS_KEY, Bytes::from(raw)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    struct MemoryStore {
        entries: Mutex<HashMap<String, Bytes>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>> {
            Ok(self.entries.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Bytes) -> BridgeResult<()> {
            self.entries.lock().insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.entries.lock().remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.entries.lock().keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.entries.lock().clear();
            Ok(())
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_unix_millis(&self) -> i64 {
            self.0
        }
    }

    fn verse(number: u32) -> Verse {
        Verse {
            number,
            number_in_surah: number as u16,
            surah_number: 1,
            juz: 1,
            text: "text".to_string(),
            recitation_url: None,
            translation_audio: Default::default(),
            translations: Default::default(),
        }
    }

    #[tokio::test]
    async fn add_and_query() {
        let store = Arc::new(MemoryStore::new());
        let service = BookmarkService::load(store, Arc::new(FixedClock(1_000)))
            .await
            .unwrap();

        service.add(&verse(1), None).await.unwrap();
        service
            .add(&verse(2), Some("reflect on this".to_string()))
            .await
            .unwrap();

        assert!(service.is_bookmarked(1));
        assert!(service.is_bookmarked(2));
        assert!(!service.is_bookmarked(3));

        // Newest first
        let all = service.all();
        assert_eq!(all[0].verse.number, 2);
        assert_eq!(all[0].note.as_deref(), Some("reflect on this"));
        assert_eq!(all[0].timestamp_millis, 1_000);
    }

    #[tokio::test]
    async fn re_adding_replaces_entry() {
        let store = Arc::new(MemoryStore::new());
        let service = BookmarkService::load(store, Arc::new(FixedClock(5)))
            .await
            .unwrap();

        service.add(&verse(7), None).await.unwrap();
        service.add(&verse(7), Some("note".to_string())).await.unwrap();

        let all = service.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].note.as_deref(), Some("note"));
    }

    #[tokio::test]
    async fn remove_reports_membership() {
        let store = Arc::new(MemoryStore::new());
        let service = BookmarkService::load(store, Arc::new(FixedClock(5)))
            .await
            .unwrap();

        service.add(&verse(3), None).await.unwrap();
        assert!(service.remove(3).await.unwrap());
        assert!(!service.remove(3).await.unwrap());
        assert!(!service.is_bookmarked(3));
    }

    #[tokio::test]
    async fn persists_across_reload() {
        let store = Arc::new(MemoryStore::new());
        {
            let service = BookmarkService::load(store.clone(), Arc::new(FixedClock(5)))
                .await
                .unwrap();
            service.add(&verse(10), None).await.unwrap();
        }

        let reloaded = BookmarkService::load(store, Arc::new(FixedClock(6)))
            .await
            .unwrap();
        assert!(reloaded.is_bookmarked(10));
    }

    #[tokio::test]
    async fn corrupt_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(BOOKMARKS_KEY, Bytes::from_static(b"not-json"))
            .await
            .unwrap();

        let service = BookmarkService::load(store, Arc::new(FixedClock(5)))
            .await
            .unwrap();
        assert!(service.all().is_empty());
    }
}
