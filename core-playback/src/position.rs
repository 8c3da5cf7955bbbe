//! # Last-Read Position Tracking
//!
//! Records the active verse per surah on every verse change so a surah opens
//! at the reader's last position. Entries are keyed by surah and overwrite
//! any prior record for that surah. The read path runs at surah-open time in
//! the host; the sequencer only writes.

use bridge_traits::{Clock, KeyValueStore};
use bytes::Bytes;
use core_library::models::{LastReadPosition, Verse};
use core_runtime::events::{CoreEvent, EventBus, PositionEvent};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;

fn position_key(surah_number: u16) -> String {
    format!("last-read/{}", surah_number)
}

/// Persists last-read positions through the key-value bridge.
#[derive(Clone)]
pub struct PositionTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events: Option<Arc<EventBus>>,
}

impl PositionTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            events: None,
        }
    }

    /// Attach an event bus for recorded-position notifications.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Record `verse` as the last-read position of its surah.
    pub async fn record(&self, verse: &Verse) -> Result<()> {
        let position = LastReadPosition {
            surah_number: verse.surah_number,
            verse_number: verse.number_in_surah,
            timestamp_millis: self.clock.now_unix_millis(),
        };

        let raw = serde_json::to_vec(&position)?;
        self.store
            .set(&position_key(verse.surah_number), Bytes::from(raw))
            .await?;

        debug!(
            surah = verse.surah_number,
            verse = verse.number_in_surah,
            "Recorded last-read position"
        );

        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Position(PositionEvent::Recorded {
                surah_number: verse.surah_number,
                verse_number: verse.number_in_surah,
            }));
        }

        Ok(())
    }

    /// Load the last-read position for a surah, if one was recorded.
    ///
    /// A corrupt record is logged and treated as absent.
    pub async fn load(&self, surah_number: u16) -> Result<Option<LastReadPosition>> {
        let raw = match self.store.get(&position_key(surah_number)).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_slice(&raw) {
            Ok(position) => Ok(Some(position)),
            Err(e) => {
                warn!(
                    surah = surah_number,
                    "Discarding corrupt last-read record: {}", e
                );
                Ok(None)
            }
        }
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

    fn verse(surah: u16, number_in_surah: u16) -> Verse {
        Verse {
            number: surah as u32 * 1000 + number_in_surah as u32,
            number_in_surah,
            surah_number: surah,
            juz: 1,
            text: "text".to_string(),
            recitation_url: None,
            translation_audio: Default::default(),
            translations: Default::default(),
        }
    }

    #[tokio::test]
    async fn record_and_load() {
        let tracker = PositionTracker::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock(42)));

        tracker.record(&verse(2, 255)).await.unwrap();

        let position = tracker.load(2).await.unwrap().unwrap();
        assert_eq!(position.surah_number, 2);
        assert_eq!(position.verse_number, 255);
        assert_eq!(position.timestamp_millis, 42);

        assert!(tracker.load(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn newer_record_overwrites() {
        let tracker = PositionTracker::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock(42)));

        tracker.record(&verse(2, 10)).await.unwrap();
        tracker.record(&verse(2, 11)).await.unwrap();

        let position = tracker.load(2).await.unwrap().unwrap();
        assert_eq!(position.verse_number, 11);
    }

    #[tokio::test]
    async fn positions_are_per_surah() {
        let tracker = PositionTracker::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock(42)));

        tracker.record(&verse(2, 10)).await.unwrap();
        tracker.record(&verse(3, 1)).await.unwrap();

        assert_eq!(tracker.load(2).await.unwrap().unwrap().verse_number, 10);
        assert_eq!(tracker.load(3).await.unwrap().unwrap().verse_number, 1);
    }

    #[tokio::test]
    async fn corrupt_record_is_absent() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("last-read/5", Bytes::from_static(b"not-json"))
            .await
            .unwrap();

        let tracker = PositionTracker::new(store, Arc::new(FixedClock(0)));
        assert!(tracker.load(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn emits_recorded_event() {
        let bus = Arc::new(EventBus::new(8));
        let mut sub = bus.subscribe();

        let tracker = PositionTracker::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock(1)))
            .with_event_bus(bus);
        tracker.record(&verse(18, 10)).await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Position(PositionEvent::Recorded {
                surah_number: 18,
                verse_number: 10,
            })
        );
    }
}
