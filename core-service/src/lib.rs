//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (key-value storage,
//! audio backend, clock) into the shared Rust core: verse repository,
//! preferences, bookmarks, position tracking, and the playback sequencer.
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) for the file-backed store; mobile hosts inject their
//! own adapters.
//!
//! The façade is the single composition root. There is no global state: the
//! host constructs one [`ReaderCore`] per session, forwards UI intents to
//! [`player()`](ReaderCore::player), and calls
//! [`shutdown()`](ReaderCore::shutdown) on teardown.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_library::preferences::PreferencesService;
use core_library::repository::{InMemoryVerseRepository, VerseRepository};
use core_library::BookmarkService;
use core_playback::{
    ClipLoader, PlaybackSequencer, PlaybackSettings, PlayerConfig, PositionTracker, Prefetcher,
    SettingsSource,
};
use core_runtime::events::EventBus;
use core_runtime::CoreConfig;
use tracing::info;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::FileKeyValueStore;

/// Adapter exposing the preferences service as the sequencer's settings
/// source, so translation toggles apply from the next verse on.
struct PreferenceSettings(Arc<PreferencesService>);

impl SettingsSource for PreferenceSettings {
    fn playback_settings(&self) -> PlaybackSettings {
        let prefs = self.0.snapshot();
        PlaybackSettings {
            with_translation: prefs.with_translation,
            language: prefs.selected_language,
        }
    }
}

/// Primary façade exposed to host applications.
pub struct ReaderCore {
    events: Arc<EventBus>,
    repository: Arc<InMemoryVerseRepository>,
    preferences: Arc<PreferencesService>,
    bookmarks: Arc<BookmarkService>,
    positions: PositionTracker,
    player: PlaybackSequencer,
}

impl ReaderCore {
    /// Build the core from host bridges with the default player
    /// configuration.
    pub async fn new(config: CoreConfig) -> Result<Self> {
        Self::with_player_config(config, PlayerConfig::default()).await
    }

    /// Build the core with an explicit player configuration.
    pub async fn with_player_config(
        config: CoreConfig,
        player_config: PlayerConfig,
    ) -> Result<Self> {
        player_config
            .validate()
            .map_err(CoreError::InitializationFailed)?;

        let events = Arc::new(EventBus::new(config.event_capacity));
        let repository = Arc::new(InMemoryVerseRepository::new());

        let preferences = Arc::new(
            PreferencesService::load(config.key_value_store.clone())
                .await?
                .with_event_bus(events.clone()),
        );
        let bookmarks = Arc::new(
            BookmarkService::load(config.key_value_store.clone(), config.clock.clone()).await?,
        );
        let positions = PositionTracker::new(config.key_value_store.clone(), config.clock.clone())
            .with_event_bus(events.clone());

        let loader = ClipLoader::new(config.audio_backend.clone());
        let prefetcher = Prefetcher::new(loader.clone(), &player_config);
        let settings: Arc<dyn SettingsSource> =
            Arc::new(PreferenceSettings(preferences.clone()));
        let verse_source: Arc<dyn VerseRepository> = repository.clone();

        let player = PlaybackSequencer::new(
            loader,
            prefetcher,
            positions.clone(),
            verse_source,
            settings,
            player_config,
        )
        .with_event_bus(events.clone());

        info!("Reader core initialized");

        Ok(Self {
            events,
            repository,
            preferences,
            bookmarks,
            positions,
            player,
        })
    }

    /// Event bus carrying playback, position, and preference notifications.
    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    /// Verse repository; the host's data layer seeds it after fetching.
    pub fn verses(&self) -> Arc<InMemoryVerseRepository> {
        self.repository.clone()
    }

    /// User preference service.
    pub fn preferences(&self) -> Arc<PreferencesService> {
        self.preferences.clone()
    }

    /// Bookmark service.
    pub fn bookmarks(&self) -> Arc<BookmarkService> {
        self.bookmarks.clone()
    }

    /// Last-read position read path, used when opening a surah.
    pub fn positions(&self) -> &PositionTracker {
        &self.positions
    }

    /// Playback intent surface and snapshot subscription.
    pub fn player(&self) -> &PlaybackSequencer {
        &self.player
    }

    /// Tear the session down, releasing every audio resource.
    pub async fn shutdown(&self) {
        self.player.shutdown().await;
        info!("Reader core shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::audio::{AudioBackend, ClipId};
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::KeyValueStore;
    use bytes::Bytes;
    use core_library::models::{RevelationKind, Surah, Verse};
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::broadcast;

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

    struct SilentBackend {
        next_id: AtomicU64,
        loaded: Mutex<HashSet<ClipId>>,
        finished: broadcast::Sender<ClipId>,
    }

    impl SilentBackend {
        fn new() -> Self {
            let (finished, _) = broadcast::channel(8);
            Self {
                next_id: AtomicU64::new(1),
                loaded: Mutex::new(HashSet::new()),
                finished,
            }
        }
    }

    #[async_trait]
    impl AudioBackend for SilentBackend {
        async fn load(&self, _url: &str) -> BridgeResult<ClipId> {
            let id = ClipId(self.next_id.fetch_add(1, Ordering::SeqCst));
            self.loaded.lock().insert(id);
            Ok(id)
        }

        async fn play(&self, _clip: ClipId) -> BridgeResult<()> {
            Ok(())
        }

        async fn stop(&self, _clip: ClipId) -> BridgeResult<()> {
            Ok(())
        }

        async fn release(&self, clip: ClipId) -> BridgeResult<()> {
            self.loaded.lock().remove(&clip);
            Ok(())
        }

        fn finished(&self) -> broadcast::Receiver<ClipId> {
            self.finished.subscribe()
        }
    }

    fn test_core_config() -> CoreConfig {
        CoreConfig::builder()
            .key_value_store(Arc::new(MemoryStore::new()))
            .audio_backend(Arc::new(SilentBackend::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn builds_from_bridges() {
        let core = ReaderCore::new(test_core_config()).await.unwrap();

        assert_eq!(core.verses().surah_count(), 0);
        assert!(!core.preferences().snapshot().with_translation);
        assert!(core.bookmarks().all().is_empty());

        core.shutdown().await;
    }

    #[tokio::test]
    async fn rejects_invalid_player_config() {
        let bad = PlayerConfig {
            prefetch_capacity: 0,
            ..Default::default()
        };
        let result = ReaderCore::with_player_config(test_core_config(), bad).await;
        assert!(matches!(result, Err(CoreError::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn preferences_drive_player_settings() {
        let core = ReaderCore::new(test_core_config()).await.unwrap();
        core.preferences().set_translation_enabled(true).await.unwrap();
        core.preferences().set_selected_language("en").await.unwrap();

        let settings = PreferenceSettings(core.preferences()).playback_settings();
        assert!(settings.with_translation);
        assert_eq!(settings.language, "en");

        core.shutdown().await;
    }

    #[tokio::test]
    async fn seeded_verses_are_playable() {
        let core = ReaderCore::new(test_core_config()).await.unwrap();

        let surah = Surah {
            number: 1,
            name: "الفاتحة".to_string(),
            english_name: "Al-Fatihah".to_string(),
            english_name_translation: "The Opening".to_string(),
            verse_count: 1,
            revelation: RevelationKind::Meccan,
        };
        let verse = Verse {
            number: 1,
            number_in_surah: 1,
            surah_number: 1,
            juz: 1,
            text: "بسم الله".to_string(),
            recitation_url: Some("https://cdn.example/1/1.mp3".to_string()),
            translation_audio: Default::default(),
            translations: Default::default(),
        };
        core.verses().insert_surah(surah, vec![verse.clone()]).unwrap();

        core.player().set_verse(verse).await;

        // Verse change was recorded for surah-open resume
        let position = core.positions().load(1).await.unwrap().unwrap();
        assert_eq!(position.verse_number, 1);

        core.shutdown().await;
    }
}
