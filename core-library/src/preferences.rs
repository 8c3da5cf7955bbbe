//! # User Preferences
//!
//! Reading and playback preferences (translation toggle, language selection,
//! dark mode, reciter choice), cached in memory for synchronous reads and
//! persisted as one JSON blob on every change. Mutations announce themselves
//! on the event bus so the UI can react without polling.

use bridge_traits::KeyValueStore;
use bytes::Bytes;
use core_runtime::events::{CoreEvent, EventBus, PreferenceEvent};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;

const PREFERENCES_KEY: &str = "preferences";

/// Default translation language, matching the original application.
pub const DEFAULT_LANGUAGE: &str = "ur";

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Whether translation narration plays after each recitation clip.
    #[serde(default)]
    pub with_translation: bool,
    /// Language used for translation audio and text.
    #[serde(default = "default_language")]
    pub selected_language: String,
    /// Language used for on-screen translation text.
    #[serde(default = "default_language")]
    pub display_language: String,
    /// Dark mode toggle.
    #[serde(default)]
    pub dark_mode: bool,
    /// Selected recitation edition, when the user picked one.
    #[serde(default)]
    pub reciter_id: Option<String>,
    /// Per-language translation narrator choices.
    #[serde(default)]
    pub translation_reciters: HashMap<String, String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            with_translation: false,
            selected_language: default_language(),
            display_language: default_language(),
            dark_mode: false,
            reciter_id: None,
            translation_reciters: HashMap::new(),
        }
    }
}

/// Preference persistence service.
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
    events: Option<Arc<EventBus>>,
    cached: RwLock<UserPreferences>,
}

impl PreferencesService {
    /// Load persisted preferences, seeding defaults for a missing or corrupt
    /// blob.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let cached = match store.get(PREFERENCES_KEY).await? {
            Some(raw) => match serde_json::from_slice::<UserPreferences>(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Discarding corrupt preference blob: {}", e);
                    UserPreferences::default()
                }
            },
            None => UserPreferences::default(),
        };

        debug!(?cached, "Loaded preferences");

        Ok(Self {
            store,
            events: None,
            cached: RwLock::new(cached),
        })
    }

    /// Attach an event bus for change notifications.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current preferences snapshot.
    pub fn snapshot(&self) -> UserPreferences {
        self.cached.read().clone()
    }

    /// Toggle translation playback.
    pub async fn set_translation_enabled(&self, enabled: bool) -> Result<()> {
        self.update("with_translation", |p| p.with_translation = enabled)
            .await
    }

    /// Select the translation language for both audio and display text, the
    /// way the language picker in the original app did.
    pub async fn set_selected_language(&self, language: impl Into<String>) -> Result<()> {
        let language = language.into();
        self.update("selected_language", |p| {
            p.display_language = language.clone();
            p.selected_language = language;
        })
        .await
    }

    /// Change only the on-screen translation language.
    pub async fn set_display_language(&self, language: impl Into<String>) -> Result<()> {
        let language = language.into();
        self.update("display_language", |p| p.display_language = language)
            .await
    }

    /// Toggle dark mode.
    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.update("dark_mode", |p| p.dark_mode = enabled).await
    }

    /// Select a recitation edition.
    pub async fn set_reciter(&self, reciter_id: impl Into<String>) -> Result<()> {
        let reciter_id = reciter_id.into();
        self.update("reciter_id", |p| p.reciter_id = Some(reciter_id))
            .await
    }

    /// Select a translation narrator for one language.
    pub async fn set_translation_reciter(
        &self,
        language: impl Into<String>,
        reciter_id: impl Into<String>,
    ) -> Result<()> {
        let language = language.into();
        let reciter_id = reciter_id.into();
        self.update("translation_reciters", |p| {
            p.translation_reciters.insert(language, reciter_id);
        })
        .await
    }

    async fn update<F>(&self, field: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut UserPreferences),
    {
        let snapshot = {
            let mut cached = self.cached.write();
            mutate(&mut cached);
            cached.clone()
        };

        let raw = serde_json::to_vec(&snapshot)?;
        self.store.set(PREFERENCES_KEY, Bytes::from(raw)).await?;
        debug!(field = field, "Persisted preference change");

        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Preference(PreferenceEvent::Updated {
                field: field.to_string(),
            }));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use parking_lot::Mutex;

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

    #[tokio::test]
    async fn defaults_when_missing() {
        let service = PreferencesService::load(Arc::new(MemoryStore::new()))
            .await
            .unwrap();

        let prefs = service.snapshot();
        assert!(!prefs.with_translation);
        assert_eq!(prefs.selected_language, "ur");
        assert!(!prefs.dark_mode);
    }

    #[tokio::test]
    async fn language_selection_updates_display_language() {
        let service = PreferencesService::load(Arc::new(MemoryStore::new()))
            .await
            .unwrap();

        service.set_selected_language("en").await.unwrap();

        let prefs = service.snapshot();
        assert_eq!(prefs.selected_language, "en");
        assert_eq!(prefs.display_language, "en");
    }

    #[tokio::test]
    async fn persists_across_reload() {
        let store = Arc::new(MemoryStore::new());
        {
            let service = PreferencesService::load(store.clone()).await.unwrap();
            service.set_translation_enabled(true).await.unwrap();
            service.set_dark_mode(true).await.unwrap();
            service.set_reciter("ar.alafasy").await.unwrap();
            service
                .set_translation_reciter("en", "en.walk")
                .await
                .unwrap();
        }

        let reloaded = PreferencesService::load(store).await.unwrap();
        let prefs = reloaded.snapshot();
        assert!(prefs.with_translation);
        assert!(prefs.dark_mode);
        assert_eq!(prefs.reciter_id.as_deref(), Some("ar.alafasy"));
        assert_eq!(
            prefs.translation_reciters.get("en").map(String::as_str),
            Some("en.walk")
        );
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(PREFERENCES_KEY, Bytes::from_static(b"{{{"))
            .await
            .unwrap();

        let service = PreferencesService::load(store).await.unwrap();
        assert_eq!(service.snapshot(), UserPreferences::default());
    }

    #[tokio::test]
    async fn emits_change_events() {
        let bus = Arc::new(EventBus::new(8));
        let mut sub = bus.subscribe();

        let service = PreferencesService::load(Arc::new(MemoryStore::new()))
            .await
            .unwrap()
            .with_event_bus(bus);

        service.set_dark_mode(true).await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Preference(PreferenceEvent::Updated {
                field: "dark_mode".to_string()
            })
        );
    }
}
