//! # Playback Settings Seam
//!
//! The sequencer reads translation settings fresh each time a verse begins,
//! never caching them across mutation, so a toggle mid-surah applies from the
//! next verse on.

/// Settings consulted when a verse's recitation clip finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Whether translation narration plays after the recitation clip.
    pub with_translation: bool,
    /// Language whose translation audio is played.
    pub language: String,
}

impl PlaybackSettings {
    pub fn recitation_only() -> Self {
        Self {
            with_translation: false,
            language: String::new(),
        }
    }

    pub fn with_translation(language: impl Into<String>) -> Self {
        Self {
            with_translation: true,
            language: language.into(),
        }
    }
}

/// Live view of the user's playback settings, owned by the surrounding
/// application (typically the preferences service).
pub trait SettingsSource: Send + Sync {
    /// Current settings at this instant.
    fn playback_settings(&self) -> PlaybackSettings;
}

/// Fixed settings, useful for tests and hosts without a preferences layer.
#[derive(Debug, Clone)]
pub struct StaticSettings(pub PlaybackSettings);

impl SettingsSource for StaticSettings {
    fn playback_settings(&self) -> PlaybackSettings {
        self.0.clone()
    }
}
