//! # Scripture Data Model
//!
//! Core records describing surahs, verses, reciters, and the translation
//! languages the application supports. All records are plain serde-friendly
//! data; the host's REST layer produces them and the repository serves them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Surah & Verse
// ============================================================================

/// Origin of a surah's revelation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevelationKind {
    Meccan,
    Medinan,
}

/// An ordered chapter grouping of verses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surah {
    /// 1-based surah number (1..=114).
    pub number: u16,
    /// Arabic name.
    pub name: String,
    /// Transliterated English name.
    pub english_name: String,
    /// English translation of the name.
    pub english_name_translation: String,
    /// Number of verses in the surah.
    pub verse_count: u16,
    /// Meccan or Medinan revelation.
    pub revelation: RevelationKind,
}

/// A single numbered unit of scripture text.
///
/// `number` is the global verse number across the whole text;
/// `number_in_surah` is its 1-based position within its surah. Recitation
/// audio may be absent for some verses, and translation audio exists only for
/// a subset of languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Global verse number (1..=6236).
    pub number: u32,
    /// 1-based position within the surah.
    pub number_in_surah: u16,
    /// Owning surah number.
    pub surah_number: u16,
    /// Juz' the verse belongs to.
    pub juz: u8,
    /// Arabic text.
    pub text: String,
    /// Recitation audio URL, when the selected reciter provides one.
    pub recitation_url: Option<String>,
    /// Translation narration URLs keyed by language code.
    #[serde(default)]
    pub translation_audio: HashMap<String, String>,
    /// Translation texts keyed by language code.
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

impl Verse {
    /// Returns `true` if the verse has a recitation clip to play.
    pub fn has_recitation(&self) -> bool {
        self.recitation_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Translation audio URL for `language`, treating empty strings as absent.
    ///
    /// The upstream API maps editions without audio to empty strings, so the
    /// emptiness check belongs here rather than in every caller.
    pub fn translation_audio_for(&self, language: &str) -> Option<&str> {
        self.translation_audio
            .get(language)
            .map(String::as_str)
            .filter(|u| !u.is_empty())
    }

    /// Translation text for `language`, if present.
    pub fn translation_for(&self, language: &str) -> Option<&str> {
        self.translations.get(language).map(String::as_str)
    }

    /// Lightweight reference to this verse for persisted records.
    pub fn to_ref(&self) -> VerseRef {
        VerseRef {
            number: self.number,
            surah_number: self.surah_number,
            number_in_surah: self.number_in_surah,
        }
    }
}

/// Compact verse identity stored inside bookmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRef {
    pub number: u32,
    pub surah_number: u16,
    pub number_in_surah: u16,
}

// ============================================================================
// Reciters & Languages
// ============================================================================

/// An audio edition narrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reciter {
    /// Edition identifier (e.g., "ar.alafasy").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Recitation style, when the edition declares one.
    pub style: Option<String>,
    /// Language code of the edition.
    pub language: String,
}

/// A supported translation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 code used as the map key on [`Verse`].
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// Text edition identifier for this language.
    pub edition: &'static str,
    /// Whether a narrated audio edition exists.
    pub has_audio: bool,
}

/// Languages with full text + audio translation support.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language {
        code: "en",
        name: "English",
        native_name: "English",
        edition: "en.sahih",
        has_audio: true,
    },
    Language {
        code: "ur",
        name: "Urdu",
        native_name: "اردو",
        edition: "ur.jalandhry",
        has_audio: true,
    },
    Language {
        code: "fa",
        name: "Persian",
        native_name: "فارسی",
        edition: "fa.makarem",
        has_audio: true,
    },
    Language {
        code: "fr",
        name: "French",
        native_name: "Français",
        edition: "fr.hamidullah",
        has_audio: true,
    },
    Language {
        code: "ru",
        name: "Russian",
        native_name: "Русский",
        edition: "ru.kuliev",
        has_audio: true,
    },
    Language {
        code: "zh",
        name: "Chinese",
        native_name: "中文",
        edition: "zh.majian",
        has_audio: true,
    },
];

/// Look up a supported language by its code.
pub fn language_by_code(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

// ============================================================================
// Persisted User Records
// ============================================================================

/// A saved verse with an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub verse: VerseRef,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    pub note: Option<String>,
}

/// Last-read position within a surah, overwritten on every verse change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastReadPosition {
    pub surah_number: u16,
    /// 1-based verse position within the surah.
    pub verse_number: u16,
    /// Recording time, milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse_with_audio() -> Verse {
        Verse {
            number: 262,
            number_in_surah: 255,
            surah_number: 2,
            juz: 3,
            text: "آية الكرسي".to_string(),
            recitation_url: Some("https://cdn.example/2/255.mp3".to_string()),
            translation_audio: HashMap::from([
                ("en".to_string(), "https://cdn.example/en/2/255.mp3".to_string()),
                ("ur".to_string(), String::new()),
            ]),
            translations: HashMap::from([("en".to_string(), "The Throne Verse".to_string())]),
        }
    }

    #[test]
    fn recitation_presence() {
        let mut verse = verse_with_audio();
        assert!(verse.has_recitation());

        verse.recitation_url = None;
        assert!(!verse.has_recitation());

        verse.recitation_url = Some(String::new());
        assert!(!verse.has_recitation());
    }

    #[test]
    fn empty_translation_audio_is_absent() {
        let verse = verse_with_audio();
        assert_eq!(
            verse.translation_audio_for("en"),
            Some("https://cdn.example/en/2/255.mp3")
        );
        // Upstream maps missing audio editions to empty strings
        assert_eq!(verse.translation_audio_for("ur"), None);
        assert_eq!(verse.translation_audio_for("fr"), None);
    }

    #[test]
    fn verse_ref_identity() {
        let verse = verse_with_audio();
        let r = verse.to_ref();
        assert_eq!(r.number, 262);
        assert_eq!(r.surah_number, 2);
        assert_eq!(r.number_in_surah, 255);
    }

    #[test]
    fn language_lookup() {
        assert_eq!(language_by_code("ur").map(|l| l.edition), Some("ur.jalandhry"));
        assert!(language_by_code("xx").is_none());
        assert!(SUPPORTED_LANGUAGES.iter().all(|l| l.has_audio));
    }

    #[test]
    fn verse_serialization_defaults_maps() {
        let json = r#"{
            "number": 1,
            "number_in_surah": 1,
            "surah_number": 1,
            "juz": 1,
            "text": "بسم الله",
            "recitation_url": null
        }"#;
        let verse: Verse = serde_json::from_str(json).unwrap();
        assert!(verse.translation_audio.is_empty());
        assert!(verse.translations.is_empty());
    }
}
