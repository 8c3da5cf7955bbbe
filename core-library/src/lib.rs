//! # Reader Library Module
//!
//! Domain data model and user state for the reader core.
//!
//! ## Overview
//!
//! This crate handles:
//! - Scripture data model (surahs, verses, reciters, languages)
//! - In-memory verse repository seeded by the host's data layer
//! - Bookmarks and user preferences persisted through the key-value bridge
//! - Hijri calendar date conversion
//!
//! The core never fetches data itself; the surrounding application downloads
//! surah and verse records from its REST source and seeds
//! [`InMemoryVerseRepository`], after which all lookups are local.

pub mod bookmarks;
pub mod error;
pub mod hijri;
pub mod models;
pub mod preferences;
pub mod repository;

pub use bookmarks::BookmarkService;
pub use error::{LibraryError, Result};
pub use hijri::HijriDate;
pub use models::{
    Bookmark, Language, LastReadPosition, Reciter, RevelationKind, Surah, Verse, VerseRef,
    SUPPORTED_LANGUAGES,
};
pub use preferences::{PreferencesService, UserPreferences};
pub use repository::{InMemoryVerseRepository, VerseRepository};
