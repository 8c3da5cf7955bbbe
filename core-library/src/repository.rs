//! # Verse Repository
//!
//! Read-side access to surahs and their ordered verse lists. The host's data
//! layer fetches records from its REST source and seeds the in-memory
//! repository; the playback engine then navigates verses without ever
//! touching the network.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::models::{Surah, Verse};

/// Ordered read access to seeded scripture data.
#[async_trait]
pub trait VerseRepository: Send + Sync {
    /// Surah record by number.
    async fn surah(&self, number: u16) -> Result<Option<Surah>>;

    /// All seeded surahs in ascending number order.
    async fn ordered_surahs(&self) -> Result<Vec<Surah>>;

    /// A single verse by surah number and 1-based position within the surah.
    async fn verse(&self, surah_number: u16, number_in_surah: u16) -> Result<Option<Verse>>;

    /// The surah's verses in reading order.
    async fn ordered_verses(&self, surah_number: u16) -> Result<Vec<Verse>>;

    /// The verse immediately following `verse` within its surah, if any.
    ///
    /// Never crosses surah boundaries.
    async fn next_verse(&self, verse: &Verse) -> Result<Option<Verse>>;

    /// The verse immediately preceding `verse` within its surah, if any.
    async fn previous_verse(&self, verse: &Verse) -> Result<Option<Verse>>;
}

struct SurahEntry {
    surah: Surah,
    verses: Vec<Verse>,
}

/// In-memory [`VerseRepository`] seeded by the host.
///
/// Verses are stored sorted by `number_in_surah`; seeding validates that every
/// verse carries the surah's number so navigation lookups stay consistent.
#[derive(Default)]
pub struct InMemoryVerseRepository {
    surahs: RwLock<BTreeMap<u16, SurahEntry>>,
}

impl InMemoryVerseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or replace) a surah and its verse list.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidData`] when a verse belongs to a
    /// different surah than the one being seeded.
    pub fn insert_surah(&self, surah: Surah, mut verses: Vec<Verse>) -> Result<()> {
        if let Some(stray) = verses.iter().find(|v| v.surah_number != surah.number) {
            return Err(LibraryError::InvalidData(format!(
                "verse {} belongs to surah {}, not surah {}",
                stray.number, stray.surah_number, surah.number
            )));
        }

        verses.sort_by_key(|v| v.number_in_surah);
        debug!(
            surah = surah.number,
            verses = verses.len(),
            "Seeded surah into repository"
        );

        self.surahs
            .write()
            .insert(surah.number, SurahEntry { surah, verses });
        Ok(())
    }

    /// Number of seeded surahs.
    pub fn surah_count(&self) -> usize {
        self.surahs.read().len()
    }

    fn neighbor(&self, verse: &Verse, offset: isize) -> Option<Verse> {
        let surahs = self.surahs.read();
        let entry = surahs.get(&verse.surah_number)?;
        let index = entry
            .verses
            .iter()
            .position(|v| v.number == verse.number)?;
        let target = index.checked_add_signed(offset)?;
        entry.verses.get(target).cloned()
    }
}

#[async_trait]
impl VerseRepository for InMemoryVerseRepository {
    async fn surah(&self, number: u16) -> Result<Option<Surah>> {
        Ok(self.surahs.read().get(&number).map(|e| e.surah.clone()))
    }

    async fn ordered_surahs(&self) -> Result<Vec<Surah>> {
        Ok(self
            .surahs
            .read()
            .values()
            .map(|e| e.surah.clone())
            .collect())
    }

    async fn verse(&self, surah_number: u16, number_in_surah: u16) -> Result<Option<Verse>> {
        let surahs = self.surahs.read();
        Ok(surahs.get(&surah_number).and_then(|e| {
            e.verses
                .iter()
                .find(|v| v.number_in_surah == number_in_surah)
                .cloned()
        }))
    }

    async fn ordered_verses(&self, surah_number: u16) -> Result<Vec<Verse>> {
        let surahs = self.surahs.read();
        Ok(surahs
            .get(&surah_number)
            .map(|e| e.verses.clone())
            .unwrap_or_default())
    }

    async fn next_verse(&self, verse: &Verse) -> Result<Option<Verse>> {
        Ok(self.neighbor(verse, 1))
    }

    async fn previous_verse(&self, verse: &Verse) -> Result<Option<Verse>> {
        Ok(self.neighbor(verse, -1))
    }
}
