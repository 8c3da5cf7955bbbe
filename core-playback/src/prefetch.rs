//! # Clip Prefetching
//!
//! Warms the loader for upcoming verses so verse transitions are gapless.
//! The cache is advisory only: the sequencer falls back to a fresh load on a
//! miss, and stale entries are simply evicted. Bounded LRU keeps rapid
//! back-and-forth navigation from accumulating unreleased backend clips —
//! evicting an entry releases its clip.

use core_library::models::Verse;
use core_library::repository::VerseRepository;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

use crate::clip::{ClipHandle, ClipLoader};
use crate::config::PlayerConfig;
use crate::settings::PlaybackSettings;

/// Advisory prefetch cache over the clip loader.
#[derive(Clone)]
pub struct Prefetcher {
    loader: ClipLoader,
    cache: Arc<Mutex<LruCache<String, ClipHandle>>>,
    depth: usize,
}

impl Prefetcher {
    pub fn new(loader: ClipLoader, config: &PlayerConfig) -> Self {
        let capacity = NonZeroUsize::new(config.prefetch_capacity.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            loader,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            depth: config.prefetch_depth,
        }
    }

    /// Remove and return the warmed clip for `url`, if present.
    pub fn take(&self, url: &str) -> Option<ClipHandle> {
        self.cache.lock().pop(url)
    }

    /// Number of clips currently warmed.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Warm the clips for the verses following `from` within its surah:
    /// the recitation clip for each of the next `prefetch_depth` verses, plus
    /// the translation clip when translation playback is enabled.
    ///
    /// Load failures are logged and skipped; prefetching never affects
    /// playback correctness.
    pub async fn warm(
        &self,
        repository: &Arc<dyn VerseRepository>,
        from: &Verse,
        settings: &PlaybackSettings,
    ) {
        if self.depth == 0 {
            return;
        }

        let mut current = from.clone();
        for _ in 0..self.depth {
            let next = match repository.next_verse(&current).await {
                Ok(Some(next)) => next,
                _ => break,
            };

            if let Some(url) = next.recitation_url.as_deref().filter(|u| !u.is_empty()) {
                self.warm_url(url).await;
            }

            if settings.with_translation {
                if let Some(url) = next.translation_audio_for(&settings.language) {
                    let url = url.to_string();
                    self.warm_url(&url).await;
                }
            }

            current = next;
        }
    }

    /// Release every warmed clip.
    pub async fn clear(&self) {
        let drained: Vec<ClipHandle> = {
            let mut cache = self.cache.lock();
            let mut drained = Vec::with_capacity(cache.len());
            while let Some((_, handle)) = cache.pop_lru() {
                drained.push(handle);
            }
            drained
        };

        for handle in drained {
            self.loader.release(&handle).await;
        }
    }

    async fn warm_url(&self, url: &str) {
        if self.cache.lock().contains(url) {
            return;
        }

        match self.loader.load(url).await {
            Ok(handle) => {
                debug!(url = url, "Prefetched clip");
                let evicted = self.cache.lock().push(url.to_string(), handle);
                if let Some((_, stale)) = evicted {
                    self.loader.release(&stale).await;
                }
            }
            Err(e) => debug!(url = url, "Prefetch skipped: {}", e),
        }
    }
}
