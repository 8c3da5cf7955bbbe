//! # Playback Sequencer
//!
//! The state machine that owns "what is currently or about to be audible".
//! For each verse it drives the chain
//! `LoadingPrimary → PlayingPrimary → (LoadingTranslation → PlayingTranslation)?
//! → Advancing → next verse`, stopping at the end of the surah.
//!
//! ## Ownership
//!
//! The sequencer is the only writer of playback state. UI code issues intents
//! (`set_verse`, `set_playing_intent`, `request_next`, `request_previous`)
//! and observes read-only [`PlaybackSnapshot`]s from the watch channel.
//! Construct one instance per session and tear it down with
//! [`shutdown`](PlaybackSequencer::shutdown); nothing here is tied to a UI
//! lifecycle.
//!
//! ## Supersession
//!
//! A verse change can arrive while a load is in flight, so every transition
//! captures the generation counter current when it started and re-validates
//! it before applying effects. Stale continuations release whatever they
//! acquired and disappear; their completions are never applied to state.
//!
//! ## Failure policy
//!
//! Primary-clip failures abort the session: intent clears, state returns to
//! `Idle`, and the fault is surfaced for the UI to render. Translation-clip
//! failures are recovered locally by skipping straight to the next verse.

use bridge_traits::audio::ClipId;
use core_library::models::Verse;
use core_library::repository::VerseRepository;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clip::{ClipHandle, ClipLoader};
use crate::config::PlayerConfig;
use crate::error::{PlaybackFault, PlayerError, Result};
use crate::position::PositionTracker;
use crate::prefetch::Prefetcher;
use crate::settings::SettingsSource;

// ============================================================================
// Phase & Snapshot
// ============================================================================

/// Current step of the playback state machine for the active verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Nothing loading or playing.
    Idle,
    /// Recitation clip is being loaded.
    LoadingPrimary,
    /// Recitation clip is playing.
    PlayingPrimary,
    /// Translation clip is being loaded.
    LoadingTranslation,
    /// Translation clip is playing.
    PlayingTranslation,
    /// Moving on to the next verse.
    Advancing,
}

impl PlaybackPhase {
    /// Returns `true` while a clip is audible.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::PlayingPrimary | Self::PlayingTranslation)
    }

    /// Returns `true` while a clip is being loaded.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingPrimary | Self::LoadingTranslation)
    }
}

/// Read-only view of playback state published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// The verse currently targeted for playback.
    pub verse: Option<Verse>,
    /// Current step of the state machine.
    pub phase: PlaybackPhase,
    /// Whether the user wants audio playing, independent of load progress.
    pub playing_intent: bool,
    /// Last surfaced failure, cleared on the next successful transition.
    pub fault: Option<PlaybackFault>,
}

impl PlaybackSnapshot {
    fn initial() -> Self {
        Self {
            verse: None,
            phase: PlaybackPhase::Idle,
            playing_intent: false,
            fault: None,
        }
    }
}

// ============================================================================
// Internal State
// ============================================================================

enum Slot {
    Primary,
    Translation,
}

struct SequencerState {
    verse: Option<Verse>,
    phase: PlaybackPhase,
    playing_intent: bool,
    fault: Option<PlaybackFault>,
    /// Bumped on every supersession point; async continuations compare
    /// against it before touching state.
    generation: u64,
    primary: Option<ClipHandle>,
    translation: Option<ClipHandle>,
}

impl SequencerState {
    fn new() -> Self {
        Self {
            verse: None,
            phase: PlaybackPhase::Idle,
            playing_intent: false,
            fault: None,
            generation: 0,
            primary: None,
            translation: None,
        }
    }

    fn take_slots(&mut self) -> Vec<ClipHandle> {
        self.primary
            .take()
            .into_iter()
            .chain(self.translation.take())
            .collect()
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            verse: self.verse.clone(),
            phase: self.phase,
            playing_intent: self.playing_intent,
            fault: self.fault.clone(),
        }
    }
}

struct SequencerInner {
    /// Self-handle for spawning background steps from `&self` methods.
    me: Weak<SequencerInner>,
    repository: Arc<dyn VerseRepository>,
    settings: Arc<dyn SettingsSource>,
    loader: ClipLoader,
    prefetcher: Prefetcher,
    positions: PositionTracker,
    config: PlayerConfig,
    events: RwLock<Option<Arc<EventBus>>>,
    state: Mutex<SequencerState>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
}

// ============================================================================
// Sequencer
// ============================================================================

/// Verse playback state machine.
pub struct PlaybackSequencer {
    inner: Arc<SequencerInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSequencer {
    /// Create a sequencer over the given collaborators.
    ///
    /// Spawns the clip-completion listener, so a Tokio runtime must be
    /// current.
    pub fn new(
        loader: ClipLoader,
        prefetcher: Prefetcher,
        positions: PositionTracker,
        repository: Arc<dyn VerseRepository>,
        settings: Arc<dyn SettingsSource>,
        config: PlayerConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot::initial());
        let inner = Arc::new_cyclic(|me| SequencerInner {
            me: me.clone(),
            repository,
            settings,
            loader,
            prefetcher,
            positions,
            config,
            events: RwLock::new(None),
            state: Mutex::new(SequencerState::new()),
            snapshot_tx,
        });

        let listener = Self::spawn_completion_listener(&inner);

        Self {
            inner,
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Attach an event bus for playback notifications.
    pub fn with_event_bus(self, events: Arc<EventBus>) -> Self {
        *self.inner.events.write() = Some(events);
        self
    }

    /// Subscribe to state snapshots.
    ///
    /// The receiver immediately holds the current snapshot and observes every
    /// subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Target a verse for playback.
    ///
    /// Supersedes any in-flight load or playback for the previous verse and
    /// releases its clips, records the last-read position, and — when the
    /// playing intent is set — starts the load/play sequence for the new
    /// verse. A verse without recitation audio while intent is set clears the
    /// intent and surfaces a `NoAudio` fault.
    pub async fn set_verse(&self, verse: Verse) {
        self.inner.set_verse(verse).await;
    }

    /// Set the user's play/pause intent.
    ///
    /// Turning intent on while idle with a verse targeted starts the
    /// sequence; repeating it is a no-op. Turning intent off stops whatever
    /// is audible (translation first) but keeps clips loaded; resuming
    /// re-triggers loading.
    pub async fn set_playing_intent(&self, intent: bool) {
        self.inner.set_playing_intent(intent).await;
    }

    /// Jump to the next verse in the surah, preserving the current intent.
    ///
    /// At the last verse this stops sequencing: intent clears and the phase
    /// returns to `Idle` without crossing into the next surah.
    pub async fn request_next(&self) {
        self.inner.request_next_from_current().await;
    }

    /// Jump to the previous verse in the surah, preserving the current
    /// intent. No-op at the first verse.
    pub async fn request_previous(&self) {
        self.inner.request_previous_from_current().await;
    }

    /// Tear the session down: stop listening for completions, release every
    /// held clip, and drop the prefetch cache.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }

        let released = {
            let mut st = self.inner.state.lock();
            st.generation += 1;
            st.playing_intent = false;
            st.phase = PlaybackPhase::Idle;
            st.take_slots()
        };
        self.inner.release_all(released).await;
        self.inner.prefetcher.clear().await;
        self.inner.publish();

        info!("Playback sequencer shut down");
    }

    fn spawn_completion_listener(inner: &Arc<SequencerInner>) -> JoinHandle<()> {
        let weak = Arc::downgrade(inner);
        let mut completions = inner.loader.completions();

        tokio::spawn(async move {
            loop {
                match completions.recv().await {
                    Ok(clip) => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.on_clip_finished(clip).await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Clip completion listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Drop for PlaybackSequencer {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
    }
}

// ============================================================================
// Transition Logic
// ============================================================================

impl SequencerInner {
    async fn set_verse(&self, verse: Verse) {
        let (gen, released, start) = {
            let mut st = self.state.lock();
            st.generation += 1;
            let released = st.take_slots();
            st.phase = PlaybackPhase::Idle;
            st.verse = Some(verse.clone());
            (st.generation, released, st.playing_intent)
        };

        debug!(
            verse = verse.number,
            generation = gen,
            "Verse targeted for playback"
        );

        self.release_all(released).await;
        self.publish();
        self.emit(PlaybackEvent::Advanced {
            surah_number: verse.surah_number,
            verse_number: verse.number_in_surah,
        });

        // Last-read tracking is best effort; a storage hiccup must not stop
        // recitation.
        if let Err(e) = self.positions.record(&verse).await {
            warn!("Failed to persist last-read position: {}", e);
        }

        if start {
            self.begin_verse(gen, verse).await;
        }
    }

    async fn set_playing_intent(&self, intent: bool) {
        if intent {
            let start = {
                let mut st = self.state.lock();
                if st.playing_intent {
                    return;
                }
                st.playing_intent = true;
                if st.phase == PlaybackPhase::Idle {
                    st.verse.clone().map(|verse| (st.generation, verse))
                } else {
                    None
                }
            };
            self.publish();

            if let Some((gen, verse)) = start {
                self.begin_verse(gen, verse).await;
            }
        } else {
            let (to_stop, paused_verse) = {
                let mut st = self.state.lock();
                if !st.playing_intent {
                    return;
                }
                st.playing_intent = false;
                let to_stop = match st.phase {
                    PlaybackPhase::PlayingTranslation => st.translation.clone(),
                    PlaybackPhase::PlayingPrimary => st.primary.clone(),
                    _ => None,
                };
                // Collapse to Idle; clips stay loaded, resume re-triggers
                // loading. The bump cancels any in-flight load.
                st.generation += 1;
                st.phase = PlaybackPhase::Idle;
                (to_stop, st.verse.clone())
            };

            if let Some(handle) = to_stop {
                if let Err(e) = self.loader.stop(&handle).await {
                    warn!("Failed to stop active clip: {}", e);
                }
            }
            self.publish();

            if let Some(verse) = paused_verse {
                self.emit(PlaybackEvent::Paused {
                    surah_number: verse.surah_number,
                    verse_number: verse.number_in_surah,
                });
            }
        }
    }

    /// Kick off the load/play pipeline for the targeted verse.
    async fn begin_verse(&self, gen: u64, verse: Verse) {
        if !verse.has_recitation() {
            let error = PlayerError::NoAudioAvailable {
                verse_number: verse.number,
            };
            self.fail(gen, &error).await;
            return;
        }

        let Some(inner) = self.me.upgrade() else { return };
        tokio::spawn(async move {
            match inner.run_primary(gen).await {
                Ok(()) => {}
                Err(e) if e.is_superseded() => debug!("Primary sequence superseded"),
                Err(e) => inner.fail(gen, &e).await,
            }
        });
    }

    async fn run_primary(&self, gen: u64) -> Result<()> {
        let (url, stale) = {
            let mut st = self.state.lock();
            if st.generation != gen {
                return Err(PlayerError::Superseded);
            }
            let verse = st.verse.as_ref().ok_or(PlayerError::Superseded)?;
            let url = verse
                .recitation_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or(PlayerError::NoAudioAvailable {
                    verse_number: verse.number,
                })?;
            st.phase = PlaybackPhase::LoadingPrimary;
            // A pause may have left clips in the slots; restarting always
            // acquires fresh ones.
            (url, st.take_slots())
        };
        self.publish();
        self.release_all(stale).await;

        let handle = self.acquire(&url).await?;
        if !self.install_slot(gen, Slot::Primary, handle.clone()) {
            self.loader.release(&handle).await;
            return Err(PlayerError::Superseded);
        }

        self.loader.play(&handle).await?;

        let verse = {
            let mut st = self.state.lock();
            if st.generation != gen {
                return Err(PlayerError::Superseded);
            }
            st.phase = PlaybackPhase::PlayingPrimary;
            st.fault = None;
            st.verse.clone()
        };
        self.publish();

        if let Some(verse) = verse {
            self.emit(PlaybackEvent::Started {
                surah_number: verse.surah_number,
                verse_number: verse.number_in_surah,
            });

            // Warm upcoming clips in the background; never on the playback
            // path.
            if let Some(inner) = self.me.upgrade() {
                let settings = self.settings.playback_settings();
                tokio::spawn(async move {
                    inner
                        .prefetcher
                        .warm(&inner.repository, &verse, &settings)
                        .await;
                });
            }
        }

        Ok(())
    }

    async fn on_clip_finished(&self, clip: ClipId) {
        enum Finished {
            Primary { gen: u64, verse: Verse },
            Translation { gen: u64 },
            Stale,
        }

        // A completion only counts if the finishing clip still occupies the
        // matching active slot; anything else is a stale callback from a
        // superseded verse.
        let decision = {
            let st = self.state.lock();
            let is_primary = st.primary.as_ref().map(ClipHandle::id) == Some(clip);
            let is_translation = st.translation.as_ref().map(ClipHandle::id) == Some(clip);

            if is_primary && st.phase == PlaybackPhase::PlayingPrimary {
                match st.verse.clone() {
                    Some(verse) => Finished::Primary {
                        gen: st.generation,
                        verse,
                    },
                    None => Finished::Stale,
                }
            } else if is_translation && st.phase == PlaybackPhase::PlayingTranslation {
                Finished::Translation { gen: st.generation }
            } else {
                Finished::Stale
            }
        };

        match decision {
            Finished::Primary { gen, verse } => self.on_primary_finished(gen, verse).await,
            Finished::Translation { gen } => self.advance(gen).await,
            Finished::Stale => debug!(%clip, "Discarding stale clip completion"),
        }
    }

    async fn on_primary_finished(&self, gen: u64, verse: Verse) {
        // Settings are read fresh for every verse, never cached across
        // mutation.
        let settings = self.settings.playback_settings();
        let translation_url = if settings.with_translation {
            verse
                .translation_audio_for(&settings.language)
                .map(str::to_string)
        } else {
            None
        };

        let Some(url) = translation_url else {
            self.advance(gen).await;
            return;
        };

        {
            let mut st = self.state.lock();
            if st.generation != gen {
                return;
            }
            st.phase = PlaybackPhase::LoadingTranslation;
        }
        self.publish();

        match self.run_translation(gen, &url).await {
            Ok(()) => {}
            Err(e) if e.is_superseded() => debug!("Translation sequence superseded"),
            Err(e) => {
                // A broken translation asset must not block recitation:
                // record the fault and move on as if the clip had finished.
                warn!("Skipping translation clip: {}", e);
                let released = {
                    let mut st = self.state.lock();
                    if st.generation != gen {
                        return;
                    }
                    st.fault = Some(PlaybackFault::recoverable(&e));
                    st.translation.take()
                };
                if let Some(handle) = released {
                    self.loader.release(&handle).await;
                }
                self.publish();
                self.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                    recoverable: true,
                });
                self.advance(gen).await;
            }
        }
    }

    async fn run_translation(&self, gen: u64, url: &str) -> Result<()> {
        // Brief gap so the hand-off does not clip the recitation tail
        if !self.config.transition_gap.is_zero() {
            tokio::time::sleep(self.config.transition_gap).await;
        }

        {
            let st = self.state.lock();
            if st.generation != gen {
                return Err(PlayerError::Superseded);
            }
        }

        let handle = self.acquire(url).await?;
        if !self.install_slot(gen, Slot::Translation, handle.clone()) {
            self.loader.release(&handle).await;
            return Err(PlayerError::Superseded);
        }

        self.loader.play(&handle).await?;

        {
            let mut st = self.state.lock();
            if st.generation != gen {
                return Err(PlayerError::Superseded);
            }
            st.phase = PlaybackPhase::PlayingTranslation;
            st.fault = None;
        }
        self.publish();

        Ok(())
    }

    async fn advance(&self, gen: u64) {
        let current = {
            let mut st = self.state.lock();
            if st.generation != gen {
                return;
            }
            st.phase = PlaybackPhase::Advancing;
            st.verse.clone()
        };
        self.publish();

        let Some(current) = current else { return };
        match self.repository.next_verse(&current).await {
            Ok(Some(next)) => self.set_verse(next).await,
            Ok(None) => self.stop_at_end(gen, current.surah_number).await,
            Err(e) => {
                error!("Verse lookup failed while advancing: {}", e);
                self.stop_at_end(gen, current.surah_number).await;
            }
        }
    }

    async fn request_next_from_current(&self) {
        let (gen, current) = {
            let st = self.state.lock();
            (st.generation, st.verse.clone())
        };
        let Some(current) = current else { return };

        match self.repository.next_verse(&current).await {
            Ok(Some(next)) => self.set_verse(next).await,
            Ok(None) => self.stop_at_end(gen, current.surah_number).await,
            Err(e) => warn!("Verse lookup failed: {}", e),
        }
    }

    async fn request_previous_from_current(&self) {
        let current = { self.state.lock().verse.clone() };
        let Some(current) = current else { return };

        match self.repository.previous_verse(&current).await {
            Ok(Some(previous)) => self.set_verse(previous).await,
            Ok(None) => {}
            Err(e) => warn!("Verse lookup failed: {}", e),
        }
    }

    /// Sequencing stops at the end of the surah; it never wraps or crosses
    /// into the next one.
    async fn stop_at_end(&self, gen: u64, surah_number: u16) {
        let released = {
            let mut st = self.state.lock();
            if st.generation != gen {
                return;
            }
            st.generation += 1;
            st.playing_intent = false;
            st.phase = PlaybackPhase::Idle;
            st.take_slots()
        };
        self.release_all(released).await;
        self.publish();
        self.emit(PlaybackEvent::SequenceEnded { surah_number });
        info!(surah = surah_number, "Reached end of surah");
    }

    /// Abort the session after a fatal primary-clip failure: no retry, no
    /// auto-advance, everything released.
    async fn fail(&self, gen: u64, error: &PlayerError) {
        let released = {
            let mut st = self.state.lock();
            if st.generation != gen {
                return;
            }
            st.playing_intent = false;
            st.phase = PlaybackPhase::Idle;
            st.fault = Some(PlaybackFault::fatal(error));
            st.take_slots()
        };
        self.release_all(released).await;
        self.publish();
        self.emit(PlaybackEvent::Error {
            message: error.to_string(),
            recoverable: false,
        });
        error!("Playback aborted: {}", error);
    }

    /// Prefer a prefetched clip; fall back to a fresh load on a miss or a
    /// stale cache entry.
    async fn acquire(&self, url: &str) -> Result<ClipHandle> {
        match self.prefetcher.take(url) {
            Some(handle) if self.loader.is_live(&handle) => {
                debug!(url = url, "Using prefetched clip");
                Ok(handle)
            }
            _ => self.loader.load(url).await,
        }
    }

    fn install_slot(&self, gen: u64, slot: Slot, handle: ClipHandle) -> bool {
        let mut st = self.state.lock();
        if st.generation != gen {
            return false;
        }
        match slot {
            Slot::Primary => st.primary = Some(handle),
            Slot::Translation => st.translation = Some(handle),
        }
        true
    }

    async fn release_all(&self, handles: Vec<ClipHandle>) {
        for handle in handles {
            self.loader.release(&handle).await;
        }
    }

    fn publish(&self) {
        let snapshot = self.state.lock().snapshot();
        let _ = self.snapshot_tx.send(snapshot);
    }

    fn emit(&self, event: PlaybackEvent) {
        let events = self.events.read().clone();
        if let Some(bus) = events {
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}
