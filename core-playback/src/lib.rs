//! # Playback Module
//!
//! Verse playback sequencing for the reader core.
//!
//! ## Overview
//!
//! This module handles:
//! - Loading recitation and translation clips through the platform audio
//!   backend ([`ClipLoader`])
//! - The verse playback state machine: recitation, optional translation
//!   narration, automatic advance to the next verse ([`PlaybackSequencer`])
//! - Advisory prefetching of upcoming clips ([`Prefetcher`])
//! - Last-read position recording ([`PositionTracker`])
//!
//! ## Architecture
//!
//! The sequencer owns the only mutable playback state. The UI layer issues
//! intents (`set_verse`, `set_playing_intent`, `request_next`,
//! `request_previous`) and renders read-only [`PlaybackSnapshot`]s received
//! over a watch channel; it never mutates playback state directly.
//!
//! ```text
//! UI intents ──> PlaybackSequencer ──> ClipLoader ──> AudioBackend (host)
//!                    │    ▲                │
//!     snapshots <────┘    └── finished ────┘
//!                         notifications
//! ```
//!
//! Verse changes can arrive while a load is in flight, so every async
//! continuation carries the generation number current when it started and
//! re-validates it before touching state; superseded continuations release
//! whatever they acquired and vanish.

pub mod clip;
pub mod config;
pub mod error;
pub mod position;
pub mod prefetch;
pub mod sequencer;
pub mod settings;

pub use clip::{ClipHandle, ClipLoader};
pub use config::PlayerConfig;
pub use error::{FaultKind, PlaybackFault, PlayerError, Result};
pub use position::PositionTracker;
pub use prefetch::Prefetcher;
pub use sequencer::{PlaybackPhase, PlaybackSequencer, PlaybackSnapshot};
pub use settings::{PlaybackSettings, SettingsSource, StaticSettings};
