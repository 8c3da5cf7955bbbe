//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioBackend`](audio::AudioBackend) - Clip loading, playback control, and
//!   natural-completion notifications backed by the platform audio engine
//!
//! ### Storage
//! - [`KeyValueStore`](storage::KeyValueStore) - Opaque byte-blob persistence for
//!   user state (bookmarks, preferences, last-read positions)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Fail-Fast Strategy
//!
//! The core should fail fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::Error;
//!
//! let backend = config.audio_backend
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "AudioBackend".to_string(),
//!         message: "No audio backend implementation provided. \
//!                  Desktop: inject a player-backed adapter. \
//!                  Mobile: inject the platform-native audio engine.".to_string()
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for consistent
//! error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., clip URLs, storage keys)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks. Implementations must ensure thread safety.

pub mod audio;
pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioBackend, ClipId};
pub use storage::KeyValueStore;
pub use time::{Clock, SystemClock};
