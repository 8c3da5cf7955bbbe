//! # Core Configuration Module
//!
//! Provides configuration management for the reader core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all capability handles the core library needs. It
//! enforces fail-fast validation so a missing bridge is reported at
//! construction time with an actionable message rather than surfacing as a
//! runtime panic mid-playback.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - Required for user-state persistence
//! - `AudioBackend` - Required for playback
//!
//! ## Optional Dependencies
//!
//! - `Clock` - Time source (defaults to [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .key_value_store(Arc::new(MyStore))
//!     .audio_backend(Arc::new(MyAudioBackend))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioBackend, Clock, KeyValueStore, SystemClock};
use std::sync::Arc;

use crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Core configuration for the reader core.
///
/// This struct holds all capability handles required to initialize the core
/// library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// User-state persistence (required)
    pub key_value_store: Arc<dyn KeyValueStore>,

    /// Platform audio engine (required)
    pub audio_backend: Arc<dyn AudioBackend>,

    /// Time source for recorded timestamps
    pub clock: Arc<dyn Clock>,

    /// Event bus buffer size
    pub event_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("audio_backend", &"AudioBackend { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "Event capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then call
/// [`build()`](CoreConfigBuilder::build) to create the final config. The
/// builder validates required capabilities and provides helpful error
/// messages.
#[derive(Default)]
pub struct CoreConfigBuilder {
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    audio_backend: Option<Arc<dyn AudioBackend>>,
    clock: Option<Arc<dyn Clock>>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the key-value store implementation (required).
    ///
    /// The store persists bookmarks, preferences, and last-read positions as
    /// opaque byte blobs.
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Sets the audio backend implementation (required).
    ///
    /// The backend is the platform audio engine behind the playback core.
    pub fn audio_backend(mut self, backend: Arc<dyn AudioBackend>) -> Self {
        self.audio_backend = Some(backend);
        self
    }

    /// Sets the time source (optional).
    ///
    /// Defaults to [`SystemClock`]. Inject a fixed clock in tests to make
    /// recorded timestamps deterministic.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the event bus buffer size.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`].
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing capability when a required bridge
    /// was not provided, or when configuration values are invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let key_value_store = self.key_value_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "KeyValueStore".to_string(),
            message: "KeyValueStore implementation is required for user-state persistence. \
                     Desktop: inject bridge_desktop::FileKeyValueStore. \
                     Mobile: inject platform-native preferences storage."
                .to_string(),
        })?;

        let audio_backend = self.audio_backend.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioBackend".to_string(),
            message: "AudioBackend implementation is required for playback. \
                     Inject an adapter over the platform audio engine."
                .to_string(),
        })?;

        let config = CoreConfig {
            key_value_store,
            audio_backend,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_capacity: self.event_capacity.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
