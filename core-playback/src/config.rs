//! # Player Configuration
//!
//! Configuration for the playback engine's prefetching and transitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How many upcoming verses to warm after a verse starts playing.
    ///
    /// Default: 4.
    #[serde(default = "default_prefetch_depth")]
    pub prefetch_depth: usize,

    /// Capacity of the advisory prefetch cache. Evicted entries release
    /// their backend clips.
    ///
    /// Default: 8.
    #[serde(default = "default_prefetch_capacity")]
    pub prefetch_capacity: usize,

    /// Pause between the recitation clip ending and the translation clip
    /// starting, so the hand-off does not clip the tail of the recitation.
    ///
    /// Default: 100ms.
    #[serde(default = "default_transition_gap")]
    pub transition_gap: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            prefetch_depth: default_prefetch_depth(),
            prefetch_capacity: default_prefetch_capacity(),
            transition_gap: default_transition_gap(),
        }
    }
}

impl PlayerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.prefetch_capacity == 0 {
            return Err("prefetch_capacity must be > 0".to_string());
        }

        if self.prefetch_depth > self.prefetch_capacity {
            return Err("prefetch_depth cannot exceed prefetch_capacity".to_string());
        }

        Ok(())
    }

    /// Configuration with prefetching effectively disabled.
    pub fn no_prefetch() -> Self {
        Self {
            prefetch_depth: 0,
            ..Default::default()
        }
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_prefetch_depth() -> usize {
    4
}

fn default_prefetch_capacity() -> usize {
    8
}

fn default_transition_gap() -> Duration {
    Duration::from_millis(100)
}
