//! # Playback Error Types
//!
//! Error taxonomy for the playback engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlayerError {
    // ========================================================================
    // Clip Errors
    // ========================================================================
    /// Audio resource could not be fetched or decoded.
    #[error("Failed to load clip from {url}: {reason}")]
    Load { url: String, reason: String },

    /// Operation on a released or never-loaded clip handle.
    #[error("Invalid clip handle: {0}")]
    Clip(String),

    /// The verse has no recitation audio to play.
    #[error("No recitation audio available for verse {verse_number}")]
    NoAudioAvailable { verse_number: u32 },

    // ========================================================================
    // Control Flow
    // ========================================================================
    /// A newer verse selection superseded this operation mid-flight.
    ///
    /// Internal discard signal for stale async continuations; never surfaced
    /// to the UI.
    #[error("Superseded by a newer verse selection")]
    Superseded,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Persistence bridge failure.
    #[error("Storage error: {0}")]
    Store(#[from] bridge_traits::BridgeError),

    /// Persisted record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlayerError {
    /// Returns `true` if this is the internal supersession signal.
    pub fn is_superseded(&self) -> bool {
        matches!(self, PlayerError::Superseded)
    }

    /// Returns `true` if this error aborts the playback session when it hits
    /// the primary clip. Translation clips recover from the same errors by
    /// skipping ahead.
    pub fn is_fatal_for_primary(&self) -> bool {
        matches!(
            self,
            PlayerError::Load { .. } | PlayerError::Clip(_) | PlayerError::NoAudioAvailable { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

// ============================================================================
// Snapshot Fault Record
// ============================================================================

/// Category of a surfaced playback fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// A clip failed to load.
    Load,
    /// A clip operation failed (released handle, backend refusal).
    Clip,
    /// The verse has no recitation audio.
    NoAudio,
}

/// Cloneable error record carried on [`PlaybackSnapshot`](crate::PlaybackSnapshot).
///
/// The application layer decides how to render it (e.g., a toast); recoverable
/// faults describe a skipped translation clip while playback continued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackFault {
    pub kind: FaultKind,
    pub message: String,
    /// Whether playback continued past the fault.
    pub recoverable: bool,
}

impl PlaybackFault {
    /// Fatal fault from a primary-clip error.
    pub fn fatal(error: &PlayerError) -> Self {
        Self {
            kind: Self::kind_of(error),
            message: error.to_string(),
            recoverable: false,
        }
    }

    /// Recoverable fault from a skipped translation clip.
    pub fn recoverable(error: &PlayerError) -> Self {
        Self {
            kind: Self::kind_of(error),
            message: error.to_string(),
            recoverable: true,
        }
    }

    fn kind_of(error: &PlayerError) -> FaultKind {
        match error {
            PlayerError::Load { .. } => FaultKind::Load,
            PlayerError::NoAudioAvailable { .. } => FaultKind::NoAudio,
            _ => FaultKind::Clip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let load = PlayerError::Load {
            url: "https://cdn.example/a.mp3".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(load.is_fatal_for_primary());
        assert!(!load.is_superseded());

        assert!(PlayerError::Superseded.is_superseded());
        assert!(!PlayerError::Superseded.is_fatal_for_primary());
    }

    #[test]
    fn fault_kinds() {
        let load = PlayerError::Load {
            url: "u".to_string(),
            reason: "r".to_string(),
        };
        assert_eq!(PlaybackFault::fatal(&load).kind, FaultKind::Load);

        let no_audio = PlayerError::NoAudioAvailable { verse_number: 7 };
        let fault = PlaybackFault::fatal(&no_audio);
        assert_eq!(fault.kind, FaultKind::NoAudio);
        assert!(!fault.recoverable);

        let clip = PlayerError::Clip("released".to_string());
        let fault = PlaybackFault::recoverable(&clip);
        assert_eq!(fault.kind, FaultKind::Clip);
        assert!(fault.recoverable);
    }
}
