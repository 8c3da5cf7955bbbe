//! # Event Bus System
//!
//! Provides an event-driven architecture for the reader core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between core modules through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! The playback engine, position tracker, and preferences service emit events
//! here; the host UI subscribes to drive toasts, badges, and analytics without
//! coupling to internal state.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, PlaybackEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! let event = CoreEvent::Playback(PlaybackEvent::Started {
//!     surah_number: 2,
//!     verse_number: 255,
//! });
//! event_bus.emit(event).ok();
//!
//! let received = subscriber.recv().await.unwrap();
//! assert!(matches!(received, CoreEvent::Playback(_)));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types of
//! errors on the receiving side:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback-related events
    Playback(PlaybackEvent),
    /// Last-read position events
    Position(PositionEvent),
    /// User preference events
    Preference(PreferenceEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Position(e) => e.description(),
            CoreEvent::Preference(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { recoverable, .. }) => {
                if *recoverable {
                    EventSeverity::Warning
                } else {
                    EventSeverity::Error
                }
            }
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::SequenceEnded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Recitation began playing for a verse.
    Started {
        /// Surah the verse belongs to.
        surah_number: u16,
        /// Verse position within the surah.
        verse_number: u16,
    },
    /// Playback was paused by the user.
    Paused {
        /// Surah the verse belongs to.
        surah_number: u16,
        /// Verse position within the surah.
        verse_number: u16,
    },
    /// The engine advanced to another verse.
    Advanced {
        /// Surah the verse belongs to.
        surah_number: u16,
        /// Verse position within the surah.
        verse_number: u16,
    },
    /// Sequencing stopped at the last verse of the surah.
    SequenceEnded {
        /// The surah whose final verse finished.
        surah_number: u16,
    },
    /// Playback error occurred.
    Error {
        /// Human-readable error message.
        message: String,
        /// Whether playback continued past the error (e.g., a skipped
        /// translation clip).
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Advanced { .. } => "Advanced to verse",
            PlaybackEvent::SequenceEnded { .. } => "Reached end of surah",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Position Events
// ============================================================================

/// Events related to last-read position tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PositionEvent {
    /// A last-read position was persisted for a surah.
    Recorded {
        /// The surah whose position was recorded.
        surah_number: u16,
        /// Verse position within the surah.
        verse_number: u16,
    },
}

impl PositionEvent {
    fn description(&self) -> &str {
        match self {
            PositionEvent::Recorded { .. } => "Last-read position recorded",
        }
    }
}

// ============================================================================
// Preference Events
// ============================================================================

/// Events related to user preference changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PreferenceEvent {
    /// A preference field changed and was persisted.
    Updated {
        /// The preference that changed (e.g., "selected_language").
        field: String,
    },
}

impl PreferenceEvent {
    fn description(&self) -> &str {
        match self {
            PreferenceEvent::Updated { .. } => "Preference updated",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Playback(PlaybackEvent::SequenceEnded { surah_number: 1 });

        // Should error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::Started {
            surah_number: 2,
            verse_number: 255,
        });

        let result = bus.emit(event.clone());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Position(PositionEvent::Recorded {
            surah_number: 18,
            verse_number: 10,
        });

        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        for i in 0..5 {
            let event = CoreEvent::Playback(PlaybackEvent::Advanced {
                surah_number: 1,
                verse_number: i,
            });
            bus.emit(event).ok();
        }

        // First recv should indicate lagging
        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let fatal = CoreEvent::Playback(PlaybackEvent::Error {
            message: "load failed".to_string(),
            recoverable: false,
        });
        assert_eq!(fatal.severity(), EventSeverity::Error);

        let skipped = CoreEvent::Playback(PlaybackEvent::Error {
            message: "translation skipped".to_string(),
            recoverable: true,
        });
        assert_eq!(skipped.severity(), EventSeverity::Warning);

        let advanced = CoreEvent::Playback(PlaybackEvent::Advanced {
            surah_number: 1,
            verse_number: 2,
        });
        assert_eq!(advanced.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        let event = CoreEvent::Playback(PlaybackEvent::SequenceEnded { surah_number: 114 });
        assert_eq!(event.description(), "Reached end of surah");
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::Started {
            surah_number: 2,
            verse_number: 255,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("255"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
