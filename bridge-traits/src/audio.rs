//! Platform Audio Engine Abstraction
//!
//! Defines the seam between the playback core and the host's audio engine.
//! The core never decodes or outputs audio itself; it asks the backend to
//! load a clip to readiness, start it, stop it, and release it, and observes
//! natural completion through a broadcast channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::error::Result;

/// Opaque identifier for a clip loaded inside the backend.
///
/// Identifiers are never reused while the backend instance lives, so a stale
/// id from a superseded load can be distinguished from the currently active
/// clip by plain equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

/// Platform audio engine trait.
///
/// Abstracts the host's audio stack:
/// - Desktop: a player process or audio library wrapper
/// - iOS/Android: the platform media player
///
/// ## Contract
///
/// - `load` fetches/decodes the resource at `url` until it is ready to start
///   with no further buffering delay.
/// - At most one playback is active per clip; `play` on an already-playing
///   clip is an error the backend may surface as `OperationFailed`.
/// - The [`finished`](AudioBackend::finished) channel delivers a clip's id
///   exactly once per successful `play` when the clip reaches its natural
///   end. It is **not** delivered when `stop` preempted playback.
/// - `release` stops the clip if it is playing, frees the underlying
///   resources, and is idempotent: releasing an already-released or
///   never-loaded id succeeds.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::audio::AudioBackend;
///
/// async fn play_once(backend: &dyn AudioBackend, url: &str) -> bridge_traits::error::Result<()> {
///     let clip = backend.load(url).await?;
///     let mut finished = backend.finished();
///     backend.play(clip).await?;
///     while let Ok(done) = finished.recv().await {
///         if done == clip {
///             break;
///         }
///     }
///     backend.release(clip).await
/// }
/// ```
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Load the audio resource at `url` and prepare it for playback.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::LoadFailed`](crate::BridgeError::LoadFailed)
    /// when the resource is unreachable or cannot be decoded.
    async fn load(&self, url: &str) -> Result<ClipId>;

    /// Start playback of a loaded clip from its beginning.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownClip`](crate::BridgeError::UnknownClip)
    /// if the clip was released or never loaded.
    async fn play(&self, clip: ClipId) -> Result<()>;

    /// Halt playback of a clip without releasing its resources.
    ///
    /// Suppresses the pending `finished` notification for that play.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownClip`](crate::BridgeError::UnknownClip)
    /// if the clip was released or never loaded.
    async fn stop(&self, clip: ClipId) -> Result<()>;

    /// Release a clip's underlying resources.
    ///
    /// Idempotent; safe to call on an already-released or never-loaded id.
    async fn release(&self, clip: ClipId) -> Result<()>;

    /// Subscribe to natural-completion notifications.
    ///
    /// Each successfully played clip is announced exactly once when it
    /// reaches its end; stopped or released clips are never announced.
    fn finished(&self) -> broadcast::Receiver<ClipId>;
}
