//! # Clip Loading
//!
//! Wraps the platform [`AudioBackend`] with handle bookkeeping: which clips
//! are currently live, idempotent release, and error mapping into the
//! playback taxonomy.

use bridge_traits::audio::{AudioBackend, ClipId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{PlayerError, Result};

/// A loaded, ready-to-play clip.
///
/// Handles are plain references; releasing one through [`ClipLoader::release`]
/// invalidates every copy of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipHandle {
    id: ClipId,
    url: String,
}

impl ClipHandle {
    /// Backend clip identifier.
    pub fn id(&self) -> ClipId {
        self.id
    }

    /// Source URL the clip was loaded from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Loader managing live clip handles over the platform audio backend.
#[derive(Clone)]
pub struct ClipLoader {
    backend: Arc<dyn AudioBackend>,
    live: Arc<Mutex<HashSet<ClipId>>>,
}

impl ClipLoader {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            live: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Load the resource at `url` into a ready-to-play clip.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Load`] when the backend cannot fetch or decode
    /// the resource.
    pub async fn load(&self, url: &str) -> Result<ClipHandle> {
        let id = self.backend.load(url).await.map_err(|e| PlayerError::Load {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.live.lock().insert(id);
        debug!(%id, url = url, "Loaded clip");

        Ok(ClipHandle {
            id,
            url: url.to_string(),
        })
    }

    /// Start playback of a loaded clip.
    ///
    /// Natural completion is announced on [`completions`](Self::completions)
    /// exactly once per successful play, unless [`stop`](Self::stop)
    /// preempts it.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Clip`] if the handle was released or never
    /// loaded, or the backend refuses to start it.
    pub async fn play(&self, handle: &ClipHandle) -> Result<()> {
        self.ensure_live(handle)?;
        self.backend
            .play(handle.id)
            .await
            .map_err(|e| PlayerError::Clip(e.to_string()))
    }

    /// Halt playback without releasing the clip.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Clip`] if the handle was released or never
    /// loaded.
    pub async fn stop(&self, handle: &ClipHandle) -> Result<()> {
        self.ensure_live(handle)?;
        self.backend
            .stop(handle.id)
            .await
            .map_err(|e| PlayerError::Clip(e.to_string()))
    }

    /// Release a clip's backend resources.
    ///
    /// Idempotent: releasing an already-released or never-loaded handle is a
    /// no-op. Backend refusals are logged rather than propagated since the
    /// handle is forgotten either way.
    pub async fn release(&self, handle: &ClipHandle) {
        if !self.live.lock().remove(&handle.id) {
            return;
        }

        if let Err(e) = self.backend.release(handle.id).await {
            warn!(id = %handle.id, "Backend failed to release clip: {}", e);
        } else {
            debug!(id = %handle.id, "Released clip");
        }
    }

    /// Whether the handle still refers to a live clip.
    pub fn is_live(&self, handle: &ClipHandle) -> bool {
        self.live.lock().contains(&handle.id)
    }

    /// Number of clips currently held live by this loader.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Subscribe to natural-completion notifications from the backend.
    pub fn completions(&self) -> broadcast::Receiver<ClipId> {
        self.backend.finished()
    }

    fn ensure_live(&self, handle: &ClipHandle) -> Result<()> {
        if self.live.lock().contains(&handle.id) {
            Ok(())
        } else {
            Err(PlayerError::Clip(format!(
                "clip for {} is released or was never loaded",
                handle.url
            )))
        }
    }
}
