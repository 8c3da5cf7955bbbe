//! # Desktop Bridge Adapters
//!
//! Desktop reference implementations of the `bridge-traits` capabilities.
//!
//! Currently ships [`FileKeyValueStore`], a JSON-file-backed key-value store
//! suitable for desktop hosts and integration tests. Audio output is left to
//! the host: inject a player-backed [`AudioBackend`](bridge_traits::AudioBackend)
//! adapter for the platform's audio engine.

mod store;

pub use store::FileKeyValueStore;
