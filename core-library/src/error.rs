use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Underlying bridge (storage) failure.
    #[error("Storage error: {0}")]
    Store(#[from] bridge_traits::BridgeError),

    /// Persisted blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Seeded data violates an invariant (e.g., verse from the wrong surah).
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
