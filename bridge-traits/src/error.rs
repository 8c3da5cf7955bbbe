use thiserror::Error;

use crate::audio::ClipId;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Audio resource could not be loaded: {0}")]
    LoadFailed(String),

    #[error("Unknown or released clip: {0}")]
    UnknownClip(ClipId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
