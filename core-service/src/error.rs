use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Library(#[from] core_library::LibraryError),

    #[error(transparent)]
    Playback(#[from] core_playback::PlayerError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
