use thiserror::Error;

/// Errors produced by the library query layer.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// An insert reported success but the driver handed back no usable row id.
    #[error("invalid generated id after {0} insert")]
    InvalidGeneratedId(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
