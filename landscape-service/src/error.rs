//! Error types for the landscape service.

use landscape_core::LandscapeError;
use thiserror::Error;

/// Error type for service operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Landscape pipeline error
    #[error("pipeline error: {0}")]
    Pipeline(#[from] LandscapeError),

    /// Request handling error (unknown method, malformed body)
    #[error("handler error: {0}")]
    Handler(String),

    /// Internal error
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// The query selected no lectures.
    pub fn is_empty_corpus(&self) -> bool {
        matches!(self, Self::Pipeline(LandscapeError::EmptyCorpus))
    }
}

/// Result type alias using the service Error.
pub type Result<T> = std::result::Result<T, Error>;
