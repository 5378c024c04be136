//! Pipeline error types

use thiserror::Error;

/// Pipeline stage that produced a numeric failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Svd,
    KMeans,
    Mds,
    Reconstruction,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Svd => write!(f, "svd"),
            Self::KMeans => write!(f, "kmeans"),
            Self::Mds => write!(f, "mds"),
            Self::Reconstruction => write!(f, "reconstruction"),
        }
    }
}

/// Errors that can occur while building a landscape
#[derive(Debug, Clone, Error)]
pub enum LandscapeError {
    /// The corpus handed to the pipeline has no documents
    #[error("corpus is empty")]
    EmptyCorpus,

    /// Field configuration cannot be used to build a feature space
    #[error("invalid field configuration: {0}")]
    InvalidFields(String),

    /// Pipeline parameters out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A numeric routine failed or produced non-finite values
    #[error("{stage} failed: {message}")]
    Numeric { stage: Stage, message: String },
}

impl LandscapeError {
    pub(crate) fn numeric(stage: Stage, message: impl Into<String>) -> Self {
        Self::Numeric {
            stage,
            message: message.into(),
        }
    }

    /// Input errors are rejected before any computation starts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCorpus | Self::InvalidFields(_) | Self::InvalidConfig(_)
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, LandscapeError>;
