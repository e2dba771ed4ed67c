//! Error types for the ranking system.

use thiserror::Error;

/// Result type alias for ranking operations.
pub type Result<T> = std::result::Result<T, RankingError>;

/// Errors that can occur in the ranking system.
#[derive(Error, Debug)]
pub enum RankingError {
    /// Inference attempted before a model was loaded.
    #[error("no model loaded")]
    ModelNotLoaded,

    /// Training inputs are inconsistent.
    #[error("invalid training data: {0}")]
    InvalidTrainingData(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
