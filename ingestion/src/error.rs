//! Error types for document ingestion.

use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can occur while ingesting documents.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Document failed schema validation.
    #[error("invalid {source_type} document: {message}")]
    InvalidDocument {
        source_type: &'static str,
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
