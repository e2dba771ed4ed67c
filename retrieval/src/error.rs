//! Error types for the retrieval service.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval service.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding or index error.
    #[error("embedding error: {0}")]
    Embedding(#[from] vigil_embeddings::EmbeddingError),

    /// Ranking model error.
    #[error("ranking error: {0}")]
    Ranking(#[from] vigil_ranking::RankingError),

    /// Document ingestion error.
    #[error("ingest error: {0}")]
    Ingest(#[from] vigil_ingestion::IngestError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
