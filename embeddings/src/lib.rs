//! # Vigil Embeddings
//!
//! Embedding generation and exact similarity search for the vigil
//! retrieval core.
//!
//! - **Provider**: async embedding generation over HTTP
//! - **Store**: flat inner-product index with paired disk artifacts
//! - **Indexer**: batched embedding of document chunks into the store
//!
//! The index is exact: queries are scored against every stored vector.
//! Rows are unit-normalized on insert, so inner product equals cosine
//! similarity.

pub mod error;
pub mod indexer;
pub mod provider;
pub mod similarity;
pub mod store;

pub use error::{EmbeddingError, Result};
pub use indexer::EmbeddingIndexer;
pub use provider::{EmbeddingProvider, TitanProvider};
pub use similarity::{cosine_similarity, dot_product, normalize};
pub use store::{FlatIpIndex, VectorStore, INDEX_FILE, METADATA_FILE};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Default embedding dimension (Titan text embeddings v2).
pub const DEFAULT_DIMENSION: usize = 1024;
