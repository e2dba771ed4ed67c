//! # Vigil Retrieval
//!
//! The query-side of the vigil core: hybrid retrieval over the vector
//! index, learned reranking, and the service state that binds them to a
//! hot-swappable index generation.
//!
//! ```text
//! query ──► HybridRetriever ──► candidates ──► Reranker ──► top-k
//!                │                                 │
//!          FlatIpIndex                       RankerPredictor
//!                ▲
//!        IndexReload (stale artifacts deleted, fresh sync, atomic swap)
//! ```
//!
//! Retrieval over-fetches candidates before metadata filtering, so a
//! highly selective filter can return fewer than `top_k` results even
//! when more matches exist deeper in the ranked list. That is expected
//! behavior of the fixed over-fetch multiplier.

pub mod artifacts;
pub mod error;
pub mod pipeline;
pub mod reranker;
pub mod retriever;
pub mod service;

pub use artifacts::{ArtifactSource, DirArtifactSource};
pub use error::{Result, RetrievalError};
pub use pipeline::RetrievalPipeline;
pub use reranker::{ModelReranker, Reranker};
pub use retriever::HybridRetriever;
pub use service::{Generation, IngestReport, SearchService};
