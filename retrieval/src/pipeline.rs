//! Retrieval pipeline orchestrating search and reranking.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use vigil_core::schemas::{DocumentChunk, QueryFilters};
use vigil_ranking::RankingError;

use crate::error::{Result, RetrievalError};
use crate::reranker::Reranker;
use crate::retriever::HybridRetriever;

/// Orchestrate the full retrieval pipeline: query → embed → search →
/// filter → rerank.
pub struct RetrievalPipeline {
    retriever: Arc<HybridRetriever>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RetrievalPipeline {
    /// Create a pipeline; without a reranker, candidates are returned in
    /// similarity order.
    pub fn new(retriever: Arc<HybridRetriever>, reranker: Option<Arc<dyn Reranker>>) -> Self {
        Self {
            retriever,
            reranker,
        }
    }

    /// Total number of chunks in the underlying index.
    pub async fn total_documents(&self) -> usize {
        self.retriever.document_count().await
    }

    /// Run the full retrieval pipeline.
    ///
    /// Retrieves `retrieval_k` candidates, reranks them down to `top_k`
    /// when a reranker is configured, and measures wall-clock time
    /// around the whole operation. A reranker with no usable model is
    /// skipped — the query falls back to similarity-only ordering rather
    /// than failing.
    pub async fn run(
        &self,
        query: &str,
        top_k: usize,
        retrieval_k: usize,
        filters: Option<&QueryFilters>,
    ) -> Result<(Vec<(DocumentChunk, f32)>, f64)> {
        let start = Instant::now();

        let mut candidates = self.retriever.retrieve(query, retrieval_k, filters).await?;

        let results = match &self.reranker {
            Some(reranker) if !candidates.is_empty() => {
                let query_embedding = self.retriever.embed_query(query).await?;
                match reranker.rerank(&query_embedding, candidates.clone(), top_k) {
                    Ok(reranked) => reranked,
                    Err(RetrievalError::Ranking(RankingError::ModelNotLoaded)) => {
                        warn!("Ranking model unavailable; falling back to similarity order");
                        candidates.truncate(top_k);
                        candidates
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => {
                candidates.truncate(top_k);
                candidates
            }
        };

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!("Pipeline produced {} results in {elapsed_ms:.1}ms", results.len());
        Ok((results, elapsed_ms))
    }
}
