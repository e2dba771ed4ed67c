//! Hybrid retrieval combining vector search with metadata filtering.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use vigil_core::schemas::{DocumentChunk, QueryFilters};
use vigil_embeddings::store::VectorStore;
use vigil_embeddings::{EmbeddingProvider, FlatIpIndex};

use crate::error::Result;

/// Combine vector similarity search with metadata filtering.
///
/// The index is over-fetched by a fixed multiplier before filters are
/// applied, to compensate for filter attrition. A highly selective
/// filter can still under-fill `top_k`; that is documented behavior, not
/// a defect.
pub struct HybridRetriever {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<RwLock<FlatIpIndex>>,
    fetch_multiplier: usize,
}

impl HybridRetriever {
    /// Create a retriever over the given provider and index.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<RwLock<FlatIpIndex>>) -> Self {
        Self {
            provider,
            store,
            fetch_multiplier: 2,
        }
    }

    /// Set the over-fetch multiplier (clamped to at least 1).
    pub fn with_fetch_multiplier(mut self, fetch_multiplier: usize) -> Self {
        self.fetch_multiplier = fetch_multiplier.max(1);
        self
    }

    /// Total number of chunks in the underlying index.
    pub async fn document_count(&self) -> usize {
        self.store.read().await.count()
    }

    /// Generate an embedding for the given query text.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        Ok(self.provider.embed_text(query).await?)
    }

    /// Retrieve relevant chunks via vector search plus optional metadata
    /// filtering, in descending similarity order.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<&QueryFilters>,
    ) -> Result<Vec<(DocumentChunk, f32)>> {
        let query_embedding = self.provider.embed_text(query).await?;

        let mut candidates = {
            let store = self.store.read().await;
            store.search(&query_embedding, top_k * self.fetch_multiplier)?
        };

        if let Some(filters) = filters {
            let before = candidates.len();
            candidates = apply_filters(candidates, filters);
            debug!(
                "Filters kept {} of {before} candidates",
                candidates.len()
            );
        }

        candidates.truncate(top_k);
        Ok(candidates)
    }
}

/// Apply metadata filters to candidate results.
///
/// Severity, protocol, and asset-type constraints pass chunks that lack
/// the corresponding metadata key; threat-category constraints reject
/// them. Date constraints check the chunk's publication timestamp and
/// pass chunks without a parseable one.
pub(crate) fn apply_filters(
    candidates: Vec<(DocumentChunk, f32)>,
    filters: &QueryFilters,
) -> Vec<(DocumentChunk, f32)> {
    candidates
        .into_iter()
        .filter(|(chunk, _)| chunk_passes(chunk, filters))
        .collect()
}

fn chunk_passes(chunk: &DocumentChunk, filters: &QueryFilters) -> bool {
    if let Some(severities) = &filters.severity {
        if let Some(chunk_severity) = chunk.metadata_str("severity") {
            if !severities.iter().any(|s| s.as_str() == chunk_severity) {
                return false;
            }
        }
    }

    if let Some(protocols) = &filters.protocols {
        if let Some(chunk_protocols) = chunk.metadata_strs("protocols") {
            let wanted: Vec<&str> = protocols.iter().map(|p| p.as_str()).collect();
            if !chunk_protocols.iter().any(|p| wanted.contains(p)) {
                return false;
            }
        }
    }

    if let Some(asset_types) = &filters.asset_types {
        if let Some(chunk_assets) = chunk.metadata_strs("asset_types") {
            let wanted: Vec<&str> = asset_types.iter().map(|a| a.as_str()).collect();
            if !chunk_assets.iter().any(|a| wanted.contains(a)) {
                return false;
            }
        }
    }

    if let Some(categories) = &filters.threat_categories {
        match chunk.metadata_str("threat_category") {
            Some(category) if categories.iter().any(|c| c.as_str() == category) => {}
            _ => return false,
        }
    }

    if filters.date_from.is_some() || filters.date_to.is_some() {
        let published = chunk
            .metadata_str("published")
            .or_else(|| chunk.metadata_str("reported"))
            .and_then(|value| chrono::DateTime::parse_from_rfc3339(value).ok());
        if let Some(published) = published {
            if let Some(from) = filters.date_from {
                if published < from {
                    return false;
                }
            }
            if let Some(to) = filters.date_to {
                if published > to {
                    return false;
                }
            }
        }
    }

    true
}
