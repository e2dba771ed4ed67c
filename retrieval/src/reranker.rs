//! Reranking strategies for retrieval candidates.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use ordered_float::OrderedFloat;
use tracing::debug;

use vigil_core::schemas::DocumentChunk;
use vigil_ranking::features::{FeatureExtractor, FeatureVector};
use vigil_ranking::RankerPredictor;

use crate::error::Result;

/// Capability interface for reranking strategies.
pub trait Reranker: Send + Sync {
    /// Rerank candidate chunks and return the `top_k` best.
    fn rerank(
        &self,
        query_embedding: &[f32],
        candidates: Vec<(DocumentChunk, f32)>,
        top_k: usize,
    ) -> Result<Vec<(DocumentChunk, f32)>>;
}

/// Rerank documents with the trained learning-to-rank model.
pub struct ModelReranker {
    predictor: RankerPredictor,
}

impl ModelReranker {
    /// Create a reranker over the given predictor.
    pub fn new(predictor: RankerPredictor) -> Self {
        Self { predictor }
    }
}

impl Reranker for ModelReranker {
    fn rerank(
        &self,
        query_embedding: &[f32],
        candidates: Vec<(DocumentChunk, f32)>,
        top_k: usize,
    ) -> Result<Vec<(DocumentChunk, f32)>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Query-side metadata sets stay empty at this stage; the model
        // was trained against the same distribution, so scores remain
        // self-consistent.
        let query_protocols: HashSet<String> = HashSet::new();
        let query_assets: HashSet<String> = HashSet::new();

        let features: Vec<FeatureVector> = candidates
            .iter()
            .map(|(chunk, _)| {
                let zero_embedding;
                let doc_embedding = match &chunk.embedding {
                    Some(embedding) => embedding.as_slice(),
                    None => {
                        zero_embedding = vec![0.0f32; query_embedding.len()];
                        zero_embedding.as_slice()
                    }
                };

                FeatureExtractor::extract(
                    query_embedding,
                    doc_embedding,
                    published_from_metadata(chunk),
                    &query_protocols,
                    &metadata_set(chunk, "protocols"),
                    &query_assets,
                    &metadata_set(chunk, "asset_types"),
                    0,
                )
            })
            .collect();

        let scores = self.predictor.predict_scores(&features)?;

        let mut reranked: Vec<(DocumentChunk, f32)> = candidates
            .into_iter()
            .zip(scores)
            .map(|((chunk, _vector_score), model_score)| (chunk, model_score as f32))
            .collect();
        reranked.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
        reranked.truncate(top_k);

        debug!("Reranked to {} results", reranked.len());
        Ok(reranked)
    }
}

/// Publication timestamp from chunk metadata, defaulting to a fixed
/// sentinel date when absent or unparseable.
fn published_from_metadata(chunk: &DocumentChunk) -> DateTime<Utc> {
    chunk
        .metadata_str("published")
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc))
        .unwrap_or_else(sentinel_date)
}

fn sentinel_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn metadata_set(chunk: &DocumentChunk, key: &str) -> HashSet<String> {
    chunk
        .metadata_strs(key)
        .map(|values| values.into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vigil_core::SourceType;
    use vigil_ranking::RankerTrainer;

    fn trained_reranker() -> ModelReranker {
        let model = RankerTrainer::new()
            .with_n_estimators(30)
            .train_from_synthetic(40, 10, 42)
            .unwrap();
        ModelReranker::new(RankerPredictor::from_model(model))
    }

    fn chunk(id: &str, embedding: Option<Vec<f32>>, published: &str) -> DocumentChunk {
        let mut metadata = serde_json::Map::new();
        metadata.insert("published".to_string(), published.into());
        metadata.insert(
            "protocols".to_string(),
            serde_json::json!(["modbus", "dnp3"]),
        );
        DocumentChunk {
            id: id.to_string(),
            source_id: format!("SRC-{id}"),
            source_type: SourceType::Advisory,
            content: format!("content {id}"),
            metadata,
            embedding,
        }
    }

    #[test]
    fn test_empty_candidates_never_calls_model() {
        // An unloaded predictor would fail on any scoring call; an empty
        // candidate list must succeed anyway.
        let reranker = ModelReranker::new(RankerPredictor::new());
        let results = reranker.rerank(&[1.0, 0.0], Vec::new(), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rerank_orders_by_model_score() {
        let reranker = trained_reranker();
        let query: Vec<f32> = vec![0.8, 0.3, 0.6, 0.1, 0.9, 0.2, 0.4, 0.7];
        let recent = Utc::now().to_rfc3339();

        let candidates = vec![
            (chunk("stale-far", Some(vec![0.05; 8]), "2019-03-01T00:00:00+00:00"), 0.9),
            (chunk("fresh-near", Some(query.clone()), recent.as_str()), 0.1),
        ];

        let results = reranker.rerank(&query, candidates, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.id, "fresh-near");
        assert!(results[0].1 >= results[1].1);
    }

    #[test]
    fn test_rerank_truncates_to_top_k() {
        let reranker = trained_reranker();
        let query = vec![0.5f32; 8];
        let candidates: Vec<(DocumentChunk, f32)> = (0..5)
            .map(|i| {
                (
                    chunk(&format!("c{i}"), Some(vec![0.1 * i as f32; 8]), "2024-05-01T00:00:00+00:00"),
                    0.5,
                )
            })
            .collect();

        let results = reranker.rerank(&query, candidates, 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_missing_embedding_and_date_use_defaults() {
        let reranker = trained_reranker();
        let mut bare = chunk("bare", None, "");
        bare.metadata.clear();

        // Must not fail: embedding defaults to a zero vector and the
        // date to the sentinel.
        let results = reranker
            .rerank(&[0.5; 8], vec![(bare, 0.4)], 1)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, "bare");
    }

    #[test]
    fn test_sentinel_date() {
        assert_eq!(sentinel_date().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
