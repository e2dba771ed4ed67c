//! Model inference for document ranking.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use crate::error::{RankingError, Result};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::model::RankerModel;

/// A candidate document for out-of-band ranking, independent of the
/// retrieval path.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub embedding: Vec<f32>,
    pub published: DateTime<Utc>,
    pub protocols: HashSet<String>,
    pub asset_types: HashSet<String>,
    pub interaction_count: i64,
}

/// Score and rank candidate documents using a trained model.
#[derive(Debug, Clone, Default)]
pub struct RankerPredictor {
    model: Option<RankerModel>,
}

impl RankerPredictor {
    /// Create a predictor without a model; scoring fails until one is
    /// supplied.
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Create a predictor over an already-loaded model.
    pub fn from_model(model: RankerModel) -> Self {
        Self { model: Some(model) }
    }

    /// Load a predictor from a saved model artifact.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let model = RankerModel::load(path).await?;
        Ok(Self::from_model(model))
    }

    /// Whether a model is loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Predict relevance scores for a feature matrix.
    ///
    /// Pure: identical inputs produce identical scores. Fails with
    /// [`RankingError::ModelNotLoaded`] when no model is available.
    pub fn predict_scores(&self, features: &[FeatureVector]) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or(RankingError::ModelNotLoaded)?;
        Ok(model.predict(features))
    }

    /// Rank candidate documents by predicted relevance.
    ///
    /// Query-side protocol and asset-type sets are intentionally empty
    /// here; the model is trained against the same distribution.
    pub fn rank_candidates(
        &self,
        query_embedding: &[f32],
        candidates: Vec<CandidateRecord>,
        top_k: usize,
    ) -> Result<Vec<(CandidateRecord, f64)>> {
        if self.model.is_none() {
            return Err(RankingError::ModelNotLoaded);
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_protocols = HashSet::new();
        let query_assets = HashSet::new();

        let features: Vec<FeatureVector> = candidates
            .iter()
            .map(|candidate| {
                FeatureExtractor::extract(
                    query_embedding,
                    &candidate.embedding,
                    candidate.published,
                    &query_protocols,
                    &candidate.protocols,
                    &query_assets,
                    &candidate.asset_types,
                    candidate.interaction_count,
                )
            })
            .collect();

        let scores = self.predict_scores(&features)?;

        let mut ranked: Vec<(CandidateRecord, f64)> =
            candidates.into_iter().zip(scores).collect();
        ranked.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
        ranked.truncate(top_k);
        Ok(ranked)
    }
}
