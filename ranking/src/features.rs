//! Feature engineering for the learning-to-rank model.
//!
//! Every feature function is total and bounded: degenerate inputs
//! (zero-norm vectors, empty sets) map to defined sentinel values rather
//! than errors. The assembled feature vector is positional — the model
//! is trained against [`FEATURE_NAMES`] order and any change invalidates
//! existing model artifacts.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// Number of features per query–candidate pair.
pub const NUM_FEATURES: usize = 6;

/// Feature names in positional order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "embedding_similarity",
    "temporal_decay",
    "protocol_match",
    "asset_type_match",
    "popularity_score",
    "recency_boost",
];

/// An ordered feature vector for one query–candidate pair.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Default half-life for temporal decay, in days.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 180.0;

/// Default window for the recency boost, in days.
pub const DEFAULT_BOOST_DAYS: f64 = 30.0;

/// Default interaction-count ceiling for the popularity score.
pub const DEFAULT_MAX_INTERACTIONS: i64 = 100;

/// Extract features for the learning-to-rank model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Cosine similarity between query and document embeddings.
    ///
    /// Returns 0.0 when either vector has zero norm, or when the
    /// dimensions disagree.
    pub fn embedding_similarity(query_embedding: &[f32], doc_embedding: &[f32]) -> f64 {
        if query_embedding.len() != doc_embedding.len() {
            return 0.0;
        }
        let mut dot = 0.0f64;
        let mut q_norm = 0.0f64;
        let mut d_norm = 0.0f64;
        for (q, d) in query_embedding.iter().zip(doc_embedding.iter()) {
            let (q, d) = (f64::from(*q), f64::from(*d));
            dot += q * d;
            q_norm += q * q;
            d_norm += d * d;
        }
        if q_norm == 0.0 || d_norm == 0.0 {
            return 0.0;
        }
        dot / (q_norm.sqrt() * d_norm.sqrt())
    }

    /// Exponential decay by document age.
    ///
    /// Returns a value in (0, 1]: 1.0 for brand-new (or future)
    /// documents, 0.5 at exactly one half-life, approaching 0 as age
    /// grows.
    pub fn temporal_decay(published: DateTime<Utc>, half_life_days: f64) -> f64 {
        let age_days = age_in_days(published);
        if age_days < 0.0 {
            return 1.0;
        }
        (-std::f64::consts::LN_2 * age_days / half_life_days).exp()
    }

    /// Jaccard similarity for metadata overlap (protocols, asset types).
    ///
    /// Returns 0.0 when either set is empty — including both-empty, by
    /// convention.
    pub fn metadata_match(query_values: &HashSet<String>, doc_values: &HashSet<String>) -> f64 {
        if query_values.is_empty() || doc_values.is_empty() {
            return 0.0;
        }
        let intersection = query_values.intersection(doc_values).count();
        let union = query_values.union(doc_values).count();
        intersection as f64 / union as f64
    }

    /// Interaction count normalized to [0, 1] with log scaling.
    pub fn popularity_score(interaction_count: i64, max_interactions: i64) -> f64 {
        if interaction_count <= 0 {
            return 0.0;
        }
        let score = (1.0 + interaction_count as f64).ln() / (1.0 + max_interactions as f64).ln();
        score.min(1.0)
    }

    /// Linear bonus for recently published content.
    ///
    /// 1.0 for future dates, ramping to 0.0 across the boost window.
    pub fn recency_boost(published: DateTime<Utc>, boost_days: f64) -> f64 {
        let age_days = age_in_days(published);
        if age_days < 0.0 {
            return 1.0;
        }
        if age_days > boost_days {
            return 0.0;
        }
        1.0 - (age_days / boost_days)
    }

    /// Extract all features for a query–document pair, in
    /// [`FEATURE_NAMES`] order.
    #[allow(clippy::too_many_arguments)]
    pub fn extract(
        query_embedding: &[f32],
        doc_embedding: &[f32],
        doc_published: DateTime<Utc>,
        query_protocols: &HashSet<String>,
        doc_protocols: &HashSet<String>,
        query_asset_types: &HashSet<String>,
        doc_asset_types: &HashSet<String>,
        interaction_count: i64,
    ) -> FeatureVector {
        [
            Self::embedding_similarity(query_embedding, doc_embedding),
            Self::temporal_decay(doc_published, DEFAULT_HALF_LIFE_DAYS),
            Self::metadata_match(query_protocols, doc_protocols),
            Self::metadata_match(query_asset_types, doc_asset_types),
            Self::popularity_score(interaction_count, DEFAULT_MAX_INTERACTIONS),
            Self::recency_boost(doc_published, DEFAULT_BOOST_DAYS),
        ]
    }
}

fn age_in_days(published: DateTime<Utc>) -> f64 {
    let age = Utc::now().signed_duration_since(published);
    age.num_milliseconds() as f64 / 86_400_000.0
}
