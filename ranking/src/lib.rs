//! # Vigil Ranking
//!
//! Learning-to-rank for retrieval candidates:
//!
//! - **Features**: six bounded numeric features per query–candidate pair
//! - **Data**: seeded synthetic training groups with a learnable
//!   feature→relevance relationship
//! - **Trainer**: gradient-boosted regression trees with a LambdaRank
//!   objective optimizing NDCG within query groups
//! - **Predictor**: scores feature matrices with a persisted model
//!
//! Feature order is positional and fixed by [`features::FEATURE_NAMES`];
//! the trained model is only valid against that order.

pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod trainer;

pub use data::{TrainingDataGenerator, TrainingSet};
pub use error::{RankingError, Result};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use metrics::ndcg_at_k;
pub use model::RankerModel;
pub use predictor::{CandidateRecord, RankerPredictor};
pub use trainer::RankerTrainer;
