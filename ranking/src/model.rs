//! The persisted ranking model: a gradient-boosted ensemble of
//! regression trees.
//!
//! The model is an opaque serialized artifact — inference needs only
//! this module, never the training code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::features::{FeatureVector, FEATURE_NAMES};

/// A node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal split: `feature <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        gain: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding a score increment.
    Leaf { value: f64 },
}

/// A single regression tree stored as a flat node arena; node 0 is the
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub(crate) nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Evaluate the tree for one feature vector.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A trained LambdaRank gradient-boosting model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerModel {
    /// Feature names in the positional order the model was trained on.
    pub feature_names: Vec<String>,

    /// Shrinkage applied to each tree's contribution.
    pub learning_rate: f64,

    pub(crate) trees: Vec<RegressionTree>,
}

impl RankerModel {
    pub(crate) fn new(learning_rate: f64, trees: Vec<RegressionTree>) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|n| (*n).to_string()).collect(),
            learning_rate,
            trees,
        }
    }

    /// Number of trees in the ensemble.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Score one feature vector.
    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        self.trees
            .iter()
            .map(|tree| self.learning_rate * tree.predict(features))
            .sum()
    }

    /// Score a feature matrix.
    pub fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
        features.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Total split gain accumulated per feature across the ensemble.
    pub fn feature_importance(&self) -> BTreeMap<String, f64> {
        let mut importance: BTreeMap<String, f64> = self
            .feature_names
            .iter()
            .map(|name| (name.clone(), 0.0))
            .collect();
        for tree in &self.trees {
            for node in &tree.nodes {
                if let TreeNode::Split { feature, gain, .. } = node {
                    if let Some(name) = self.feature_names.get(*feature) {
                        if let Some(total) = importance.get_mut(name) {
                            *total += gain;
                        }
                    }
                }
            }
        }
        importance
    }

    /// Persist the model to `path` as a JSON artifact.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec(self)?;
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, path).await?;
        info!("Saved ranking model with {} trees to {}", self.trees.len(), path.display());
        Ok(())
    }

    /// Load a model artifact from `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path).await?;
        let model: Self = serde_json::from_slice(&content)?;
        info!("Loaded ranking model with {} trees from {}", model.trees.len(), path.display());
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    gain: 1.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_tree_predict() {
        let tree = stump(0, 0.5, -1.0, 1.0);
        assert_eq!(tree.predict(&[0.2, 0.0, 0.0, 0.0, 0.0, 0.0]), -1.0);
        assert_eq!(tree.predict(&[0.9, 0.0, 0.0, 0.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_model_sums_scaled_trees() {
        let model = RankerModel::new(0.5, vec![stump(0, 0.5, 0.0, 2.0), stump(1, 0.5, 0.0, 4.0)]);
        let score = model.predict_one(&[0.9, 0.9, 0.0, 0.0, 0.0, 0.0]);
        assert!((score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_feature_importance_totals_gain() {
        let model = RankerModel::new(0.1, vec![stump(0, 0.5, 0.0, 1.0), stump(0, 0.3, 0.0, 1.0)]);
        let importance = model.feature_importance();
        assert_eq!(importance["embedding_similarity"], 2.0);
        assert_eq!(importance["temporal_decay"], 0.0);
        assert_eq!(importance.len(), FEATURE_NAMES.len());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models/ranker.json");
        let model = RankerModel::new(0.1, vec![stump(2, 0.4, -0.5, 0.5)]);
        model.save(&path).await.unwrap();

        let loaded = RankerModel::load(&path).await.unwrap();
        assert_eq!(loaded.num_trees(), 1);
        let features = [0.0, 0.0, 0.9, 0.0, 0.0, 0.0];
        assert_eq!(loaded.predict_one(&features), model.predict_one(&features));
    }

    #[tokio::test]
    async fn test_load_missing_artifact_is_io_error() {
        let err = RankerModel::load(Path::new("/nonexistent/ranker.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::RankingError::Io(_)));
    }
}
