//! LambdaRank gradient-boosting trainer.
//!
//! Each boosting round computes pairwise lambda gradients within every
//! query group — misordered pairs weighted by the NDCG change their swap
//! would produce — and fits a regression tree to them with Newton-step
//! leaf values. The ensemble optimizes NDCG without ever materializing
//! it as a loss.

use tracing::{debug, info};

use crate::data::TrainingDataGenerator;
use crate::error::{RankingError, Result};
use crate::features::{FeatureVector, NUM_FEATURES};
use crate::metrics::{dcg_at_k, discount, gain};
use crate::model::{RankerModel, RegressionTree, TreeNode};

/// Sharpness of the pairwise logistic; LambdaRank's sigma.
const SIGMA: f64 = 1.0;

/// Minimum split gain worth keeping.
const MIN_GAIN: f64 = 1e-12;

/// Train a gradient-boosted ranker for document reranking.
#[derive(Debug, Clone)]
pub struct RankerTrainer {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    min_samples_leaf: usize,
    lambda_l2: f64,
}

impl Default for RankerTrainer {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 4,
            min_samples_leaf: 5,
            lambda_l2: 1.0,
        }
    }
}

impl RankerTrainer {
    /// Create a trainer with default hyper-parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of boosting rounds.
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the maximum tree depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum samples per leaf.
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Train a ranking model.
    ///
    /// `groups` gives the candidate count of each query; its sum must
    /// equal the number of feature rows and labels.
    pub fn train(
        &self,
        features: &[FeatureVector],
        labels: &[u8],
        groups: &[usize],
    ) -> Result<RankerModel> {
        if features.len() != labels.len() {
            return Err(RankingError::InvalidTrainingData(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if groups.iter().sum::<usize>() != labels.len() {
            return Err(RankingError::InvalidTrainingData(format!(
                "group sizes sum to {} but {} labels supplied",
                groups.iter().sum::<usize>(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(RankingError::InvalidTrainingData(
                "empty training set".to_string(),
            ));
        }

        let mut scores = vec![0.0f64; labels.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        for round in 0..self.n_estimators {
            let (gradients, hessians) = compute_lambdas(&scores, labels, groups);

            let tree = self.fit_tree(features, &gradients, &hessians);
            for (score, row) in scores.iter_mut().zip(features) {
                *score += self.learning_rate * tree.predict(row);
            }
            trees.push(tree);

            if round % 20 == 0 {
                debug!("Boosting round {round}");
            }
        }

        info!(
            "Trained ranking model: {} trees over {} samples in {} groups",
            trees.len(),
            labels.len(),
            groups.len()
        );
        Ok(RankerModel::new(self.learning_rate, trees))
    }

    /// Train on freshly generated synthetic data.
    pub fn train_from_synthetic(
        &self,
        n_queries: usize,
        docs_per_query: usize,
        seed: u64,
    ) -> Result<RankerModel> {
        let set = TrainingDataGenerator::new(seed).generate(n_queries, docs_per_query, 8);
        self.train(&set.features, &set.labels, &set.groups)
    }

    fn fit_tree(
        &self,
        features: &[FeatureVector],
        gradients: &[f64],
        hessians: &[f64],
    ) -> RegressionTree {
        let mut builder = TreeBuilder {
            features,
            gradients,
            hessians,
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            lambda_l2: self.lambda_l2,
            nodes: Vec::new(),
        };
        let indices: Vec<usize> = (0..features.len()).collect();
        builder.build_node(indices, 0);
        RegressionTree {
            nodes: builder.nodes,
        }
    }
}

/// Pairwise LambdaRank gradients and hessians for the current scores.
fn compute_lambdas(scores: &[f64], labels: &[u8], groups: &[usize]) -> (Vec<f64>, Vec<f64>) {
    let mut gradients = vec![0.0f64; labels.len()];
    let mut hessians = vec![0.0f64; labels.len()];

    let mut start = 0;
    for &size in groups {
        let end = start + size;
        let group: Vec<usize> = (start..end).collect();

        let mut ideal: Vec<u8> = labels[start..end].to_vec();
        ideal.sort_unstable_by(|a, b| b.cmp(a));
        let idcg = dcg_at_k(&ideal, size);
        if idcg > 0.0 {
            // Current rank position of each member, by score descending.
            let mut order = group.clone();
            order.sort_by(|&a, &b| {
                scores[b]
                    .partial_cmp(&scores[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut position = vec![0usize; size];
            for (rank, &index) in order.iter().enumerate() {
                position[index - start] = rank;
            }

            for &i in &group {
                for &j in &group {
                    if labels[i] <= labels[j] {
                        continue;
                    }
                    // i should rank above j.
                    let rho = 1.0 / (1.0 + (SIGMA * (scores[i] - scores[j])).exp());
                    let delta_ndcg = ((gain(labels[i]) - gain(labels[j]))
                        * (discount(position[i - start]) - discount(position[j - start])))
                    .abs()
                        / idcg;

                    let lambda = rho * delta_ndcg;
                    gradients[i] += lambda;
                    gradients[j] -= lambda;

                    let weight = SIGMA * rho * (1.0 - rho) * delta_ndcg;
                    hessians[i] += weight;
                    hessians[j] += weight;
                }
            }
        }
        start = end;
    }

    (gradients, hessians)
}

struct TreeBuilder<'a> {
    features: &'a [FeatureVector],
    gradients: &'a [f64],
    hessians: &'a [f64],
    max_depth: usize,
    min_samples_leaf: usize,
    lambda_l2: f64,
    nodes: Vec<TreeNode>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    /// Build the subtree over `indices`; returns the arena id of its
    /// root. The first call allocates node 0.
    fn build_node(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: 0.0 });

        let split = if depth < self.max_depth && indices.len() >= 2 * self.min_samples_leaf {
            self.best_split(&indices)
        } else {
            None
        };

        match split {
            Some(split) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .into_iter()
                    .partition(|&i| self.features[i][split.feature] <= split.threshold);
                let left = self.build_node(left_indices, depth + 1);
                let right = self.build_node(right_indices, depth + 1);
                self.nodes[id] = TreeNode::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    gain: split.gain,
                    left,
                    right,
                };
            }
            None => {
                self.nodes[id] = TreeNode::Leaf {
                    value: self.leaf_value(&indices),
                };
            }
        }
        id
    }

    /// Newton-step leaf value: ΣG / (ΣH + λ).
    fn leaf_value(&self, indices: &[usize]) -> f64 {
        let grad: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let hess: f64 = indices.iter().map(|&i| self.hessians[i]).sum();
        grad / (hess + self.lambda_l2)
    }

    /// Exact greedy split search over all features.
    fn best_split(&self, indices: &[usize]) -> Option<Split> {
        let total_grad: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let total_hess: f64 = indices.iter().map(|&i| self.hessians[i]).sum();
        let parent_objective = total_grad * total_grad / (total_hess + self.lambda_l2);

        let mut best: Option<Split> = None;

        for feature in 0..NUM_FEATURES {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| {
                self.features[a][feature]
                    .partial_cmp(&self.features[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_grad = 0.0;
            let mut left_hess = 0.0;
            for (count, window) in sorted.windows(2).enumerate() {
                let index = window[0];
                left_grad += self.gradients[index];
                left_hess += self.hessians[index];

                let left_count = count + 1;
                let right_count = sorted.len() - left_count;
                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let value = self.features[index][feature];
                let next_value = self.features[window[1]][feature];
                if value == next_value {
                    continue;
                }

                let right_grad = total_grad - left_grad;
                let right_hess = total_hess - left_hess;
                let gain = left_grad * left_grad / (left_hess + self.lambda_l2)
                    + right_grad * right_grad / (right_hess + self.lambda_l2)
                    - parent_objective;

                if gain > MIN_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(Split {
                        feature,
                        threshold: (value + next_value) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ndcg_at_k;
    use pretty_assertions::assert_eq;

    fn mean_group_ndcg(scores: &[f64], labels: &[u8], groups: &[usize], k: usize) -> f64 {
        let mut total = 0.0;
        let mut start = 0;
        for &size in groups {
            let end = start + size;
            total += ndcg_at_k(&scores[start..end], &labels[start..end], k);
            start = end;
        }
        total / groups.len() as f64
    }

    #[test]
    fn test_train_validates_shapes() {
        let trainer = RankerTrainer::new().with_n_estimators(1);
        let features = vec![[0.0; NUM_FEATURES]; 4];

        let err = trainer.train(&features, &[1, 0], &[4]).unwrap_err();
        assert!(matches!(err, RankingError::InvalidTrainingData(_)));

        let err = trainer.train(&features, &[1, 0, 2, 3], &[3]).unwrap_err();
        assert!(matches!(err, RankingError::InvalidTrainingData(_)));

        let err = trainer.train(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, RankingError::InvalidTrainingData(_)));
    }

    #[test]
    fn test_train_produces_ensemble() {
        let trainer = RankerTrainer::new().with_n_estimators(5);
        let model = trainer.train_from_synthetic(10, 10, 42).unwrap();
        assert_eq!(model.num_trees(), 5);
    }

    #[test]
    fn test_model_learns_ranking() {
        let trainer = RankerTrainer::new().with_n_estimators(50);
        let model = trainer.train_from_synthetic(60, 10, 42).unwrap();

        // Held-out groups from a different seed.
        let eval = TrainingDataGenerator::new(43).generate(30, 10, 8);
        let scores = model.predict(&eval.features);

        let model_ndcg = mean_group_ndcg(&scores, &eval.labels, &eval.groups, 5);
        let baseline = vec![0.0; eval.labels.len()];
        let baseline_ndcg = mean_group_ndcg(&baseline, &eval.labels, &eval.groups, 5);

        assert!(
            model_ndcg > baseline_ndcg,
            "trained NDCG {model_ndcg} should beat unranked baseline {baseline_ndcg}"
        );
        assert!(
            model_ndcg > 0.85,
            "trained NDCG {model_ndcg} unexpectedly low"
        );
    }

    #[test]
    fn test_trained_model_separates_tiers() {
        let trainer = RankerTrainer::new().with_n_estimators(30);
        let model = trainer.train_from_synthetic(40, 10, 7).unwrap();

        // A clearly strong candidate vs. a clearly weak one.
        let strong = [0.98, 0.9, 0.6, 0.8, 0.7, 0.5];
        let weak = [0.1, 0.05, 0.0, 0.0, 0.02, 0.0];
        assert!(model.predict_one(&strong) > model.predict_one(&weak));
    }

    #[test]
    fn test_feature_importance_accumulates() {
        let trainer = RankerTrainer::new().with_n_estimators(10);
        let model = trainer.train_from_synthetic(20, 10, 42).unwrap();
        let importance = model.feature_importance();
        assert_eq!(importance.len(), NUM_FEATURES);
        let total: f64 = importance.values().sum();
        assert!(total > 0.0);
    }

    #[tokio::test]
    async fn test_saved_model_predicts_identically() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ranker.json");

        let trainer = RankerTrainer::new().with_n_estimators(10);
        let model = trainer.train_from_synthetic(10, 10, 42).unwrap();
        model.save(&path).await.unwrap();
        let loaded = RankerModel::load(&path).await.unwrap();

        let eval = TrainingDataGenerator::new(1).generate(5, 5, 8);
        assert_eq!(model.predict(&eval.features), loaded.predict(&eval.features));
    }

    #[test]
    fn test_lambda_direction() {
        // Two items, the relevant one currently scored below the
        // irrelevant one: its gradient must push it up.
        let scores = vec![0.0, 1.0];
        let labels = vec![4, 0];
        let (gradients, hessians) = compute_lambdas(&scores, &labels, &[2]);
        assert!(gradients[0] > 0.0);
        assert!(gradients[1] < 0.0);
        assert!(hessians[0] > 0.0);
    }
}
