//! Random Forest classifier

use super::decision_tree::DecisionTree;
use crate::error::{Result, ScoringError};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Random Forest model: bootstrapped Gini trees with sqrt feature sampling
#[derive(Debug, Clone)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Random state
    pub random_state: Option<u64>,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Number of classes
    n_classes: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            random_state: None,
            feature_importances: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Features sampled per split: `floor(sqrt(n_features))`, at least one
    fn compute_max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).max(1)
    }

    /// Fit the forest to class codes `0..n_classes`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, n_classes: usize) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ScoringError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ScoringError::ValidationError(
                "cannot fit a forest on zero samples".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }

        self.n_features = n_features;
        self.n_classes = n_classes;
        let max_features = Self::compute_max_features(n_features);
        let base_seed = self.random_state.unwrap_or(42);

        // Each tree derives its own seed, so the result does not depend on
        // how rayon schedules the work.
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot = y.select(Axis(0), &sample_indices);

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot, n_classes)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        tracing::debug!(
            n_trees = self.trees.len(),
            n_features,
            max_features,
            "random forest fitted"
        );

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total_importances[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        // Normalize
        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Majority vote across trees; ties go to the smaller class code
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScoringError::ModelNotFitted);
        }

        let votes = self.vote_counts(x)?;
        Ok(votes
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &count) in row.iter().enumerate() {
                    if count > row[best] {
                        best = class;
                    }
                }
                best as f64
            })
            .collect())
    }

    /// Fraction of trees voting for each class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(ScoringError::ModelNotFitted);
        }
        let votes = self.vote_counts(x)?;
        Ok(votes / self.trees.len() as f64)
    }

    fn vote_counts(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let mut votes = Array2::zeros((x.nrows(), self.n_classes));
        for preds in &all_predictions {
            for (i, &class) in preds.iter().enumerate() {
                votes[[i, class as usize]] += 1.0;
            }
        }
        Ok(votes)
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_clusters() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = two_clusters();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();

        let predictions = rf.predict(&x).unwrap();

        let accuracy = predictions.iter().zip(y.iter())
            .filter(|(p, a)| p == a)
            .count() as f64 / y.len() as f64;

        assert!(accuracy >= 0.8, "Accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = two_clusters();
        let queries = array![[0.5, 0.5], [0.6, 0.4], [0.05, 1.1]];

        let mut a = RandomForest::new(25).with_random_state(7);
        let mut b = RandomForest::new(25).with_random_state(7);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();

        assert_eq!(a.predict(&queries).unwrap(), b.predict(&queries).unwrap());
        assert_eq!(a.predict_proba(&queries).unwrap(), b.predict_proba(&queries).unwrap());
    }

    #[test]
    fn test_predict_proba() {
        let (x, y) = two_clusters();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();

        let proba = rf.predict_proba(&x).unwrap();

        assert_eq!(proba.nrows(), 6);
        assert_eq!(proba.ncols(), 2);

        for i in 0..proba.nrows() {
            let row_sum: f64 = proba.row(i).sum();
            assert!((row_sum - 1.0).abs() < 1e-6, "Row {} sum: {}", i, row_sum);
        }
    }

    #[test]
    fn test_feature_importances() {
        let x = array![
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            [4.0, 0.0],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0] >= importances[1]);
    }

    #[test]
    fn test_predict_unfitted() {
        let rf = RandomForest::new(10);
        assert!(matches!(rf.predict(&array![[1.0, 2.0]]), Err(ScoringError::ModelNotFitted)));
    }

    #[test]
    fn test_compute_max_features() {
        assert_eq!(RandomForest::compute_max_features(9), 3);
        assert_eq!(RandomForest::compute_max_features(3), 1);
        assert_eq!(RandomForest::compute_max_features(1), 1);
    }
}
