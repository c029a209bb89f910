//! Decision tree classifier

use crate::error::{Result, ScoringError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Decision tree node
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Leaf node with the predicted class
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Gini-impurity decision tree over integer class codes `0..n_classes`
#[derive(Debug, Clone)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Features sampled at each split (all when `None`)
    pub max_features: Option<usize>,
    /// Seed for per-split feature sampling
    pub random_state: u64,
    /// Number of features
    n_features: usize,
    /// Number of classes
    n_classes: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            random_state: 0,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
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

    /// Set the number of features sampled per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set the feature sampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree. `y` holds class codes; `n_classes` bounds them.
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
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        let labels: Vec<usize> = y
            .iter()
            .map(|&v| {
                if v >= 0.0 && (v as usize) < n_classes && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(ScoringError::ValidationError(format!(
                        "label {} is not a class code below {}",
                        v, n_classes
                    )))
                }
            })
            .collect::<Result<_>>()?;

        self.n_features = n_features;
        self.n_classes = n_classes;

        let mut importances = vec![0.0; n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, &labels, &indices, 0, &mut importances, &mut rng));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(y, indices);
        let impurity = self.impurity(&counts, n_samples);

        let should_stop = n_samples < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d)
            || impurity <= 0.0;

        if should_stop {
            return self.leaf(&counts, n_samples);
        }

        let Some((feature_idx, threshold, gain)) = self.find_best_split(x, y, indices, impurity, rng) else {
            return self.leaf(&counts, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return self.leaf(&counts, n_samples);
        }

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Features considered at one split, ascending
    fn candidate_features(&self, n_features: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < n_features => {
                let mut picked = rand::seq::index::sample(rng, n_features, k.max(1)).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..n_features).collect(),
        }
    }

    /// Best (feature, threshold, gain) by sweeping each candidate feature in sorted order
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in self.candidate_features(x.ncols(), rng) {
            let mut pairs: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (x[[i, feature_idx]], y[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = vec![0usize; self.n_classes];
            for &(_, class) in &pairs {
                right_counts[class] += 1;
            }

            for split in 1..n {
                let (value, class) = pairs[split - 1];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next_value = pairs[split].0;
                if next_value <= value {
                    continue;
                }

                let weighted = (split as f64 * self.impurity(&left_counts, split)
                    + (n - split) as f64 * self.impurity(&right_counts, n - split))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature_idx, split_threshold(value, next_value), gain));
                }
            }
        }

        best
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn impurity(&self, counts: &[usize], n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        1.0 - counts
            .iter()
            .map(|&c| (c as f64 / n).powi(2))
            .sum::<f64>()
    }

    /// Majority class; ties go to the smaller code
    fn leaf(&self, counts: &[usize], n_samples: usize) -> TreeNode {
        let mut best_class = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best_class] {
                best_class = class;
            }
        }
        TreeNode::Leaf {
            value: best_class as f64,
            n_samples,
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(ScoringError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(ScoringError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::predict_sample(root, row))
            .collect())
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }
}

/// Midpoint that stays strictly below `next`; falls back to `value` on overflow or rounding
fn split_threshold(value: f64, next: f64) -> f64 {
    let t = value / 2.0 + next / 2.0;
    if t < next && t.is_finite() {
        t
    } else {
        value
    }
}
