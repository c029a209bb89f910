//! K-Nearest Neighbors classifier
//!
//! Stores the training set and classifies each query row by a vote among
//! its `k` closest training rows.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Result, ScoringError};

/// KNN configuration: uniform votes over Euclidean distance
#[derive(Debug, Clone)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self { n_neighbors: 5 }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    x: Array2<f64>,
    y: Vec<usize>,
    n_classes: usize,
}

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone)]
pub struct KNNClassifier {
    config: KNNConfig,
    fitted: Option<Fitted>,
}

impl KNNClassifier {
    pub fn new(config: KNNConfig) -> Self {
        Self { config, fitted: None }
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig { n_neighbors: k })
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }

    /// Store the training rows and their class codes `0..n_classes`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, n_classes: usize) -> Result<&mut Self> {
        let k = self.config.n_neighbors;
        if k == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "at least one neighbor is required".to_string(),
            });
        }
        if x.nrows() != y.len() {
            return Err(ScoringError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() < k {
            return Err(ScoringError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: k.to_string(),
                reason: format!("only {} training rows available", x.nrows()),
            });
        }

        let labels = y
            .iter()
            .map(|&v| {
                let code = v as usize;
                if v < 0.0 || v.fract() != 0.0 || code >= n_classes {
                    Err(ScoringError::ValidationError(format!(
                        "label {} is not a class code below {}",
                        v, n_classes
                    )))
                } else {
                    Ok(code)
                }
            })
            .collect::<Result<Vec<usize>>>()?;

        self.fitted = Some(Fitted {
            x: x.clone(),
            y: labels,
            n_classes,
        });
        tracing::debug!(n_train = x.nrows(), k, "knn fitted");
        Ok(self)
    }

    /// Predict class codes (parallelized over query rows)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let probs = self.vote_weights(x)?;
        Ok(probs
            .into_iter()
            .map(|weights| argmax_first(&weights) as f64)
            .collect())
    }

    /// Share of neighbor weight per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or(ScoringError::ModelNotFitted)?;
        let rows = self.vote_weights(x)?;

        let mut out = Array2::zeros((x.nrows(), fitted.n_classes));
        for (i, weights) in rows.iter().enumerate() {
            let total: f64 = weights.iter().sum();
            for (c, w) in weights.iter().enumerate() {
                out[[i, c]] = if total > 0.0 { w / total } else { 0.0 };
            }
        }
        Ok(out)
    }

    fn vote_weights(&self, x: &Array2<f64>) -> Result<Vec<Vec<f64>>> {
        let fitted = self.fitted.as_ref().ok_or(ScoringError::ModelNotFitted)?;
        if x.ncols() != fitted.x.ncols() {
            return Err(ScoringError::ShapeError {
                expected: format!("{} features", fitted.x.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.config.n_neighbors;

        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let mut votes = vec![0.0; fitted.n_classes];
                for n in find_k_nearest(x.row(i), &fitted.x, k) {
                    votes[fitted.y[n.index]] += 1.0;
                }
                votes
            })
            .collect())
    }
}

/// Index of the largest value; the first one wins ties
fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Heap entry ordered by distance, then by training row
struct Neighbor {
    dist: f64,
    index: usize,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Neighbor {}
impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.index.cmp(&other.index))
    }
}

/// k nearest training rows through a bounded max-heap, O(n log k).
///
/// Equidistant rows are taken in training order.
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    k: usize,
) -> Vec<Neighbor> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (index, row) in x_train.rows().into_iter().enumerate() {
        let candidate = Neighbor {
            dist: euclidean(point, row),
            index,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(top) = heap.peek() {
            if candidate < *top {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_sorted_vec()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
