//! Seeded train/test splitting

use super::features::FeatureMatrix;
use crate::error::{Result, ScoringError};
use ndarray::{Array1, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Rows held out for a `test_size` fraction of `n_samples`.
///
/// Rounds up, so any positive fraction of a non-empty table yields at
/// least one test row.
pub fn n_test_samples(n_samples: usize, test_size: f64) -> usize {
    (test_size * n_samples as f64).ceil() as usize
}

/// Shuffle `0..n_samples` with `seed` and cut it into (train, test) indices.
///
/// Test indices are the first `n_test_samples` entries of the permutation.
pub fn split_indices(n_samples: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ScoringError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let n_test = n_test_samples(n_samples, test_size);
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(ScoringError::ValidationError(format!(
            "cannot split {} samples with test_size {}: train={}, test={}",
            n_samples, test_size, n_train, n_test
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Features and labels for both partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Split features and labels with a shared seeded permutation
pub fn train_test_split(
    x: &FeatureMatrix,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if x.n_rows() != y.len() {
        return Err(ScoringError::ShapeError {
            expected: format!("y length = {}", x.n_rows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    let (train_idx, test_idx) = split_indices(x.n_rows(), test_size, seed)?;
    tracing::debug!(train = train_idx.len(), test = test_idx.len(), seed, "train/test split");

    Ok(TrainTestSplit {
        x_train: x.select_rows(&train_idx),
        x_test: x.select_rows(&test_idx),
        y_train: y.select(Axis(0), &train_idx),
        y_test: y.select(Axis(0), &test_idx),
    })
}
