//! Fits every candidate classifier on the same training data

use super::knn::{KNNClassifier, KNNConfig};
use super::models::{ModelKind, TrainedModel};
use super::random_forest::RandomForest;
use crate::config::PipelineConfig;
use crate::error::{Result, ScoringError};
use crate::preprocessing::FeatureMatrix;
use ndarray::Array1;
use std::time::Instant;

/// The fitted candidates, in training order
#[derive(Debug, Clone)]
pub struct TrainedModels {
    models: Vec<TrainedModel>,
    feature_names: Vec<String>,
    n_classes: usize,
}

impl TrainedModels {
    pub fn get(&self, kind: ModelKind) -> Option<&TrainedModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainedModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Feature columns the models were fit on, in matrix order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn n_classes_of(y: &Array1<f64>) -> Result<usize> {
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() || max < 0.0 {
        return Err(ScoringError::ValidationError(
            "training labels must be non-negative class codes".to_string(),
        ));
    }
    Ok(max as usize + 1)
}

/// Fit a random forest and a k-NN classifier on identical inputs
pub fn train_models(x: &FeatureMatrix, y: &Array1<f64>, config: &PipelineConfig) -> Result<TrainedModels> {
    if x.n_rows() != y.len() {
        return Err(ScoringError::ShapeError {
            expected: format!("y length = {}", x.n_rows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    let n_classes = n_classes_of(y)?;

    let start = Instant::now();
    let mut forest = RandomForest::new(config.forest.n_estimators)
        .with_min_samples_split(config.forest.min_samples_split)
        .with_random_state(config.random_seed);
    if let Some(depth) = config.forest.max_depth {
        forest = forest.with_max_depth(depth);
    }
    forest.fit(x.values(), y, n_classes)?;
    tracing::info!(
        model = ModelKind::RandomForest.display_name(),
        trees = forest.n_trees(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "model trained"
    );

    let start = Instant::now();
    let mut knn = KNNClassifier::new(KNNConfig {
        n_neighbors: config.n_neighbors,
    });
    knn.fit(x.values(), y, n_classes)?;
    tracing::info!(
        model = ModelKind::KNearestNeighbors.display_name(),
        k = config.n_neighbors,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "model trained"
    );

    Ok(TrainedModels {
        models: vec![TrainedModel::RandomForest(forest), TrainedModel::KNearestNeighbors(knn)],
        feature_names: x.names().to_vec(),
        n_classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn data() -> (FeatureMatrix, Array1<f64>) {
        let values = Array2::from_shape_fn((12, 2), |(r, c)| (r * 2 + c) as f64);
        let x = FeatureMatrix::new(vec!["idade".into(), "renda".into()], values).unwrap();
        let y = Array1::from_iter((0..12).map(|i| (i / 4) as f64));
        (x, y)
    }

    #[test]
    fn test_trains_both_models() {
        let (x, y) = data();
        let config = PipelineConfig::default().with_n_estimators(10);
        let models = train_models(&x, &y, &config).unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models.n_classes(), 3);
        assert_eq!(models.feature_names(), &["idade", "renda"]);
        assert!(models.get(ModelKind::RandomForest).is_some());
        assert!(models.get(ModelKind::KNearestNeighbors).is_some());

        let kinds: Vec<ModelKind> = models.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, ModelKind::ALL.to_vec());
    }

    #[test]
    fn test_too_few_rows_for_k() {
        let x = FeatureMatrix::new(vec!["a".into()], array![[0.0], [1.0], [2.0]]).unwrap();
        let y = array![0.0, 1.0, 0.0];
        let config = PipelineConfig::default().with_n_estimators(5);
        assert!(train_models(&x, &y, &config).is_err());
    }

    #[test]
    fn test_label_length_mismatch() {
        let (x, _) = data();
        let y = Array1::zeros(3);
        let result = train_models(&x, &y, &PipelineConfig::default());
        assert!(matches!(result, Err(ScoringError::ShapeError { .. })));
    }
}
