//! Trained model variants

use super::knn::KNNClassifier;
use super::random_forest::RandomForest;
use crate::error::{Result, ScoringError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The classifier families the pipeline trains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    KNearestNeighbors,
}

impl ModelKind {
    /// Every kind, in training and evaluation order
    pub const ALL: [ModelKind; 2] = [ModelKind::RandomForest, ModelKind::KNearestNeighbors];

    /// Human-readable name used in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "Random Forest",
            ModelKind::KNearestNeighbors => "K-Nearest Neighbors",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" | "forest" => Ok(ModelKind::RandomForest),
            "knn" | "k_nearest_neighbors" => Ok(ModelKind::KNearestNeighbors),
            _ => Err(ScoringError::InvalidParameter {
                name: "model".to_string(),
                value: s.to_string(),
                reason: "expected random_forest or knn".to_string(),
            }),
        }
    }
}

/// A fitted classifier
#[derive(Debug, Clone)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    KNearestNeighbors(KNNClassifier),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::RandomForest(_) => ModelKind::RandomForest,
            TrainedModel::KNearestNeighbors(_) => ModelKind::KNearestNeighbors,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Predicted class code per row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::KNearestNeighbors(m) => m.predict(x),
        }
    }

    /// Per-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.predict_proba(x),
            TrainedModel::KNearestNeighbors(m) => m.predict_proba(x),
        }
    }

    /// Impurity-based importances, for models that have them
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.feature_importances(),
            TrainedModel::KNearestNeighbors(_) => None,
        }
    }
}
