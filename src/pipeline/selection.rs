//! Choice of the production model

use crate::error::{Result, ScoringError};
use crate::training::{Evaluation, ModelKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which trained model scores new customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ModelSelection {
    /// Always use the named model
    Fixed { model: ModelKind },
    /// Highest hold-out accuracy; the earliest evaluated model wins ties
    BestAccuracy,
}

impl Default for ModelSelection {
    fn default() -> Self {
        ModelSelection::Fixed {
            model: ModelKind::RandomForest,
        }
    }
}

impl ModelSelection {
    pub fn select(&self, evaluation: &Evaluation) -> Result<ModelKind> {
        match self {
            ModelSelection::Fixed { model } => Ok(*model),
            ModelSelection::BestAccuracy => evaluation
                .best()
                .map(|score| score.model)
                .ok_or_else(|| ScoringError::ValidationError("no evaluated models to choose from".to_string())),
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelection::Fixed { model } => write!(f, "fixed ({})", model),
            ModelSelection::BestAccuracy => f.write_str("best accuracy"),
        }
    }
}

impl FromStr for ModelSelection {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "best" | "best_accuracy" => Ok(ModelSelection::BestAccuracy),
            other => other.parse::<ModelKind>().map(|model| ModelSelection::Fixed { model }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::ModelScore;

    fn evaluation(rf: f64, knn: f64) -> Evaluation {
        Evaluation::new(vec![
            ModelScore { model: ModelKind::RandomForest, accuracy: rf },
            ModelScore { model: ModelKind::KNearestNeighbors, accuracy: knn },
        ])
    }

    #[test]
    fn test_default_is_forest() {
        let choice = ModelSelection::default().select(&evaluation(0.5, 0.9)).unwrap();
        assert_eq!(choice, ModelKind::RandomForest);
    }

    #[test]
    fn test_best_accuracy() {
        let policy = ModelSelection::BestAccuracy;
        assert_eq!(policy.select(&evaluation(0.5, 0.9)).unwrap(), ModelKind::KNearestNeighbors);
        assert_eq!(policy.select(&evaluation(0.9, 0.9)).unwrap(), ModelKind::RandomForest);
        assert!(policy.select(&Evaluation::default()).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("best".parse::<ModelSelection>().unwrap(), ModelSelection::BestAccuracy);
        assert_eq!(
            "knn".parse::<ModelSelection>().unwrap(),
            ModelSelection::Fixed { model: ModelKind::KNearestNeighbors }
        );
        assert!("tree".parse::<ModelSelection>().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(ModelSelection::default()).unwrap();
        assert_eq!(json["policy"], "fixed");
        assert_eq!(json["model"], "random_forest");
    }
}
