//! Hold-out accuracy for the trained candidates

use super::models::ModelKind;
use super::trainer::TrainedModels;
use crate::error::{Result, ScoringError};
use crate::preprocessing::FeatureMatrix;
use ndarray::Array1;
use std::collections::BTreeMap;

/// Fraction of positions where the predicted class equals the true class
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(ScoringError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(ScoringError::ValidationError(
            "accuracy of an empty label set is undefined".to_string(),
        ));
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Accuracy of one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelScore {
    pub model: ModelKind,
    pub accuracy: f64,
}

/// Scores of every evaluated model, in evaluation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    scores: Vec<ModelScore>,
}

impl Evaluation {
    pub fn new(scores: Vec<ModelScore>) -> Self {
        Self { scores }
    }

    pub fn scores(&self) -> &[ModelScore] {
        &self.scores
    }

    pub fn get(&self, model: ModelKind) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.model == model)
            .map(|s| s.accuracy)
    }

    /// Highest accuracy; the earliest model wins ties
    pub fn best(&self) -> Option<ModelScore> {
        self.scores.iter().fold(None, |best: Option<ModelScore>, s| match best {
            Some(b) if b.accuracy >= s.accuracy => Some(b),
            _ => Some(*s),
        })
    }

    /// Display name to accuracy
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.scores
            .iter()
            .map(|s| (s.model.display_name().to_string(), s.accuracy))
            .collect()
    }
}

/// Score every trained model on the held-out rows
pub fn evaluate(models: &TrainedModels, x_test: &FeatureMatrix, y_test: &Array1<f64>) -> Result<Evaluation> {
    let scores = models
        .iter()
        .map(|model| {
            let predictions = model.predict(x_test.values())?;
            let acc = accuracy(y_test, &predictions)?;
            tracing::info!(model = model.name(), accuracy = acc, "model evaluated");
            Ok(ModelScore {
                model: model.kind(),
                accuracy: acc,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Evaluation::new(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![0.0, 1.0, 2.0, 1.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0];
        assert_eq!(accuracy(&y_true, &y_pred).unwrap(), 0.75);
        assert_eq!(accuracy(&y_true, &y_true).unwrap(), 1.0);
        assert_eq!(accuracy(&y_true, &array![2.0, 0.0, 0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_accuracy_errors() {
        assert!(matches!(
            accuracy(&array![0.0, 1.0], &array![0.0]),
            Err(ScoringError::ShapeError { .. })
        ));
        assert!(matches!(
            accuracy(&Array1::zeros(0), &Array1::zeros(0)),
            Err(ScoringError::ValidationError(_))
        ));
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let eval = Evaluation::new(vec![
            ModelScore { model: ModelKind::RandomForest, accuracy: 0.8 },
            ModelScore { model: ModelKind::KNearestNeighbors, accuracy: 0.8 },
        ]);
        assert_eq!(eval.best().unwrap().model, ModelKind::RandomForest);

        let eval = Evaluation::new(vec![
            ModelScore { model: ModelKind::RandomForest, accuracy: 0.7 },
            ModelScore { model: ModelKind::KNearestNeighbors, accuracy: 0.9 },
        ]);
        assert_eq!(eval.best().unwrap().model, ModelKind::KNearestNeighbors);
        assert_eq!(eval.get(ModelKind::RandomForest), Some(0.7));
        assert_eq!(eval.to_map()["K-Nearest Neighbors"], 0.9);
    }

    #[test]
    fn test_best_of_empty() {
        assert!(Evaluation::default().best().is_none());
    }
}
