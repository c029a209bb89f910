//! Applying a trained model to new rows

use crate::cli::Console;
use crate::error::Result;
use crate::preprocessing::FeatureMatrix;
use crate::training::TrainedModel;
use ndarray::Array1;

/// One predicted class code per input row, in row order.
///
/// An absent input is reported and yields `Ok(None)`.
pub fn predict(
    model: &TrainedModel,
    features: Option<&FeatureMatrix>,
    console: &Console,
) -> Result<Option<Array1<f64>>> {
    let Some(features) = features else {
        console.warn("no input data to predict on");
        tracing::warn!(model = model.name(), "prediction skipped: no input data");
        return Ok(None);
    };

    let predictions = model.predict(features.values())?;
    tracing::debug!(model = model.name(), rows = predictions.len(), "predicted");
    Ok(Some(predictions))
}
