//! End-to-end credit score pipeline
//!
//! Loads the labeled customer table, encodes its categorical columns,
//! trains and scores the candidate classifiers on a seeded hold-out split,
//! then scores the new-customer table with the selected model and attaches
//! the predictions to it.
//!
//! A table that cannot be loaded ends the run early with `Ok(None)`;
//! encoding, training and prediction errors are returned as `Err`.

mod predictor;
mod selection;

pub use predictor::predict;
pub use selection::ModelSelection;

use crate::cli::Console;
use crate::config::PipelineConfig;
use crate::error::{Result, ScoringError};
use crate::preprocessing::{
    drop_columns_if_present, split_features_and_label, train_test_split, CategoricalEncoder, ClassLabels,
    EncodingWarning, FeatureMatrix,
};
use crate::training::{evaluate, train_models, Evaluation, ModelKind, TrainedModels};
use crate::utils::DataLoader;
use polars::prelude::*;

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub n_train: usize,
    pub n_test: usize,
    /// Class values in code order, as strings
    pub classes: Vec<String>,
    pub evaluation: Evaluation,
    pub selected: ModelKind,
    /// Forest importances, most important first
    pub feature_importances: Vec<(String, f64)>,
    /// Encoding gaps from both tables, training table first
    pub warnings: Vec<EncodingWarning>,
    /// New-customer table with the prediction column attached
    pub predictions: DataFrame,
}

/// Configured pipeline run
pub struct Pipeline {
    config: PipelineConfig,
    loader: DataLoader,
    console: Console,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            loader: DataLoader::from_config(&config),
            config,
            console: Console::new(),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> Result<Option<PipelineReport>> {
        self.config.validate()?;
        let cfg = &self.config;
        let console = &self.console;
        let mut warnings = Vec::new();

        // Training data
        console.section("Training data");
        let Some(train_df) = self.loader.try_load(&cfg.train_path, console) else {
            return Ok(None);
        };
        console.text(format!("First {} rows:", cfg.preview_rows));
        console.preview(&train_df, cfg.preview_rows);
        console.info(&train_df);

        let encoder = CategoricalEncoder::new(cfg.categorical_columns.iter()).with_strict(cfg.strict_columns);
        let (encoded, codebook) = encoder.fit(&train_df)?;
        self.report_warnings(&encoded.warnings);
        warnings.extend(encoded.warnings);
        console.text("Encoded:");
        console.preview(&encoded.frame, cfg.preview_rows);

        let drop: Vec<String> = cfg.id_column.iter().cloned().collect();
        let (features_df, label_series) = split_features_and_label(&encoded.frame, &cfg.label_column, &drop)?;
        let (classes, y) = ClassLabels::fit(&label_series)?;
        let x = FeatureMatrix::from_frame(&features_df)?;

        let split = train_test_split(&x, &y, cfg.test_size, cfg.random_seed)?;
        let n_train = split.x_train.n_rows();
        let n_test = split.x_test.n_rows();
        console.kv("Training rows", n_train);
        console.kv("Test rows", n_test);
        tracing::info!(n_train, n_test, features = x.n_features(), classes = classes.n_classes(), "data prepared");

        // Models
        console.section("Models");
        console.step_run("Training Random Forest and K-Nearest Neighbors");
        let models = match train_models(&split.x_train, &split.y_train, cfg) {
            Ok(models) => {
                console.step_done(&format!("{} models", models.len()));
                models
            }
            Err(e) => {
                console.step_failed();
                return Err(e);
            }
        };

        let evaluation = evaluate(&models, &split.x_test, &split.y_test)?;
        for score in evaluation.scores() {
            console.text(format!("Accuracy of {}: {:.4}", score.model, score.accuracy));
        }

        let selected = cfg.selection.select(&evaluation)?;
        let model = models.get(selected).ok_or(ScoringError::ModelNotFitted)?;
        console.kv("Selection policy", cfg.selection);
        console.step_ok(&format!("Using {}", selected));

        let feature_importances = ranked_importances(&models);
        if !feature_importances.is_empty() {
            console.text("Feature importances (Random Forest):");
            for (name, importance) in &feature_importances {
                console.kv(name, format!("{:.4}", importance));
            }
        }

        // New customers
        console.section("New customers");
        let Some(new_df) = self.loader.try_load(&cfg.new_customers_path, console) else {
            return Ok(None);
        };
        console.preview(&new_df, cfg.preview_rows);

        let encoded_new = encoder.apply(&new_df, &codebook)?;
        self.report_warnings(&encoded_new.warnings);
        warnings.extend(encoded_new.warnings);

        let mut drop_new = drop;
        drop_new.push(cfg.label_column.clone());
        let new_features = drop_columns_if_present(&encoded_new.frame, &drop_new)?;
        let new_x = FeatureMatrix::from_frame_with_columns(&new_features, models.feature_names())?;

        let Some(codes) = predict(model, Some(&new_x), console)? else {
            return Ok(None);
        };
        let decoded = classes.decode(&codes, &cfg.prediction_column)?;

        console.text("Predictions:");
        console.text(classes.decode_strings(&codes)?.join(", "));

        let mut predictions = new_df;
        predictions.with_column(decoded)?;
        console.frame(&predictions);

        tracing::info!(model = %selected, rows = predictions.height(), "new customers scored");

        Ok(Some(PipelineReport {
            n_train,
            n_test,
            classes: classes.classes().to_vec(),
            evaluation,
            selected,
            feature_importances,
            warnings,
            predictions,
        }))
    }

    fn report_warnings(&self, warnings: &[EncodingWarning]) {
        for warning in warnings {
            self.console.warn(&warning.to_string());
        }
    }
}

fn ranked_importances(models: &TrainedModels) -> Vec<(String, f64)> {
    let Some(importances) = models
        .get(ModelKind::RandomForest)
        .and_then(|m| m.feature_importances())
    else {
        return Vec::new();
    };

    let mut ranked: Vec<(String, f64)> = models
        .feature_names()
        .iter()
        .cloned()
        .zip(importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
