//! Pipeline configuration
//!
//! Every field has a default matching the reference dataset layout, so a
//! bare `PipelineConfig::default()` runs the standard credit-score job.
//! Partial JSON files are accepted; missing keys fall back to defaults.

use crate::error::{Result, ScoringError};
use crate::pipeline::ModelSelection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree (unbounded when `None`)
    pub max_depth: Option<usize>,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Configuration for a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Labeled training table
    pub train_path: PathBuf,
    /// Unlabeled table to score
    pub new_customers_path: PathBuf,
    /// Columns to label-encode
    pub categorical_columns: Vec<String>,
    /// Target column in the training table
    pub label_column: String,
    /// Identifier column, dropped from features when present
    pub id_column: Option<String>,
    /// Name of the column holding predictions in the output table
    pub prediction_column: String,
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed shared by the split and the forest
    pub random_seed: u64,
    /// Random forest hyperparameters
    pub forest: ForestConfig,
    /// Neighborhood size for k-NN
    pub n_neighbors: usize,
    /// Which trained model scores the new customers
    pub selection: ModelSelection,
    /// Treat missing categorical columns / code tables as errors
    pub strict_columns: bool,
    /// Rows shown in table previews
    pub preview_rows: usize,
    /// Field separator of both input tables (ASCII)
    pub csv_separator: char,
    /// Rows scanned when inferring column dtypes
    pub infer_schema_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("../dados/clientes.csv"),
            new_customers_path: PathBuf::from("../dados/novos_clientes.csv"),
            categorical_columns: vec![
                "profissao".to_string(),
                "mix_credito".to_string(),
                "comportamento_pagamento".to_string(),
            ],
            label_column: "score_credito".to_string(),
            id_column: Some("id_cliente".to_string()),
            prediction_column: "score_credito_previsto".to_string(),
            test_size: 0.2,
            random_seed: 42,
            forest: ForestConfig::default(),
            n_neighbors: 5,
            selection: ModelSelection::default(),
            strict_columns: false,
            preview_rows: 5,
            csv_separator: ',',
            infer_schema_length: 1000,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScoringError::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| ScoringError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Set the training table path
    pub fn with_train_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.train_path = path.into();
        self
    }

    /// Set the new-customer table path
    pub fn with_new_customers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_customers_path = path.into();
        self
    }

    /// Set the categorical columns
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the model selection policy
    pub fn with_selection(mut self, selection: ModelSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Enable strict column checking
    pub fn with_strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Set the CSV field separator
    pub fn with_csv_separator(mut self, separator: char) -> Self {
        self.csv_separator = separator;
        self
    }

    /// Set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.forest.n_estimators = n;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ScoringError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must lie strictly between 0 and 1".to_string(),
            });
        }
        if self.forest.n_estimators == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "forest.n_estimators".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }
        if self.n_neighbors == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "at least one neighbor is required".to_string(),
            });
        }
        if !self.csv_separator.is_ascii() {
            return Err(ScoringError::InvalidParameter {
                name: "csv_separator".to_string(),
                value: self.csv_separator.to_string(),
                reason: "must be a single ASCII character".to_string(),
            });
        }
        if self.infer_schema_length == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "infer_schema_length".to_string(),
                value: "0".to_string(),
                reason: "at least one row is needed to infer dtypes".to_string(),
            });
        }
        if self.label_column.is_empty() {
            return Err(ScoringError::ConfigError("label_column is empty".to_string()));
        }
        if self.categorical_columns.contains(&self.label_column) {
            return Err(ScoringError::ConfigError(format!(
                "label column '{}' cannot also be a categorical feature",
                self.label_column
            )));
        }
        Ok(())
    }
}
