//! Credit Scoring - customer credit score classification
//!
//! This crate trains two classifiers on a labeled customer table and uses
//! the selected one to score new customers:
//! - CSV loading into polars data frames
//! - Label encoding of categorical columns with reusable code tables
//! - Seeded train/test splitting
//! - Random forest and k-nearest-neighbors classifiers
//! - Hold-out accuracy and model selection
//!
//! # Modules
//!
//! - [`utils`] - Dataset loading
//! - [`preprocessing`] - Encoding, feature extraction, splitting
//! - [`training`] - Classifiers, trainer, evaluation
//! - [`pipeline`] - The end-to-end run
//! - [`cli`] - Command-line interface and console output
//! - [`config`] - Pipeline configuration

// Core error handling
pub mod error;
pub mod config;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod pipeline;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{Result, ScoringError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, ScoringError};

    // Configuration
    pub use crate::config::{ForestConfig, PipelineConfig};

    // Data
    pub use crate::utils::DataLoader;
    pub use crate::preprocessing::{CategoricalEncoder, ClassLabels, Codebook, FeatureMatrix, LabelEncoder};

    // Training
    pub use crate::training::{accuracy, evaluate, train_models, Evaluation, ModelKind, TrainedModel, TrainedModels};

    // Pipeline
    pub use crate::pipeline::{ModelSelection, Pipeline, PipelineReport};
    pub use crate::cli::Console;
}
