//! Credit scoring CLI module
//!
//! Command-line entry point: builds a [`PipelineConfig`] from defaults, an
//! optional JSON file and flag overrides, then runs the pipeline.

mod console;

pub use console::{frame_info, Console};

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{ModelSelection, Pipeline, PipelineReport};

#[derive(Parser, Debug, Default)]
#[command(name = "credit-scoring")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train credit score classifiers and score new customers")]
#[command(long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (JSON); flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Labeled training table (CSV)
    #[arg(short, long)]
    pub train: Option<PathBuf>,

    /// New customers to score (CSV)
    #[arg(short, long)]
    pub new: Option<PathBuf>,

    /// Production model: random_forest, knn or best
    #[arg(short, long)]
    pub model: Option<ModelSelection>,

    /// Seed for the split and the forest
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Field separator of the input CSV files
    #[arg(long)]
    pub separator: Option<char>,

    /// Fail on missing categorical columns or code tables
    #[arg(long)]
    pub strict: bool,

    /// Suppress console output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the effective configuration
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(path) = &self.train {
            config = config.with_train_path(path.clone());
        }
        if let Some(path) = &self.new {
            config = config.with_new_customers_path(path.clone());
        }
        if let Some(selection) = self.model {
            config = config.with_selection(selection);
        }
        if let Some(seed) = self.seed {
            config = config.with_random_seed(seed);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }
        if let Some(separator) = self.separator {
            config = config.with_csv_separator(separator);
        }
        if self.strict {
            config = config.with_strict_columns(true);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn console(&self) -> Console {
        if self.quiet {
            Console::quiet()
        } else {
            Console::new()
        }
    }
}

/// Run the pipeline described by the command line
pub fn cmd_run(cli: &Cli) -> Result<Option<PipelineReport>> {
    let console = cli.console();
    let config = cli.pipeline_config()?;
    console.banner();

    let start = Instant::now();
    let report = Pipeline::new(config).with_console(console).run()?;

    match &report {
        Some(report) => {
            console.section("Summary");
            console.kv("Model", report.selected);
            if let Some(acc) = report.evaluation.get(report.selected) {
                console.kv("Hold-out accuracy", format!("{:.4}", acc));
            }
            console.kv("Customers scored", report.predictions.height());
            console.kv("Elapsed", format!("{:.2?}", start.elapsed()));
        }
        None => console.warn("Run stopped early: input data unavailable"),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::ModelKind;

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = Cli::parse_from(["credit-scoring"]);
        assert_eq!(cli.pipeline_config().unwrap(), PipelineConfig::default());
        assert!(!cli.console().is_quiet());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::parse_from([
            "credit-scoring",
            "--train",
            "a.csv",
            "--new",
            "b.csv",
            "--model",
            "knn",
            "--seed",
            "9",
            "--test-size",
            "0.3",
            "--separator",
            ";",
            "--strict",
            "--quiet",
        ]);
        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.train_path, PathBuf::from("a.csv"));
        assert_eq!(config.new_customers_path, PathBuf::from("b.csv"));
        assert_eq!(config.selection, ModelSelection::Fixed { model: ModelKind::KNearestNeighbors });
        assert_eq!(config.random_seed, 9);
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.csv_separator, ';');
        assert!(config.strict_columns);
        assert!(cli.console().is_quiet());
    }

    #[test]
    fn test_best_selection_flag() {
        let cli = Cli::parse_from(["credit-scoring", "-m", "best"]);
        assert_eq!(cli.pipeline_config().unwrap().selection, ModelSelection::BestAccuracy);
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(Cli::try_parse_from(["credit-scoring", "--model", "svm"]).is_err());
    }

    #[test]
    fn test_out_of_range_test_size() {
        let cli = Cli::parse_from(["credit-scoring", "--test-size", "1.5"]);
        assert!(cli.pipeline_config().is_err());
    }
}
