//! Data loading utilities

use crate::cli::Console;
use crate::config::PipelineConfig;
use crate::error::{Result, ScoringError};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;

/// CSV loader for the pipeline's input tables
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned for dtype inference
    infer_schema_length: usize,
    /// Field separator
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a loader for comma-separated files with a header row
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
            separator: b',',
        }
    }

    /// Loader using the separator and inference window of a pipeline config
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new()
            .with_separator(config.csv_separator as u8)
            .with_infer_schema_length(config.infer_schema_length)
    }

    /// Set the number of rows used for dtype inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScoringError::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(ScoringError::DataError(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| ScoringError::DataError(e.to_string()))
    }

    /// Load a CSV file, reporting the outcome instead of failing.
    ///
    /// Returns `None` when the file is missing or cannot be parsed; the
    /// failure has already been logged and shown on the console.
    pub fn try_load(&self, path: impl AsRef<Path>, console: &Console) -> Option<DataFrame> {
        let path = path.as_ref();
        console.step_run(&format!("Loading data from {}", path.display()));
        let start = Instant::now();

        match self.load_csv(path) {
            Ok(df) => {
                console.step_done(&format!(
                    "{} rows × {} cols in {:?}",
                    df.height(),
                    df.width(),
                    start.elapsed()
                ));
                tracing::info!(path = %path.display(), rows = df.height(), cols = df.width(), "dataset loaded");
                Some(df)
            }
            Err(e) => {
                console.step_failed();
                console.error(&failure_message(path, &e));
                tracing::error!(path = %path.display(), error = %e, "dataset load failed");
                None
            }
        }
    }
}

fn failure_message(path: &Path, err: &ScoringError) -> String {
    match err {
        ScoringError::FileNotFound(p) => format!("File '{}' was not found. Check the path.", p.display()),
        _ if path.is_dir() => format!("'{}' is a directory, not a CSV file.", path.display()),
        _ => format!("Failed to load '{}': {}", path.display(), err),
    }
}
