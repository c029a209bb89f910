//! Categorical label encoding
//!
//! Encoding is split into two modes: [`CategoricalEncoder::fit`] builds a
//! [`Codebook`] from data, [`CategoricalEncoder::apply`] requires one and
//! never builds new code tables. New data can therefore only be encoded
//! with tables learned from the training data.

use crate::error::{Result, ScoringError};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Code table for a single column.
///
/// Classes are kept sorted, so the code of a value is its rank among the
/// distinct values seen at fit time regardless of row order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Build a code table from observed values
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        let classes: Vec<String> = distinct.into_iter().collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as u32))
            .collect();
        Self { classes, index }
    }

    /// Distinct values in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code for one value; `column` is only used for the error message
    pub fn encode(&self, column: &str, value: &str) -> Result<u32> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| ScoringError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Codes for a sequence of values
    pub fn transform<I, S>(&self, column: &str, values: I) -> Result<Vec<u32>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|v| self.encode(column, v.as_ref()))
            .collect()
    }

    /// Original values for a sequence of codes
    pub fn inverse_transform(&self, codes: &[u32]) -> Result<Vec<&str>> {
        codes
            .iter()
            .map(|&code| {
                self.classes
                    .get(code as usize)
                    .map(String::as_str)
                    .ok_or_else(|| {
                        ScoringError::ValidationError(format!(
                            "code {} out of range for {} classes",
                            code,
                            self.classes.len()
                        ))
                    })
            })
            .collect()
    }
}

/// Per-column code tables produced in fit mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codebook {
    tables: BTreeMap<String, LabelEncoder>,
}

impl Codebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the table for a column
    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.tables.insert(column.into(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.tables.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.tables.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Columns with a recorded table, sorted by name
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Map codes of `column` back to the original values
    pub fn decode(&self, column: &str, codes: &[u32]) -> Result<Vec<String>> {
        let encoder = self
            .get(column)
            .ok_or_else(|| ScoringError::MissingCodeTable(column.to_string()))?;
        Ok(encoder
            .inverse_transform(codes)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

/// Non-fatal encoding gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingWarning {
    /// Configured column absent from the table
    MissingColumn(String),
    /// Apply mode found no code table for the column
    MissingCodeTable(String),
}

impl fmt::Display for EncodingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingWarning::MissingColumn(col) => {
                write!(f, "Column '{}' not found in the table; not encoded", col)
            }
            EncodingWarning::MissingCodeTable(col) => {
                write!(f, "No fitted encoder for column '{}'; column left unencoded", col)
            }
        }
    }
}

/// Output of an encoding pass
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Encoded copy of the input table
    pub frame: DataFrame,
    /// Columns that were replaced by codes
    pub encoded_columns: Vec<String>,
    /// Gaps that were skipped
    pub warnings: Vec<EncodingWarning>,
}

/// Label encoder over a fixed list of categorical columns
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    columns: Vec<String>,
    strict: bool,
}

impl CategoricalEncoder {
    /// Create an encoder for the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }

    /// Turn encoding gaps into errors
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fit new code tables and encode the table
    pub fn fit(&self, df: &DataFrame) -> Result<(Encoded, Codebook)> {
        self.fit_extend(df, Codebook::new())
    }

    /// Fit code tables into an existing codebook and encode the table.
    ///
    /// Columns already present in `codebook` are refit.
    pub fn fit_extend(&self, df: &DataFrame, mut codebook: Codebook) -> Result<(Encoded, Codebook)> {
        let mut frame = df.clone();
        let mut encoded_columns = Vec::new();
        let mut warnings = Vec::new();

        for col_name in &self.columns {
            let Ok(column) = df.column(col_name) else {
                self.gap(EncodingWarning::MissingColumn(col_name.clone()), &mut warnings)?;
                continue;
            };

            let values = categorical_values(column.as_materialized_series(), col_name)?;
            let encoder = LabelEncoder::fit(values.iter());
            let codes = encoder.transform(col_name, values.iter())?;

            frame.with_column(Series::new(col_name.as_str().into(), codes))?;
            tracing::info!(column = %col_name, n_classes = encoder.n_classes(), "column encoded, code table fitted");

            codebook.insert(col_name.clone(), encoder);
            encoded_columns.push(col_name.clone());
        }

        Ok((Encoded { frame, encoded_columns, warnings }, codebook))
    }

    /// Encode the table with previously fitted code tables
    pub fn apply(&self, df: &DataFrame, codebook: &Codebook) -> Result<Encoded> {
        let mut frame = df.clone();
        let mut encoded_columns = Vec::new();
        let mut warnings = Vec::new();

        for col_name in &self.columns {
            let Ok(column) = df.column(col_name) else {
                self.gap(EncodingWarning::MissingColumn(col_name.clone()), &mut warnings)?;
                continue;
            };
            let Some(encoder) = codebook.get(col_name) else {
                self.gap(EncodingWarning::MissingCodeTable(col_name.clone()), &mut warnings)?;
                continue;
            };

            let values = categorical_values(column.as_materialized_series(), col_name)?;
            let codes = encoder.transform(col_name, values.iter())?;

            frame.with_column(Series::new(col_name.as_str().into(), codes))?;
            tracing::info!(column = %col_name, "column encoded with existing code table");
            encoded_columns.push(col_name.clone());
        }

        Ok(Encoded { frame, encoded_columns, warnings })
    }

    fn gap(&self, warning: EncodingWarning, warnings: &mut Vec<EncodingWarning>) -> Result<()> {
        if self.strict {
            return Err(match warning {
                EncodingWarning::MissingColumn(col) => ScoringError::FeatureNotFound(col),
                EncodingWarning::MissingCodeTable(col) => ScoringError::MissingCodeTable(col),
            });
        }
        tracing::warn!("{}", warning);
        warnings.push(warning);
        Ok(())
    }
}

/// String form of every value in a categorical column; nulls are rejected
fn categorical_values(series: &Series, column: &str) -> Result<Vec<String>> {
    let nulls = series.null_count();
    if nulls > 0 {
        return Err(ScoringError::MissingValues {
            column: column.to_string(),
            count: nulls,
        });
    }

    let as_str = series.cast(&DataType::String)?;
    let values = as_str
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(values)
}
