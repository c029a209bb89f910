//! Feature matrix and target label extraction

use super::encoder::LabelEncoder;
use crate::error::{Result, ScoringError};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use std::collections::HashMap;

/// Numeric feature matrix with its column names
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap an array; `names` must match the column count
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(ScoringError::ShapeError {
                expected: format!("{} feature names", values.ncols()),
                actual: format!("{} feature names", names.len()),
            });
        }
        Ok(Self { names, values })
    }

    /// Every column of the table, in table order
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        Self::from_frame_with_columns(df, &names)
    }

    /// The named columns of the table, in the given order.
    ///
    /// Columns of the table not listed in `names` are ignored.
    pub fn from_frame_with_columns(df: &DataFrame, names: &[String]) -> Result<Self> {
        let extra: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.as_str())
            .filter(|name| !names.iter().any(|n| n == name))
            .collect();
        if !extra.is_empty() {
            tracing::warn!(columns = ?extra, "ignoring columns not used by the model");
        }

        let values = columns_to_array2(df, names)?;
        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Subset of rows, in the order given
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.select(Axis(0), indices),
        }
    }
}

/// Extract named numeric columns into a row-major `Array2<f64>`.
///
/// Non-numeric columns, nulls and non-finite values are rejected with the
/// column name, so a categorical column left unencoded surfaces here rather
/// than inside a model.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| ScoringError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();

            let dtype = series.dtype();
            if !is_numeric_dtype(dtype) {
                return Err(ScoringError::DataError(format!(
                    "feature column '{}' has non-numeric dtype {}; list it as a categorical column",
                    col_name, dtype
                )));
            }
            let nulls = series.null_count();
            if nulls > 0 {
                return Err(ScoringError::MissingValues {
                    column: col_name.clone(),
                    count: nulls,
                });
            }

            let series_f64 = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = series_f64.f64()?.into_no_null_iter().collect();
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(ScoringError::DataError(format!(
                    "feature column '{}' contains non-finite value {}",
                    col_name, bad
                )));
            }
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Target classes learned from the label column.
///
/// Labels of any dtype are mapped to class codes `0..n_classes`; decoding
/// restores values with the label column's original dtype.
#[derive(Debug, Clone)]
pub struct ClassLabels {
    column: String,
    encoder: LabelEncoder,
    /// One original value per class, in code order
    prototypes: Series,
}

impl ClassLabels {
    /// Learn classes from a label series and return its codes
    pub fn fit(series: &Series) -> Result<(Self, Array1<f64>)> {
        let column = series.name().to_string();
        let nulls = series.null_count();
        if nulls > 0 {
            return Err(ScoringError::MissingValues { column, count: nulls });
        }

        let as_str = series.cast(&DataType::String)?;
        let values: Vec<&str> = as_str.str()?.into_no_null_iter().collect();

        let encoder = LabelEncoder::fit(values.iter());
        let codes = encoder.transform(&column, values.iter())?;

        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (row, value) in values.iter().enumerate() {
            first_seen.entry(*value).or_insert(row);
        }
        let rows: Vec<IdxSize> = encoder
            .classes()
            .iter()
            .map(|class| first_seen[class.as_str()] as IdxSize)
            .collect();
        let prototypes = series.take(&IdxCa::from_vec("rows".into(), rows))?;

        let y: Array1<f64> = codes.into_iter().map(f64::from).collect();
        Ok((
            Self {
                column,
                encoder,
                prototypes,
            },
            y,
        ))
    }

    /// Name of the label column
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Class values in code order, as strings
    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    pub fn n_classes(&self) -> usize {
        self.encoder.n_classes()
    }

    /// Decode class codes into a series named `name`
    pub fn decode(&self, codes: &Array1<f64>, name: &str) -> Result<Series> {
        let rows = codes
            .iter()
            .map(|&code| self.class_index(code).map(|i| i as IdxSize))
            .collect::<Result<Vec<IdxSize>>>()?;
        let decoded = self.prototypes.take(&IdxCa::from_vec("rows".into(), rows))?;
        Ok(decoded.with_name(name.into()))
    }

    /// Decode class codes into their string form
    pub fn decode_strings(&self, codes: &Array1<f64>) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| self.class_index(code).map(|i| self.classes()[i].clone()))
            .collect()
    }

    fn class_index(&self, code: f64) -> Result<usize> {
        let idx = code.round();
        if idx < 0.0 || idx as usize >= self.n_classes() || (code - idx).abs() > 1e-9 {
            return Err(ScoringError::ValidationError(format!(
                "predicted code {} is not a class of '{}'",
                code, self.column
            )));
        }
        Ok(idx as usize)
    }
}

/// Separate the label column and drop the listed columns that are present
pub fn split_features_and_label(
    df: &DataFrame,
    label: &str,
    drop: &[String],
) -> Result<(DataFrame, Series)> {
    let label_series = df
        .column(label)
        .map_err(|_| ScoringError::FeatureNotFound(label.to_string()))?
        .as_materialized_series()
        .clone();

    let features = drop_columns_if_present(&df.drop(label)?, drop)?;
    Ok((features, label_series))
}

/// Copy of the table without the listed columns; absent columns are ignored
pub fn drop_columns_if_present(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut out = df.clone();
    for col in columns {
        if out.column(col).is_ok() {
            out = out.drop(col)?;
            tracing::debug!(column = %col, "dropped column");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_frame() {
        let df = df!(
            "idade" => &[30i64, 41],
            "renda" => &[1500.5, 3200.0],
            "profissao" => &[1u32, 0]
        )
        .unwrap();

        let fm = FeatureMatrix::from_frame(&df).unwrap();
        assert_eq!(fm.names(), &["idade", "renda", "profissao"]);
        assert_eq!(fm.values(), &array![[30.0, 1500.5, 1.0], [41.0, 3200.0, 0.0]]);
    }

    #[test]
    fn test_string_column_rejected() {
        let df = df!("profissao" => &["eng", "med"]).unwrap();
        let err = FeatureMatrix::from_frame(&df).unwrap_err();
        assert!(err.to_string().contains("profissao"));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let df = df!("idade" => &[30.0, 41.0], "renda" => &[1500.5, f64::NAN]).unwrap();
        match FeatureMatrix::from_frame(&df) {
            Err(ScoringError::DataError(msg)) => assert!(msg.contains("renda")),
            other => panic!("expected DataError, got {:?}", other),
        }

        let df = df!("renda" => &[f64::INFINITY]).unwrap();
        assert!(matches!(
            FeatureMatrix::from_frame(&df),
            Err(ScoringError::DataError(_))
        ));
    }

    #[test]
    fn test_from_frame_with_columns_reorders() {
        let df = df!("b" => &[2.0], "a" => &[1.0], "extra" => &[9.0]).unwrap();
        let names = vec!["a".to_string(), "b".to_string()];
        let fm = FeatureMatrix::from_frame_with_columns(&df, &names).unwrap();
        assert_eq!(fm.values(), &array![[1.0, 2.0]]);
    }

    #[test]
    fn test_from_frame_with_columns_missing() {
        let df = df!("a" => &[1.0]).unwrap();
        let names = vec!["a".to_string(), "b".to_string()];
        let result = FeatureMatrix::from_frame_with_columns(&df, &names);
        assert!(matches!(result, Err(ScoringError::FeatureNotFound(ref c)) if c == "b"));
    }

    #[test]
    fn test_class_labels_strings() {
        let labels = Series::new("score_credito".into(), &["Standard", "Good", "Poor", "Good"]);
        let (classes, y) = ClassLabels::fit(&labels).unwrap();

        assert_eq!(classes.classes(), &["Good", "Poor", "Standard"]);
        assert_eq!(y, array![2.0, 0.0, 1.0, 0.0]);

        let decoded = classes.decode(&array![1.0, 2.0], "pred").unwrap();
        assert_eq!(decoded.name().as_str(), "pred");
        assert_eq!(decoded.dtype(), &DataType::String);
        let values: Vec<&str> = decoded.str().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec!["Poor", "Standard"]);
    }

    #[test]
    fn test_class_labels_keep_integer_dtype() {
        let labels = Series::new("score_credito".into(), &[2i64, 0, 1, 0]);
        let (classes, y) = ClassLabels::fit(&labels).unwrap();
        assert_eq!(y, array![2.0, 0.0, 1.0, 0.0]);

        let decoded = classes.decode(&array![0.0, 2.0], "pred").unwrap();
        assert_eq!(decoded.dtype(), &DataType::Int64);
        let values: Vec<i64> = decoded.i64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![0, 2]);
    }

    #[test]
    fn test_class_labels_reject_unknown_code() {
        let labels = Series::new("y".into(), &["a", "b"]);
        let (classes, _) = ClassLabels::fit(&labels).unwrap();
        assert!(classes.decode(&array![5.0], "pred").is_err());
    }

    #[test]
    fn test_split_features_and_label() {
        let df = df!(
            "id_cliente" => &[1i64, 2],
            "idade" => &[30i64, 41],
            "score_credito" => &["Good", "Poor"]
        )
        .unwrap();

        let (features, label) =
            split_features_and_label(&df, "score_credito", &["id_cliente".to_string()]).unwrap();
        let names: Vec<String> = features.get_column_names().into_iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["idade".to_string()]);
        assert_eq!(label.name().as_str(), "score_credito");
    }

    #[test]
    fn test_split_missing_label() {
        let df = df!("idade" => &[30i64]).unwrap();
        let result = split_features_and_label(&df, "score_credito", &[]);
        assert!(matches!(result, Err(ScoringError::FeatureNotFound(_))));
    }

    #[test]
    fn test_drop_absent_column_is_noop() {
        let df = df!("idade" => &[30i64]).unwrap();
        let out = drop_columns_if_present(&df, &["id_cliente".to_string()]).unwrap();
        assert!(out.equals(&df));
    }
}
