use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning a file into a [`Dataset`].
///
/// All of these are fatal at startup; once a dataset is loaded no query
/// can fail.
///
/// [`Dataset`]: super::model::Dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot read input file {path}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("row {row}, column '{column}': invalid value '{value}' ({reason})")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl DataError {
    pub(crate) fn invalid(
        row: usize,
        column: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        DataError::InvalidValue {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
