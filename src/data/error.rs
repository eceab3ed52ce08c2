use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a dataset from an input file. Fatal for the load: no
/// partial dataset is ever returned.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("no usable rows in input")]
    NoRows,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A filter option that references a category outside the dataset universe.
/// Recovered locally by resetting the offending dimension to "no filter".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidFilterValue {
    #[error("unknown province '{0}'")]
    Province(String),

    #[error("district '{district}' does not belong to {}", .province.as_deref().unwrap_or("any selected province"))]
    District {
        district: String,
        province: Option<String>,
    },

    #[error("unknown commodity '{0}'")]
    Commodity(String),

    #[error("invalid distance bound {0} km")]
    MaxDistance(f64),
}

/// The selection resolver was given an identifier outside the current
/// filtered subset. Recovered by clearing the selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("property '{name}' is not in the current selection")]
pub struct NotFoundError {
    pub name: String,
}
