use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, building, projecting or exporting city data.
#[derive(Error, Debug)]
pub enum DataError {
    /// The raw source is missing, unreadable or lacks required columns.
    #[error("data source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// A row is missing a field or carries an invalid value.
    /// `row` is zero-based over the data rows (header excluded).
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// A metric name that matches none of the known load columns.
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    /// Serializing the export failed.
    #[error("export failed: {0}")]
    Export(String),
}

impl DataError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        DataError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
