use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the load → aggregate → write pipeline.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("File must be a CSV file: {}", path.display())]
    InvalidFileType { path: PathBuf },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot read CSV file: {} (Reason: {cause})", path.display())]
    CsvRead { path: PathBuf, cause: String },

    #[error("Data is not loaded. Call `load` before accessing the data")]
    DataNotLoaded,

    #[error(
        "Invalid option: {0}. Allowed options are: {allowed} (extended: {extended})",
        allowed = crate::config::OPTION_KEYS.join(", "),
        extended = crate::config::EXTENDED_OPTION_KEYS.join(", ")
    )]
    InvalidOption(String),

    #[error("Invalid value {value:?} for option `{key}`: {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported loader `{0}`. Use `csv` or `arrow`")]
    UnsupportedLoader(String),

    #[error("Column index {index} is out of range for a table with {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    pub(crate) fn csv_read(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        DataError::CsvRead {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
