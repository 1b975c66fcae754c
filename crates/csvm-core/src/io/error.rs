//! Error types for CSV store operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read or write CSV data
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    /// Existing file has no header row
    #[error("CSV file {path} has no header row")]
    MissingHeader { path: PathBuf },

    /// Record does not have one value per header field
    #[error("Record has {actual} fields but the header has {expected}")]
    FieldCountMismatch { expected: usize, actual: usize },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
