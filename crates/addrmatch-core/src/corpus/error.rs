//! Corpus load error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a corpus source
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file missing or unreadable
    #[error("failed to open corpus source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV stream
    #[error("malformed corpus source: {0}")]
    Csv(#[from] csv::Error),

    /// Header row lacks the address column
    #[error("corpus source {path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },

    /// Blocking load task panicked or was cancelled
    #[error("corpus load task failed: {0}")]
    Task(String),
}

/// Result type for corpus loading
pub type LoadResult<T> = Result<T, LoadError>;
