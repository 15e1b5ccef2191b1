/// Error types for the scanning engine.
///
/// Only failures that abort a whole call are represented here. A process
/// that exits mid-scan or a descriptor that vanishes is normal churn and is
/// skipped without producing an error.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// A directory could not be opened or listed.
    ///
    /// Fatal only when it is the top-level process list.
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path prefix could not be turned into an absolute path.
    #[error("invalid path prefix {}: {source}", .prefix.display())]
    InvalidPrefix {
        prefix: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background scanner thread could not be started.
    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The scanner thread panicked before producing a result.
    #[error("scanner thread panicked")]
    Panicked,
}

/// Failures while serialising a sealed index.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
