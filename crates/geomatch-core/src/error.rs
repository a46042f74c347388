//! Error types for geomatch

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeomatchError {
    // Row errors. Recoverable: the loader skips the row and counts it.
    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    // Schema errors
    #[error("Coordinate column not found in header: {column}")]
    ColumnNotFound { column: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeomatchError>;
