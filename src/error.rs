//! Error types for the pharmacare library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the pharmacare application.
#[derive(Error, Debug)]
pub enum PharmacyError {
    /// Storage-level errors (open, write, flush)
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Import file could not be processed; nothing was written
    #[error("Import failed: {0}")]
    Import(String),

    /// Another import is still being applied
    #[error("An import is already in progress")]
    ImportInProgress,

    /// Unsupported import file extension
    #[error("File format not supported: {0}. Please use CSV or JSON files")]
    UnsupportedFormat(String),

    /// Input failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with PharmacyError
pub type Result<T> = std::result::Result<T, PharmacyError>;

impl From<anyhow::Error> for PharmacyError {
    fn from(err: anyhow::Error) -> Self {
        PharmacyError::Other(err.to_string())
    }
}
