/// Trafficdb Error Module
///
/// This module defines the error types shared by the table accessor, the
/// ingestion routine and the command line front end.
use thiserror::Error;

/// Error type for the trafficdb crate.
///
/// Only `Connection` and `Validation` ever reach callers of the table
/// accessor; schema and query failures are logged and absorbed there.
/// The remaining variants serve ingestion, configuration and the binary.
#[derive(Error, Debug)]
pub enum TrafficError {
    /// The store could not be opened at construction
    #[error("Connection error: {0}")]
    Connection(rusqlite::Error),

    /// Errors raised by SQLite outside of connection setup
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Schema introspection failed or the table does not exist
    #[error("Schema error: {0}")]
    Schema(String),

    /// A read or write statement failed at the storage layer
    #[error("Query error: {0}")]
    Query(String),

    /// A value does not match the kind expected for its column
    #[error("Invalid value kind for column {column}: expected {expected}")]
    Validation { column: String, expected: String },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Spreadsheet ingestion errors that are not plain I/O or CSV failures
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input during ingestion
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrafficError {
    /// Builds a validation error for `column`.
    pub fn validation(column: impl Into<String>, expected: impl Into<String>) -> Self {
        TrafficError::Validation {
            column: column.into(),
            expected: expected.into(),
        }
    }

    /// Returns true for errors raised before the store was touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, TrafficError::Validation { .. })
    }
}

/// Type alias for Result to use TrafficError as the error type.
pub type Result<T> = std::result::Result<T, TrafficError>;
