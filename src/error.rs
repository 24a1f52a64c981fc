//! Error types for the import pipeline.

use thiserror::Error;

/// Errors raised while converting a single legacy record.
///
/// Database and connection failures travel as `anyhow::Error` with context;
/// this enum covers the conversions whose failure is specific to the data.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("unknown legacy news status {status} for news #{id}")]
    UnknownNewsStatus { id: i64, status: i64 },

    #[error("column {column} of {table} is not an epoch timestamp")]
    NotATimestamp { table: String, column: String },

    #[error("column {column} of {table} is NULL")]
    NullValue { table: String, column: String },

    #[error("column {column} of {table} is not a valid {expected}")]
    InvalidValue {
        table: String,
        column: String,
        expected: &'static str,
    },

    #[error("column {column} missing from {table} row")]
    MissingColumn { table: String, column: String },

    #[error("destination table name contains invalid characters: {0}")]
    InvalidTableName(String),
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;
