//! Database error types.
//!
//! Provides comprehensive error handling for store operations using `thiserror`.

use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create database connection.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Failed to decode database value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Required fields missing or invalid; rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Bulk import payload is structurally unusable.
    #[error("import rejected: {0}")]
    ImportRejected(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during database operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mailforge_core::CoreError> for DatabaseError {
    fn from(err: mailforge_core::CoreError) -> Self {
        match err {
            mailforge_core::CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Decode(other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
