//! Error types for sf-db

use thiserror::Error;

/// Database error type for Starforge
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open a connection
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// A statement failed to execute
    #[error("Database execution error: {0}")]
    ExecutionError(String),

    /// A write batch was rejected; remaining batches were not attempted
    #[error("Batch {batch_index} failed for table '{table}': {message}")]
    BatchFailed {
        table: String,
        batch_index: usize,
        message: String,
    },

    /// Target table exists and write mode is `fail`
    #[error("Table '{0}' already exists (write mode is 'fail')")]
    TableExists(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
