//! Error types for the conversation store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when using the conversation store
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQL errors, constraint violations, missing rows
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to open or migrate the database file
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid input data (bad role tag, unparseable timestamp)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The blocking task running the query was cancelled or panicked
    #[error("Task error: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}
