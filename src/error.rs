//! Common error types for the survey service

use thiserror::Error;

/// Common result type for survey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared across the survey service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Dataset loading or deserialization error
    #[error("Dataset error: {0}")]
    Dataset(#[from] csv::Error),
}
