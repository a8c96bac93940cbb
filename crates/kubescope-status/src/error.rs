//! Error types for the kubescope status store.

use thiserror::Error;

/// Result type alias for status store operations.
pub type StatusResult<T> = Result<T, StatusError>;

/// Errors that can occur during status store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// The check identifier was not part of the set the store was
    /// created with. The workload set is static for the process lifetime.
    #[error("unknown check identifier: {0}")]
    UnknownIdentifier(String),
}
