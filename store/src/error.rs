//! Error types for the embedding store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the embedding store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The name is already enrolled.
    #[error("name already enrolled: {0}")]
    DuplicateName(String),

    /// The name exceeds the catalog limit.
    #[error("name too long: {length} characters, max {max}")]
    NameTooLong { length: usize, max: usize },

    /// The name is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// Embedding has the wrong number of dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The backing store could not be reached or failed transiently.
    /// Not retried internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
