//! Error types for the recognition pipeline.

use castmatch_store::StoreError;
use thiserror::Error;

/// Result type alias for recognition operations.
pub type Result<T> = std::result::Result<T, RecognitionError>;

/// Errors that can occur while matching and aggregating.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The embedding store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The extractor sidecar returned an unusable response.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// A video frame could not be produced.
    #[error("frame source error: {0}")]
    Frame(String),

    /// Outbound HTTP to the extractor failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
