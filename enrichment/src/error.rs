//! Error types for the enrichment gateway.

use thiserror::Error;

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;

/// Errors that can occur while talking to the person directory.
///
/// These never cross the service boundary: [`enrich`] swallows them
/// per-name, logging and omitting the failed record.
///
/// [`enrich`]: crate::client::PersonDirectory::enrich
#[derive(Error, Debug)]
pub enum EnrichError {
    /// The directory returned a non-success status.
    #[error("directory request failed with status {0}")]
    Request(u16),

    /// The search produced no usable hit for the name.
    #[error("no directory entry for: {0}")]
    NoMatch(String),

    /// The directory's response body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Outbound HTTP failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
