//! The embedding store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::{EMBEDDING_DIM, MAX_NAME_LEN};

/// A (name, distance) pair produced by a similarity query.
///
/// Candidates are always ordered ascending by distance (closest first)
/// and exist only for the duration of one match operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Enrolled identity name.
    pub name: String,

    /// Two-stage split distance from the probe embedding.
    pub distance: f64,
}

/// Catalog of enrolled identities with radius-bounded similarity lookup.
///
/// Handles are explicitly constructed and injected into the components
/// that need them; there is no process-wide store.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Enroll a named identity.
    ///
    /// The embedding is split into its low and high halves and persisted
    /// atomically as one row. Fails with [`StoreError::DuplicateName`]
    /// when the name is already enrolled.
    async fn enroll(&self, name: &str, embedding: &[f64]) -> Result<()>;

    /// Return every enrolled identity whose two-stage distance from the
    /// probe is at most `radius`, ascending by distance.
    ///
    /// An empty result is not an error.
    async fn find_within_radius(&self, embedding: &[f64], radius: f64)
    -> Result<Vec<MatchCandidate>>;

    /// Number of enrolled identities.
    async fn count(&self) -> Result<u64>;
}

/// Validate an enrollment request before it reaches the backend.
pub(crate) fn check_enrollment(name: &str, embedding: &[f64]) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    // varchar(50) limits characters, not bytes.
    let chars = name.chars().count();
    if chars > MAX_NAME_LEN {
        return Err(StoreError::NameTooLong {
            length: chars,
            max: MAX_NAME_LEN,
        });
    }
    check_dimension(embedding)
}

/// Validate a probe embedding's dimension.
pub(crate) fn check_dimension(embedding: &[f64]) -> Result<()> {
    if embedding.len() != EMBEDDING_DIM {
        return Err(StoreError::DimensionMismatch {
            expected: EMBEDDING_DIM,
            actual: embedding.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let embedding = vec![0.0; EMBEDDING_DIM];
        assert!(matches!(
            check_enrollment("", &embedding),
            Err(StoreError::EmptyName)
        ));
    }

    #[test]
    fn rejects_overlong_name() {
        let embedding = vec![0.0; EMBEDDING_DIM];
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            check_enrollment(&name, &embedding),
            Err(StoreError::NameTooLong { length: 51, max: 50 })
        ));
    }

    #[test]
    fn rejects_wrong_dimension() {
        assert!(matches!(
            check_enrollment("Alice", &[0.0; 64]),
            Err(StoreError::DimensionMismatch {
                expected: 128,
                actual: 64
            })
        ));
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let embedding = vec![0.0; EMBEDDING_DIM];
        // 50 characters but 150 UTF-8 bytes; within the column limit.
        let name = "吉".repeat(MAX_NAME_LEN);
        assert!(check_enrollment(&name, &embedding).is_ok());

        let too_long = "吉".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            check_enrollment(&too_long, &embedding),
            Err(StoreError::NameTooLong { length: 51, max: 50 })
        ));
    }

    #[test]
    fn accepts_valid_enrollment() {
        let embedding = vec![0.0; EMBEDDING_DIM];
        assert!(check_enrollment("Alice", &embedding).is_ok());
    }
}
