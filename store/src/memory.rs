//! In-memory embedding store.
//!
//! Applies the same split-distance predicate as the Postgres backend, so
//! the matching pipeline can be exercised without a database. Used as the
//! test double throughout the workspace and suitable for local runs.

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use tokio::sync::RwLock;
use tracing::debug;

use crate::SPLIT_POINT;
use crate::distance::split_distance;
use crate::error::{Result, StoreError};
use crate::store::{EmbeddingStore, MatchCandidate, check_dimension, check_enrollment};

struct Entry {
    name: String,
    low: Vec<f64>,
    high: Vec<f64>,
}

/// In-memory identity catalog.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryStore {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn enroll(&self, name: &str, embedding: &[f64]) -> Result<()> {
        check_enrollment(name, embedding)?;

        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        entries.push(Entry {
            name: name.to_string(),
            low: embedding[..SPLIT_POINT].to_vec(),
            high: embedding[SPLIT_POINT..].to_vec(),
        });
        debug!("Enrolled identity: {name}");
        Ok(())
    }

    async fn find_within_radius(
        &self,
        embedding: &[f64],
        radius: f64,
    ) -> Result<Vec<MatchCandidate>> {
        check_dimension(embedding)?;

        let entries = self.entries.read().await;
        let mut candidates: Vec<MatchCandidate> = entries
            .iter()
            .filter_map(|e| {
                let distance = split_distance(embedding, &e.low, &e.high);
                (distance <= radius).then(|| MatchCandidate {
                    name: e.name.clone(),
                    distance,
                })
            })
            .collect();

        candidates.sort_by_key(|c| OrderedFloat(c.distance));
        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMBEDDING_DIM;
    use pretty_assertions::assert_eq;

    fn embedding_with(index: usize, value: f64) -> Vec<f64> {
        let mut e = vec![0.0; EMBEDDING_DIM];
        e[index] = value;
        e
    }

    #[tokio::test]
    async fn duplicate_name_fails_and_count_is_unchanged() {
        let store = MemoryStore::new();
        store.enroll("Alice", &vec![0.1; EMBEDDING_DIM]).await.unwrap();

        let second = store.enroll("Alice", &vec![0.9; EMBEDDING_DIM]).await;
        assert!(matches!(second, Err(StoreError::DuplicateName(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn enrolled_embedding_matches_itself() {
        let store = MemoryStore::new();
        let embedding = vec![0.3; EMBEDDING_DIM];
        store.enroll("Alice", &embedding).await.unwrap();

        let candidates = store.find_within_radius(&embedding, 0.6).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Alice");
        assert!(candidates[0].distance.abs() < 1e-12);
    }

    #[tokio::test]
    async fn radius_boundary_is_inclusive() {
        let store = MemoryStore::new();
        store.enroll("Alice", &vec![0.0; EMBEDDING_DIM]).await.unwrap();

        // Probe at a known offset; use its own computed distance as the
        // radius so the <= boundary is tested without float guesswork.
        let probe = embedding_with(0, 0.6);
        let zeros = vec![0.0; SPLIT_POINT];
        let exact = split_distance(&probe, &zeros, &zeros);

        let at_boundary = store.find_within_radius(&probe, exact).await.unwrap();
        assert_eq!(at_boundary.len(), 1);

        let just_below_excludes = store
            .find_within_radius(&probe, exact - 1e-9)
            .await
            .unwrap();
        assert!(just_below_excludes.is_empty());
    }

    #[tokio::test]
    async fn candidates_are_ordered_closest_first() {
        let store = MemoryStore::new();
        store
            .enroll("Far", &embedding_with(0, 0.5))
            .await
            .unwrap();
        store
            .enroll("Near", &embedding_with(0, 0.1))
            .await
            .unwrap();

        let probe = vec![0.0; EMBEDDING_DIM];
        let candidates = store.find_within_radius(&probe, 0.6).await.unwrap();
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);
    }

    #[tokio::test]
    async fn nothing_within_radius_is_empty_not_error() {
        let store = MemoryStore::new();
        store.enroll("Alice", &vec![1.0; EMBEDDING_DIM]).await.unwrap();

        let probe = vec![0.0; EMBEDDING_DIM];
        let candidates = store.find_within_radius(&probe, 0.6).await.unwrap();
        assert!(candidates.is_empty());
    }
}
