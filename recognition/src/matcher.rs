//! Embedding-to-identity matching.

use std::sync::Arc;

use castmatch_store::EmbeddingStore;
use tracing::debug;

use crate::MATCH_RADIUS;
use crate::error::Result;

/// Resolves one embedding to at most one enrolled identity.
pub struct Matcher {
    store: Arc<dyn EmbeddingStore>,
    radius: f64,
}

impl Matcher {
    /// Create a matcher over the given store using the calibrated radius.
    pub fn new(store: Arc<dyn EmbeddingStore>) -> Self {
        Self {
            store,
            radius: MATCH_RADIUS,
        }
    }

    /// Override the similarity radius. Test hook; production code uses
    /// the calibrated default.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Return the closest enrolled identity within the radius, if any.
    ///
    /// The store already orders candidates ascending by distance, so the
    /// first candidate is the best; no further tie-breaking is needed.
    pub async fn resolve(&self, embedding: &[f64]) -> Result<Option<String>> {
        let candidates = self.store.find_within_radius(embedding, self.radius).await?;

        match candidates.into_iter().next() {
            Some(best) => {
                debug!("Matched {} at distance {:.4}", best.name, best.distance);
                Ok(Some(best.name))
            }
            None => Ok(None),
        }
    }
}
