//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use castmatch_enrichment::PersonDirectory;
use castmatch_recognition::{Aggregator, FaceEncoder, Matcher};
use castmatch_store::EmbeddingStore;

/// Collaborators shared by every request.
///
/// Constructed once at startup and injected into the router; handlers
/// never reach for ambient globals.
pub struct AppState {
    pub store: Arc<dyn EmbeddingStore>,
    pub encoder: Arc<dyn FaceEncoder>,
    pub directory: PersonDirectory,
    pub scratch_dir: PathBuf,
}

impl AppState {
    /// Bundle the collaborators.
    pub fn new(
        store: Arc<dyn EmbeddingStore>,
        encoder: Arc<dyn FaceEncoder>,
        directory: PersonDirectory,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            encoder,
            directory,
            scratch_dir,
        }
    }

    /// Build the per-request aggregation pipeline.
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(Matcher::new(self.store.clone()), self.encoder.clone())
    }
}
