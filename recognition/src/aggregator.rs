//! Cross-frame evidence aggregation.
//!
//! One request produces one [`ResultSet`]: every matched identity across
//! all analyzed frames, first-seen order, no duplicates. Frames with no
//! detected faces contribute nothing, and a frame the decoder cannot
//! produce is skipped rather than failing the whole request.

use std::sync::Arc;

use castmatch_store::Embedding;
use tracing::{debug, warn};

use crate::encoder::FaceEncoder;
use crate::error::Result;
use crate::frames::FrameSource;
use crate::matcher::Matcher;
use crate::sampler::sample_indices;

/// Ordered, duplicate-free identity names accumulated over one request.
///
/// Created empty, grown by the aggregator, consumed once to drive
/// enrichment.
#[derive(Debug, Default)]
pub struct ResultSet {
    names: Vec<String>,
}

impl ResultSet {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name unless it is already present. Returns whether the
    /// name was inserted.
    pub fn insert(&mut self, name: String) -> bool {
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Number of distinct identities seen so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no identity has been seen.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Borrow the names in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Consume the set, yielding names in first-seen order.
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Runs the matcher over every embedding of every analyzed frame and
/// folds the hits into one [`ResultSet`].
pub struct Aggregator {
    matcher: Matcher,
    encoder: Arc<dyn FaceEncoder>,
}

impl Aggregator {
    /// Create an aggregator from its collaborators.
    pub fn new(matcher: Matcher, encoder: Arc<dyn FaceEncoder>) -> Self {
        Self { matcher, encoder }
    }

    /// Aggregate the embeddings of a single image.
    pub async fn aggregate_image(&self, embeddings: &[Embedding]) -> Result<ResultSet> {
        let mut results = ResultSet::new();
        self.fold_embeddings(embeddings, &mut results).await?;
        Ok(results)
    }

    /// Aggregate a whole video: sample frame indices, extract embeddings
    /// per sampled frame, and merge every hit into one running set.
    pub async fn aggregate_video(&self, source: &mut dyn FrameSource) -> Result<ResultSet> {
        let total = source.frame_count();
        let mut results = ResultSet::new();

        for index in sample_indices(total) {
            let frame = match source.read_frame(index) {
                Ok(Some(bytes)) => bytes,
                // Metadata over-reported the frame count; nothing left.
                Ok(None) => break,
                Err(e) => {
                    warn!("Skipping frame {index}: {e}");
                    continue;
                }
            };

            let embeddings = self.encoder.encode(&frame).await?;
            self.fold_embeddings(&embeddings, &mut results).await?;
        }

        debug!(
            "Aggregated {} identity(ies) from {total}-frame clip",
            results.len()
        );
        Ok(results)
    }

    async fn fold_embeddings(
        &self,
        embeddings: &[Embedding],
        results: &mut ResultSet,
    ) -> Result<()> {
        for embedding in embeddings {
            if let Some(name) = self.matcher.resolve(embedding).await? {
                results.insert(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use castmatch_store::{EMBEDDING_DIM, EmbeddingStore, MemoryStore};
    use pretty_assertions::assert_eq;

    use crate::error::RecognitionError;

    fn embedding_with(index: usize, value: f64) -> Embedding {
        let mut e = vec![0.0; EMBEDDING_DIM];
        e[index] = value;
        e
    }

    /// Encoder double: one byte per frame selects a canned embedding
    /// list.
    struct ScriptedEncoder {
        frames: Vec<Vec<Embedding>>,
    }

    #[async_trait]
    impl FaceEncoder for ScriptedEncoder {
        async fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>> {
            let slot = image[0] as usize;
            Ok(self.frames[slot].clone())
        }
    }

    /// Frame source double yielding one byte per frame: the frame's slot
    /// in the scripted encoder.
    struct StaticFrames {
        count: u64,
    }

    impl FrameSource for StaticFrames {
        fn frame_count(&self) -> u64 {
            self.count
        }

        fn read_frame(&mut self, index: u64) -> Result<Option<Vec<u8>>> {
            if index < self.count {
                Ok(Some(vec![index as u8]))
            } else {
                Ok(None)
            }
        }
    }

    async fn aggregator_with(
        identities: &[(&str, Embedding)],
        frames: Vec<Vec<Embedding>>,
    ) -> Aggregator {
        let store = Arc::new(MemoryStore::new());
        for (name, embedding) in identities {
            store.enroll(name, embedding).await.unwrap();
        }
        Aggregator::new(Matcher::new(store), Arc::new(ScriptedEncoder { frames }))
    }

    #[tokio::test]
    async fn image_with_no_embeddings_yields_empty_set() {
        let aggregator = aggregator_with(&[], vec![]).await;
        let results = aggregator.aggregate_image(&[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn image_match_appears_once() {
        let alice = embedding_with(0, 0.1);
        let aggregator = aggregator_with(&[("Alice", alice.clone())], vec![]).await;

        // Two faces of the same person in one photo still yield one name.
        let results = aggregator
            .aggregate_image(&[alice.clone(), alice])
            .await
            .unwrap();
        assert_eq!(results.into_names(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn unmatched_embeddings_contribute_nothing() {
        let alice = embedding_with(0, 0.1);
        let stranger = embedding_with(3, 40.0);
        let aggregator = aggregator_with(&[("Alice", alice.clone())], vec![]).await;

        let results = aggregator
            .aggregate_image(&[stranger, alice])
            .await
            .unwrap();
        assert_eq!(results.into_names(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn video_deduplicates_across_frames() {
        let alice = embedding_with(0, 0.1);
        // Frame 0 and 2 show Alice, frame 1 shows nobody.
        let frames = vec![vec![alice.clone()], vec![], vec![alice.clone()]];
        let aggregator = aggregator_with(&[("Alice", alice)], frames).await;

        let mut source = StaticFrames { count: 3 };
        let results = aggregator.aggregate_video(&mut source).await.unwrap();
        assert_eq!(results.into_names(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn video_preserves_first_seen_order() {
        let alice = embedding_with(0, 0.1);
        let bob = embedding_with(7, 0.1);
        let frames = vec![
            vec![bob.clone()],
            vec![alice.clone(), bob.clone()],
            vec![alice.clone()],
        ];
        let aggregator =
            aggregator_with(&[("Alice", alice), ("Bob", bob)], frames).await;

        let mut source = StaticFrames { count: 3 };
        let results = aggregator.aggregate_video(&mut source).await.unwrap();
        assert_eq!(results.into_names(), vec!["Bob", "Alice"]);
    }

    #[tokio::test]
    async fn video_stops_when_source_ends_early() {
        let alice = embedding_with(0, 0.1);
        let frames = vec![vec![alice.clone()]];
        let aggregator = aggregator_with(&[("Alice", alice)], frames).await;

        // Claims one hundred frames but only ever produces one.
        struct Overcounting;
        impl FrameSource for Overcounting {
            fn frame_count(&self) -> u64 {
                100
            }
            fn read_frame(&mut self, index: u64) -> Result<Option<Vec<u8>>> {
                if index == 0 { Ok(Some(vec![0])) } else { Ok(None) }
            }
        }

        let mut source = Overcounting;
        let results = aggregator.aggregate_video(&mut source).await.unwrap();
        assert_eq!(results.into_names(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn undecodable_frame_is_skipped_not_fatal() {
        let alice = embedding_with(0, 0.1);
        let aggregator = aggregator_with(
            &[("Alice", alice.clone())],
            vec![vec![], vec![alice], vec![]],
        )
        .await;

        struct FlakyFrames;
        impl FrameSource for FlakyFrames {
            fn frame_count(&self) -> u64 {
                3
            }
            fn read_frame(&mut self, index: u64) -> Result<Option<Vec<u8>>> {
                if index == 0 {
                    Err(RecognitionError::Frame("corrupt packet".to_string()))
                } else {
                    Ok(Some(vec![index as u8]))
                }
            }
        }

        let mut source = FlakyFrames;
        let results = aggregator.aggregate_video(&mut source).await.unwrap();
        assert_eq!(results.into_names(), vec!["Alice"]);
    }

    #[test]
    fn result_set_insert_reports_duplicates() {
        let mut set = ResultSet::new();
        assert!(set.insert("Alice".to_string()));
        assert!(!set.insert("Alice".to_string()));
        assert!(set.insert("Bob".to_string()));
        assert_eq!(set.names(), ["Alice", "Bob"]);
        assert_eq!(set.len(), 2);
    }
}
