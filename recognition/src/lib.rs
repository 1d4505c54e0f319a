//! # Recognition
//!
//! This crate turns face embeddings into identity names and folds
//! per-frame evidence into a single result for a whole request.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     Recognition Pipeline                       │
//! ├────────────────────────────────────────────────────────────────┤
//! │  FaceEncoder ──► Embeddings ──► Matcher ──► Aggregator         │
//! │      │                            │             │              │
//! │      ▼                            ▼             ▼              │
//! │  extractor sidecar         EmbeddingStore    ResultSet         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Face detection and embedding extraction are external capabilities
//! behind [`FaceEncoder`]; video decoding is external behind
//! [`FrameSource`]. Both seams accept test doubles, so the matching core
//! is testable with synthetic embeddings.

pub mod aggregator;
pub mod encoder;
pub mod error;
pub mod frames;
pub mod matcher;
pub mod sampler;

pub use aggregator::{Aggregator, ResultSet};
pub use encoder::{FaceEncoder, HttpFaceEncoder};
pub use error::{RecognitionError, Result};
pub use frames::FrameSource;
pub use matcher::Matcher;
pub use sampler::sample_indices;

/// Fixed similarity radius for identity matching, calibrated against the
/// two-stage split distance. Do not retune without re-measuring.
pub const MATCH_RADIUS: f64 = 0.6;
