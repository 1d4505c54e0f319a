//! # Embedding Store
//!
//! This crate persists named face identities and answers radius-bounded
//! nearest-neighbor queries over their embeddings.
//!
//! Each identity is a unique human-readable name plus one 128-dimensional
//! embedding, split for storage into two 64-dimensional halves. Similarity
//! between a probe and an enrollee is the two-stage distance
//! `sqrt(d_low^2 + d_high^2)` over the halves, defined in [`distance`].
//!
//! Two [`EmbeddingStore`] implementations are provided:
//!
//! - [`PgEmbeddingStore`]: Postgres with the `cube` extension, the
//!   production backend
//! - [`MemoryStore`]: in-memory catalog for tests and local runs

pub mod distance;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgEmbeddingStore;
pub use store::{EmbeddingStore, MatchCandidate};

/// A dense face embedding.
pub type Embedding = Vec<f64>;

/// Dimension of face embeddings.
pub const EMBEDDING_DIM: usize = 128;

/// Index at which an embedding is split into its low and high halves.
pub const SPLIT_POINT: usize = 64;

/// Maximum length of an identity name.
pub const MAX_NAME_LEN: usize = 50;
