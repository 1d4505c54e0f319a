//! # Enrichment
//!
//! This crate expands matched identity names into profile records using
//! an external person directory: a text search resolves the name to a
//! directory entry, a second call fetches the biography, and both are
//! merged into one [`ProfileRecord`].
//!
//! Partial failure is deliberate policy: a name the directory cannot
//! resolve is skipped with a server-side warning and never blocks
//! enrichment of the other names in the batch.

pub mod client;
pub mod error;

pub use client::{PersonDirectory, ProfileRecord};
pub use error::{EnrichError, Result};
