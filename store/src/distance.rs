//! Split-embedding distance computation.
//!
//! Embeddings are stored as two 64-dimensional halves, and similarity is
//! the two-stage formula `sqrt(d_low^2 + d_high^2)` where each `d` is the
//! Euclidean norm of the per-half difference. The fixed match radius of
//! 0.6 was calibrated against this exact formula as evaluated by the
//! Postgres `cube` operators, so the same two-stage evaluation order is
//! kept here; do not rearrange it into a single-stage sum.

use crate::SPLIT_POINT;

/// Compute the Euclidean distance between two vectors of equal length.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Combine per-half distances into the two-stage score.
pub fn combined(low_dist: f64, high_dist: f64) -> f64 {
    (low_dist.powi(2) + high_dist.powi(2)).sqrt()
}

/// Two-stage distance between a full 128-dimensional probe and an
/// enrollee stored as split halves.
pub fn split_distance(probe: &[f64], low: &[f64], high: &[f64]) -> f64 {
    let d_low = euclidean(&probe[..SPLIT_POINT], low);
    let d_high = euclidean(&probe[SPLIT_POINT..], high);
    combined(d_low, d_high)
}
