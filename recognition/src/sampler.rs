//! Deterministic frame sampling.
//!
//! Sampling a fixed fraction of frame positions yields roughly 6-7
//! analyzed frames regardless of clip length, trading recall for a
//! per-request cost that stays constant as videos grow.

/// Fraction of the total frame count used as the sampling step.
pub const SAMPLE_RATIO: f64 = 0.15;

/// Select the frame indices to analyze for a clip of `total_frames`.
///
/// Step size is `floor(total_frames * 0.15)`, clamped to at least 1 so a
/// short clip can never produce a zero step and loop forever.
pub fn sample_indices(total_frames: u64) -> Vec<u64> {
    if total_frames == 0 {
        return Vec::new();
    }

    let step = ((total_frames as f64 * SAMPLE_RATIO).floor() as u64).max(1);
    (0..total_frames).step_by(step as usize).collect()
}
