//! Video frame boundary.

use crate::error::Result;

/// Yields encoded image bytes for individual frames of a video-like
/// input.
///
/// Implementations handle container and codec details; the aggregation
/// core only sees frame counts and image bytes. Frames are requested in
/// ascending index order within one pass, which lets sequential decoders
/// avoid seeking.
pub trait FrameSource: Send {
    /// Total number of frames in the input. May be an estimate from
    /// container metadata; [`FrameSource::read_frame`] returning `None`
    /// is the authoritative end of stream.
    fn frame_count(&self) -> u64;

    /// Produce the frame at `index` as encoded image bytes, or `None`
    /// when the index is past the end of the stream.
    fn read_frame(&mut self, index: u64) -> Result<Option<Vec<u8>>>;
}
