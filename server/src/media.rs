//! Upload validation and video frame extraction.
//!
//! The ffmpeg-backed [`VideoClip`] adapts libavformat/libavcodec to the
//! recognition crate's [`FrameSource`] boundary: frames are decoded
//! sequentially, scaled to RGB, and re-encoded as JPEG bytes for the
//! extractor sidecar.

use std::path::Path;

use castmatch_recognition::{FrameSource, RecognitionError};
use ffmpeg_next::format::context::Input;
use ffmpeg_next::util::frame::video::Video;
use tracing::debug;

/// Image upload extensions accepted by the enrollment and photo routes.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Video upload extensions accepted by the video route.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "gif"];

/// Case-insensitive check of a filename's final extension.
pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| allowed.contains(&ext.to_lowercase().as_str()))
}

/// Sequential video decoder implementing [`FrameSource`].
pub struct VideoClip {
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    total_frames: u64,
    next_index: u64,
    width: u32,
    height: u32,
    flushing: bool,
}

// SAFETY: the ffmpeg contexts inside hold raw pointers, which keeps the
// struct from deriving `Send`, but nothing here is thread-affine: the
// clip is only ever driven through `&mut self` from one thread at a
// time, so moving it between threads is sound.
unsafe impl Send for VideoClip {}

impl VideoClip {
    /// Open a video file and prepare its best video stream for decoding.
    pub fn open(path: &Path) -> Result<Self, RecognitionError> {
        ffmpeg_next::init().map_err(frame_err)?;

        let ictx = ffmpeg_next::format::input(path).map_err(frame_err)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| RecognitionError::Frame("no video stream found".to_string()))?;
        let stream_index = stream.index();

        // Container metadata; when absent, estimate from duration and
        // frame rate. read_frame returning None remains authoritative.
        let total_frames = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let time_base = stream.time_base();
            let rate = stream.avg_frame_rate();
            let seconds = if time_base.denominator() != 0 {
                stream.duration() as f64 * time_base.numerator() as f64
                    / time_base.denominator() as f64
            } else {
                0.0
            };
            let fps = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };
            (seconds * fps).max(0.0) as u64
        };

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                .map_err(frame_err)?;
        let decoder = codec_ctx.decoder().video().map_err(frame_err)?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(frame_err)?;

        debug!("Opened clip: {width}x{height}, ~{total_frames} frames");
        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            total_frames,
            next_index: 0,
            width,
            height,
            flushing: false,
        })
    }

    /// Decode the next frame in stream order, or `None` at end of
    /// stream.
    fn next_decoded(&mut self) -> Result<Option<Video>, RecognitionError> {
        loop {
            let mut decoded = Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }

            if self.flushing {
                return Ok(None);
            }

            match self.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    // A packet the decoder rejects is dropped; the next
                    // keyframe resynchronizes.
                    let _ = self.decoder.send_packet(&packet);
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
            }
        }
    }

    fn encode_jpeg(&mut self, decoded: &Video) -> Result<Vec<u8>, RecognitionError> {
        let mut rgb = Video::empty();
        self.scaler.run(decoded, &mut rgb).map_err(frame_err)?;

        // The scaler output rows may be padded; copy row by row.
        let stride = rgb.stride(0);
        let data = rgb.data(0);
        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + w * 3]);
        }

        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
            .encode(
                &pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(frame_err)?;
        Ok(jpeg)
    }
}

impl FrameSource for VideoClip {
    fn frame_count(&self) -> u64 {
        self.total_frames
    }

    fn read_frame(&mut self, index: u64) -> castmatch_recognition::Result<Option<Vec<u8>>> {
        debug_assert!(
            index >= self.next_index,
            "frames must be requested in ascending order"
        );

        while self.next_index <= index {
            let Some(decoded) = self.next_decoded()? else {
                return Ok(None);
            };
            self.next_index += 1;

            if self.next_index == index + 1 {
                return Ok(Some(self.encode_jpeg(&decoded)?));
            }
        }

        Ok(None)
    }
}

fn frame_err(e: impl std::fmt::Display) -> RecognitionError {
    RecognitionError::Frame(e.to_string())
}
