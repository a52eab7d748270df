//! Conversion between videos and numbered frame sequences

use crate::tools::{EncodeRequest, ExtractRequest, FrameEncoder, FrameExtractor};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Video codec of every encoded output
pub const VIDEO_CODEC: &str = "libx264";

/// Pixel format of every encoded output (4:2:0)
pub const PIXEL_FORMAT: &str = "yuv420p";

/// Extracts `video` into `target_dir` as `<prefix>00000.png`, `<prefix>00001.png`, ...
pub fn video_to_frames(
    extractor: &impl FrameExtractor,
    video: &Path,
    target_dir: &Path,
    prefix: Option<&str>,
    fps: u32,
) -> Result<()> {
    let pattern = format!("{}%05d.png", prefix.unwrap_or_default());
    let request = ExtractRequest {
        input: video.to_path_buf(),
        fps,
        output_pattern: target_dir.join(pattern),
    };

    info!(video = %video.display(), fps, "extracting frames");
    extractor.extract(&request)
}

/// Encodes the frames matching `pattern` in `frame_dir` into `output` as H.264
/// with a constant bitrate, then checks that the video was written.
///
/// A video already at `output` is deleted first, so the check only passes on
/// a file written by this encode.
pub fn frames_to_video(
    encoder: &impl FrameEncoder,
    frame_dir: &Path,
    pattern: &str,
    fps: u32,
    bitrate_kbps: u32,
    output: &Path,
) -> Result<()> {
    let request = EncodeRequest {
        input_pattern: frame_dir.join(pattern),
        fps,
        bitrate_kbps,
        codec: VIDEO_CODEC.to_string(),
        pixel_format: PIXEL_FORMAT.to_string(),
        output: output.to_path_buf(),
    };

    match std::fs::remove_file(output) {
        Ok(()) => debug!(output = %output.display(), "removed previous video"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    info!(output = %output.display(), fps, bitrate_kbps, "encoding video");
    encoder.encode(&request)?;

    if !output.is_file() {
        return Err(Error::MissingOutput(output.to_path_buf()));
    }
    Ok(())
}
