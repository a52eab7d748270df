//! ffmpeg-backed frame extraction and encoding
//!
//! The system `ffmpeg` binary is spawned for every request, so no native
//! FFmpeg libraries are needed at build time.

use crate::command::{self, ToolCommand};
use crate::tools::{EncodeRequest, ExtractRequest, FrameEncoder, FrameExtractor};
use crate::Result;

const FFMPEG: &str = "ffmpeg";

/// Checks whether `ffmpeg` is installed and on PATH
pub fn is_available() -> bool {
    command::is_on_path(FFMPEG)
}

/// Common leading arguments: overwrite outputs, only report errors
fn ffmpeg() -> ToolCommand {
    ToolCommand::new(FFMPEG).args(["-y", "-v", "error"])
}

/// Extracts frames with `ffmpeg -i <video> -r <fps> <pattern>`
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegExtractor;

impl FfmpegExtractor {
    pub fn command(request: &ExtractRequest) -> ToolCommand {
        ffmpeg()
            .arg("-i")
            .arg(&request.input)
            .arg("-r")
            .arg(request.fps.to_string())
            .arg(&request.output_pattern)
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(&self, request: &ExtractRequest) -> Result<()> {
        Self::command(request).run()
    }
}

/// Encodes frames with a constant bitrate
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    pub fn command(request: &EncodeRequest) -> ToolCommand {
        ffmpeg()
            .arg("-r")
            .arg(request.fps.to_string())
            .arg("-i")
            .arg(&request.input_pattern)
            .args(["-c:v", request.codec.as_str()])
            .args(["-pix_fmt", request.pixel_format.as_str()])
            .arg("-b:v")
            .arg(format!("{}k", request.bitrate_kbps))
            .arg(&request.output)
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<()> {
        Self::command(request).run()
    }
}
