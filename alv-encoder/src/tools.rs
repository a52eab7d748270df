//! Capabilities of the external tools the pipeline drives
//!
//! Each collaborator exposes a single method taking a request value, so the
//! pipeline can run against ffmpeg and ImageMagick processes, the in-process
//! editor, or test fakes.

use crate::Result;
use std::path::{Path, PathBuf};

/// Splits a video into a numbered frame sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Source video
    pub input: PathBuf,
    /// Sampling frame rate
    pub fps: u32,
    /// Output path containing a `%05d` placeholder
    pub output_pattern: PathBuf,
}

/// Encodes a numbered frame sequence into a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    /// Input path containing a `%05d` placeholder
    pub input_pattern: PathBuf,
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub codec: String,
    pub pixel_format: String,
    pub output: PathBuf,
}

/// One channel editing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Flattens the image over black, producing an opaque copy
    RemoveAlpha { input: PathBuf, output: PathBuf },
    /// Writes the alpha channel as a grayscale image
    SeparateAlpha { input: PathBuf, output: PathBuf },
    /// Appends `right` to the right edge of `left`
    Append {
        left: PathBuf,
        right: PathBuf,
        output: PathBuf,
    },
}

impl EditOp {
    /// File the operation is expected to produce
    pub fn output(&self) -> &Path {
        match self {
            EditOp::RemoveAlpha { output, .. }
            | EditOp::SeparateAlpha { output, .. }
            | EditOp::Append { output, .. } => output,
        }
    }

    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::RemoveAlpha { .. } => "remove-alpha",
            EditOp::SeparateAlpha { .. } => "separate-alpha",
            EditOp::Append { .. } => "append",
        }
    }
}

/// Turns a video into frames
pub trait FrameExtractor: Send + Sync {
    fn extract(&self, request: &ExtractRequest) -> Result<()>;
}

/// Strips, isolates and joins image channels
pub trait ChannelEditor: Send + Sync {
    fn apply(&self, op: &EditOp) -> Result<()>;
}

/// Turns frames into a video
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, request: &EncodeRequest) -> Result<()>;
}

impl<T: FrameExtractor + ?Sized> FrameExtractor for &T {
    fn extract(&self, request: &ExtractRequest) -> Result<()> {
        (**self).extract(request)
    }
}

impl<T: ChannelEditor + ?Sized> ChannelEditor for &T {
    fn apply(&self, op: &EditOp) -> Result<()> {
        (**self).apply(op)
    }
}

impl<T: FrameEncoder + ?Sized> FrameEncoder for &T {
    fn encode(&self, request: &EncodeRequest) -> Result<()> {
        (**self).encode(request)
    }
}
