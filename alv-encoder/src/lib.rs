//! ALV Encoder Library
//!
//! This library turns a directory of RGBA frames (or a video) into an H.264
//! video whose alpha channel is carried as a visible luminance strip next to
//! the opaque picture.

pub mod bridge;
pub mod command;
pub mod ffmpeg;
pub mod image_editor;
pub mod magick;
pub mod pipeline;
pub mod progress_tracker;
pub mod raster_io;
pub mod run_context;
pub mod tools;

pub use alv_core::PackMode;
pub use image_editor::BuiltinEditor;
pub use magick::MagickEditor;
pub use pipeline::{FrameFailure, FramePipeline, RunSummary};
pub use run_context::RunContext;
pub use tools::{ChannelEditor, EditOp, EncodeRequest, ExtractRequest, FrameEncoder, FrameExtractor};

use std::path::PathBuf;

/// Result type for alv-encoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alv-encoder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ALV core error: {0}")]
    Core(#[from] alv_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No frames found in {0}")]
    EmptyInput(PathBuf),

    #[error("{tool} exited with {}: {stderr}", describe_status(.status))]
    ExternalTool {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{0} was not found on PATH")]
    ToolNotFound(String),

    #[error("Expected output file is missing: {0}")]
    MissingOutput(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("All {0} frames failed, no video was produced")]
    AllFramesFailed(usize),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output frame rate, also used when extracting frames from a video
    pub fps: u32,
    /// Constant video bitrate in kbps
    pub bitrate_kbps: u32,
    /// Packs the alpha mask to a third of its width when set
    pub pack: Option<PackMode>,
    /// Frames processed concurrently (0 = one per CPU)
    pub workers: usize,
    /// Recognized frame file extensions, compared case-insensitively
    pub extensions: Vec<String>,
}

impl PipelineConfig {
    /// Resolves the configured worker count
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Checks whether `name` carries one of the recognized extensions
    pub fn accepts(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: 25,
            bitrate_kbps: 2000,
            pack: None,
            workers: 1,
            extensions: vec!["png".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.fps, 25);
        assert_eq!(config.bitrate_kbps, 2000);
        assert_eq!(config.pack, None);
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let config = PipelineConfig::default();
        assert!(config.accepts("frame1.png"));
        assert!(config.accepts("FRAME1.PNG"));
        assert!(!config.accepts(".DS_Store"));
        assert!(!config.accepts("notes.txt"));
        assert!(!config.accepts("png"));
    }

    #[test]
    fn test_zero_workers_means_all_cpus() {
        let config = PipelineConfig {
            workers: 0,
            ..PipelineConfig::default()
        };
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_external_tool_error_message() {
        let err = Error::ExternalTool {
            tool: "ffmpeg".into(),
            status: Some(1),
            stderr: "bad input".into(),
        };
        assert_eq!(err.to_string(), "ffmpeg exited with status 1: bad input");
    }
}
