//! ALV Decoder Library
//!
//! This library restores RGBA frames from composed frames, where the alpha
//! mask sits to the left of the opaque picture.

pub mod frame_restorer;

pub use frame_restorer::{FrameRestorer, StripLayout};

/// Result type for alv-decoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alv-decoder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ALV core error: {0}")]
    Core(#[from] alv_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Composed frame is {actual} pixels wide, layout expects {expected}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error("Source width {0} is too large for a composed frame")]
    WidthOverflow(u32),
}
