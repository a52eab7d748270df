//! ALV Core Library
//!
//! This library provides the raster model, the natural frame ordering and the
//! alpha mask packing kernel used by ALV (Alpha-to-Luma Video).

#[cfg(feature = "image")]
mod convert;
pub mod pack;
pub mod raster;
pub mod sequence;

pub use pack::{pack_mask, packed_width, unpack_mask, PackMode, UNRECOVERABLE_ALPHA};
pub use raster::{Channels, Raster};
pub use sequence::{natural_cmp, natural_sort};

/// Result type for alv-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for alv-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Raster buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported channel layout: expected {expected} channels, got {actual}")]
    UnsupportedChannels { expected: usize, actual: usize },

    #[error("Mask is too narrow to pack: width {0} is below 3 pixels")]
    MaskTooNarrow(u32),

    #[error("Packed mask width {packed} does not match original width {original}")]
    WidthMismatch { packed: u32, original: u32 },
}
