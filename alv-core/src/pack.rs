//! Alpha mask packing
//!
//! A mask raster carries its alpha value in channel 0 of every pixel. Packing
//! stores three alpha samples in the three channels of one output pixel, so
//! the packed mask is one third of the source width with the same height.
//!
//! When the source width is not a multiple of 3, the trailing `width % 3`
//! columns are dropped by the packer and cannot be recovered by the unpacker;
//! those columns are restored as [`UNRECOVERABLE_ALPHA`].

use crate::{Channels, Error, Raster, Result};

/// Alpha value written to columns that a packed mask cannot represent
pub const UNRECOVERABLE_ALPHA: u8 = 255;

/// Spatial arrangement of the three alpha samples held by one packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackMode {
    /// Three horizontally adjacent columns: `(r, c)[k] = src(r, 3c + k)`
    Linear,
    /// Three side-by-side bands of `width / 3` columns: `(r, c)[k] = src(r, c + k * width_out)`
    #[default]
    Tiled,
}

impl PackMode {
    /// Column of the source sample stored in channel `k` of packed column `col`
    #[inline]
    fn source_column(self, col: usize, k: usize, packed_width: usize) -> usize {
        match self {
            PackMode::Linear => col * 3 + k,
            PackMode::Tiled => col + k * packed_width,
        }
    }
}

/// Width of the packed mask for a source of `width` pixels
pub fn packed_width(width: u32) -> u32 {
    width / 3
}

/// Packs a 3-channel alpha raster into a one-third-width mask.
///
/// Only channel 0 of the source is read.
pub fn pack_mask(alpha: &Raster, mode: PackMode) -> Result<Raster> {
    if alpha.channels() != Channels::Bgr {
        return Err(Error::UnsupportedChannels {
            expected: Channels::Bgr.count(),
            actual: alpha.channels().count(),
        });
    }

    let out_width = packed_width(alpha.width());
    if out_width == 0 {
        return Err(Error::MaskTooNarrow(alpha.width()));
    }

    let mut packed = Raster::new(out_width, alpha.height(), Channels::Bgr)?;
    let pw = out_width as usize;

    for row in 0..alpha.height() {
        let src = alpha.row(row);
        let dst = packed.row_mut(row);
        for (col, px) in dst.chunks_exact_mut(3).enumerate() {
            for (k, sample) in px.iter_mut().enumerate() {
                *sample = src[mode.source_column(col, k, pw) * 3];
            }
        }
    }

    Ok(packed)
}

/// Reconstructs a single-channel alpha raster of `original_width` columns from
/// a packed mask.
pub fn unpack_mask(packed: &Raster, original_width: u32, mode: PackMode) -> Result<Raster> {
    if packed.channels() != Channels::Bgr {
        return Err(Error::UnsupportedChannels {
            expected: Channels::Bgr.count(),
            actual: packed.channels().count(),
        });
    }

    if packed_width(original_width) != packed.width() {
        return Err(Error::WidthMismatch {
            packed: packed.width(),
            original: original_width,
        });
    }

    let mut alpha = Raster::filled(
        original_width,
        packed.height(),
        Channels::Gray,
        UNRECOVERABLE_ALPHA,
    )?;
    let pw = packed.width() as usize;

    for row in 0..packed.height() {
        let src = packed.row(row);
        let dst = alpha.row_mut(row);
        for (col, px) in src.chunks_exact(3).enumerate() {
            for (k, &sample) in px.iter().enumerate() {
                dst[mode.source_column(col, k, pw)] = sample;
            }
        }
    }

    Ok(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a 3-channel mask whose channel 0 holds a distinct value per
    /// position and whose other channels hold noise the packer must ignore.
    fn mask(width: u32, height: u32) -> Raster {
        let mut raster = Raster::new(width, height, Channels::Bgr).unwrap();
        for row in 0..height {
            for col in 0..width {
                raster.set(row, col, 0, (row * width + col) as u8);
                raster.set(row, col, 1, 7);
                raster.set(row, col, 2, 9);
            }
        }
        raster
    }

    fn channel0(raster: &Raster) -> Raster {
        let data = raster.as_raw().chunks_exact(3).map(|px| px[0]).collect();
        Raster::from_raw(raster.width(), raster.height(), Channels::Gray, data).unwrap()
    }

    #[test]
    fn test_linear_mapping() {
        let src = mask(6, 1);
        let packed = pack_mask(&src, PackMode::Linear).unwrap();

        assert_eq!(packed.width(), 2);
        assert_eq!(packed.as_raw(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_tiled_mapping() {
        let src = mask(6, 1);
        let packed = pack_mask(&src, PackMode::Tiled).unwrap();

        assert_eq!(packed.width(), 2);
        assert_eq!(packed.as_raw(), &[0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_roundtrip_is_lossless_for_width_multiple_of_three() {
        for mode in [PackMode::Linear, PackMode::Tiled] {
            let src = mask(9, 4);
            let packed = pack_mask(&src, mode).unwrap();
            let restored = unpack_mask(&packed, 9, mode).unwrap();

            assert_eq!(restored, channel0(&src), "mode {mode:?}");
        }
    }

    #[test]
    fn test_trailing_columns_are_dropped() {
        let src = mask(100, 2);
        let packed = pack_mask(&src, PackMode::Tiled).unwrap();
        assert_eq!(packed.width(), 33);
        assert_eq!(packed.height(), 2);

        let restored = unpack_mask(&packed, 100, PackMode::Tiled).unwrap();
        let expected = channel0(&src);
        for row in 0..2 {
            assert_eq!(restored.row(row)[..99], expected.row(row)[..99]);
            assert_eq!(restored.get(row, 99, 0), UNRECOVERABLE_ALPHA);
        }
    }

    #[test]
    fn test_linear_trailing_columns_filled() {
        let src = mask(8, 1);
        let packed = pack_mask(&src, PackMode::Linear).unwrap();
        let restored = unpack_mask(&packed, 8, PackMode::Linear).unwrap();

        assert_eq!(restored.as_raw(), &[0, 1, 2, 3, 4, 5, 255, 255]);
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        let gray = Raster::new(9, 1, Channels::Gray).unwrap();
        assert!(matches!(
            pack_mask(&gray, PackMode::Linear),
            Err(Error::UnsupportedChannels {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_rejects_too_narrow_mask() {
        let narrow = Raster::new(2, 5, Channels::Bgr).unwrap();
        assert!(matches!(
            pack_mask(&narrow, PackMode::Tiled),
            Err(Error::MaskTooNarrow(2))
        ));
    }

    #[test]
    fn test_unpack_rejects_width_mismatch() {
        let packed = Raster::new(4, 1, Channels::Bgr).unwrap();
        assert!(matches!(
            unpack_mask(&packed, 9, PackMode::Linear),
            Err(Error::WidthMismatch {
                packed: 4,
                original: 9
            })
        ));
    }
}
