//! Restores RGBA frames from composed alpha-strip frames

use crate::{Error, Result};
use alv_core::{packed_width, unpack_mask, Channels, PackMode, Raster};
use std::path::Path;
use tracing::debug;

/// Geometry of a composed frame: mask strip on the left, opaque copy on the right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    /// Width of the original frame
    pub source_width: u32,
    /// Packing mode of the mask strip, `None` when the mask is full width
    pub packed: Option<PackMode>,
}

impl StripLayout {
    pub fn unpacked(source_width: u32) -> Self {
        Self {
            source_width,
            packed: None,
        }
    }

    pub fn packed(source_width: u32, mode: PackMode) -> Self {
        Self {
            source_width,
            packed: Some(mode),
        }
    }

    /// Width of the mask strip
    pub fn mask_width(&self) -> u32 {
        match self.packed {
            Some(_) => packed_width(self.source_width),
            None => self.source_width,
        }
    }

    /// Width of the whole composed frame, `None` when it does not fit in a `u32`
    pub fn composed_width(&self) -> Option<u32> {
        self.mask_width().checked_add(self.source_width)
    }
}

/// Splits composed frames back into a BGRA raster
pub struct FrameRestorer {
    layout: StripLayout,
    unpremultiply: bool,
}

impl FrameRestorer {
    /// Creates a restorer for the given layout.
    ///
    /// The opaque copy was flattened over black, so colors are divided by
    /// alpha on restore unless [`FrameRestorer::with_unpremultiply`] turns it off.
    pub fn new(layout: StripLayout) -> Self {
        Self {
            layout,
            unpremultiply: true,
        }
    }

    pub fn with_unpremultiply(mut self, unpremultiply: bool) -> Self {
        self.unpremultiply = unpremultiply;
        self
    }

    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    /// Restores one composed frame
    pub fn restore(&self, composed: &Raster) -> Result<Raster> {
        let expected = self
            .layout
            .composed_width()
            .ok_or(Error::WidthOverflow(self.layout.source_width))?;
        if composed.width() != expected {
            return Err(Error::LayoutMismatch {
                expected,
                actual: composed.width(),
            });
        }

        let composed = composed.to_bgr();
        let source_width = self.layout.source_width;
        let mask_width = self.layout.mask_width();
        let mask = crop_columns(&composed, 0, mask_width)?;

        let alpha = match self.layout.packed {
            Some(mode) => unpack_mask(&mask, source_width, mode)?,
            None => first_channel(&mask)?,
        };

        let mut out = Raster::new(source_width, composed.height(), Channels::Bgra)?;
        let color_start = mask_width as usize * 3;

        for row in 0..composed.height() {
            let color = &composed.row(row)[color_start..];
            let alpha_row = alpha.row(row);
            let dst = out.row_mut(row);

            for ((px, bgr), &a) in dst
                .chunks_exact_mut(4)
                .zip(color.chunks_exact(3))
                .zip(alpha_row)
            {
                for k in 0..3 {
                    px[k] = if self.unpremultiply {
                        unpremultiply(bgr[k], a)
                    } else {
                        bgr[k]
                    };
                }
                px[3] = a;
            }
        }

        Ok(out)
    }

    /// Restores a composed image file and writes the RGBA result.
    ///
    /// The output format follows the file extension; use PNG to keep alpha.
    pub fn restore_file(&self, input: &Path, output: &Path) -> Result<()> {
        let composed = Raster::from_image(&image::open(input)?)?;
        let restored = self.restore(&composed)?;
        restored.to_image().save(output)?;

        debug!(input = %input.display(), output = %output.display(), "restored frame");
        Ok(())
    }
}

/// Copies `width` columns starting at `start` out of a BGR raster
fn crop_columns(raster: &Raster, start: u32, width: u32) -> Result<Raster> {
    let begin = start as usize * 3;
    let end = begin + width as usize * 3;
    let mut data = Vec::with_capacity(width as usize * raster.height() as usize * 3);
    for row in 0..raster.height() {
        data.extend_from_slice(&raster.row(row)[begin..end]);
    }
    Ok(Raster::from_raw(width, raster.height(), Channels::Bgr, data)?)
}

fn first_channel(raster: &Raster) -> Result<Raster> {
    let data = raster.as_raw().chunks_exact(3).map(|px| px[0]).collect();
    Ok(Raster::from_raw(
        raster.width(),
        raster.height(),
        Channels::Gray,
        data,
    )?)
}

fn unpremultiply(value: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    let a = u32::from(alpha);
    ((u32::from(value) * 255 + a / 2) / a).min(255) as u8
}
