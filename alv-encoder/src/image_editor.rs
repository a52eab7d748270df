//! In-process channel editor built on the `image` crate
//!
//! Produces the same artifacts as the ImageMagick editor without spawning a
//! process: an opaque copy flattened over black, the alpha channel as a
//! 3-channel gray image, and horizontal appends padded with black.

use crate::tools::{ChannelEditor, EditOp};
use crate::{Error, Result};
use image::{imageops, DynamicImage, Rgb, RgbImage};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEditor;

impl ChannelEditor for BuiltinEditor {
    fn apply(&self, op: &EditOp) -> Result<()> {
        match op {
            EditOp::RemoveAlpha { input, output } => {
                let rgba = open(input)?.to_rgba8();
                let opaque = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let [r, g, b, a] = rgba.get_pixel(x, y).0;
                    Rgb([over_black(r, a), over_black(g, a), over_black(b, a)])
                });
                opaque.save(output)?;
            }
            EditOp::SeparateAlpha { input, output } => {
                let rgba = open(input)?.to_rgba8();
                let alpha = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let a = rgba.get_pixel(x, y).0[3];
                    Rgb([a, a, a])
                });
                alpha.save(output)?;
            }
            EditOp::Append {
                left,
                right,
                output,
            } => {
                let left = open(left)?.to_rgb8();
                let right = open(right)?.to_rgb8();
                let mut canvas = RgbImage::new(
                    left.width() + right.width(),
                    left.height().max(right.height()),
                );
                imageops::replace(&mut canvas, &left, 0, 0);
                imageops::replace(&mut canvas, &right, i64::from(left.width()), 0);
                canvas.save(output)?;
            }
        }
        Ok(())
    }
}

fn open(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Straight-alpha sample composited over black
fn over_black(value: u8, alpha: u8) -> u8 {
    ((u32::from(value) * u32::from(alpha) + 127) / 255) as u8
}
