//! Conversions between [`Raster`] and `image` buffers
//!
//! `image` stores color as R,G,B[,A]; rasters keep B,G,R[,A]. The red and blue
//! samples are swapped on every conversion.

use crate::{Channels, Raster, Result};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

impl Raster {
    /// Converts a decoded image into a raster.
    ///
    /// 8-bit grayscale stays single channel, images with an alpha channel
    /// become BGRA and everything else becomes BGR.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        match image {
            DynamicImage::ImageLuma8(gray) => {
                Raster::from_raw(width, height, Channels::Gray, gray.as_raw().clone())
            }
            img if img.color().has_alpha() => {
                let mut data = img.to_rgba8().into_raw();
                swap_red_blue(&mut data, 4);
                Raster::from_raw(width, height, Channels::Bgra, data)
            }
            img => {
                let mut data = img.to_rgb8().into_raw();
                swap_red_blue(&mut data, 3);
                Raster::from_raw(width, height, Channels::Bgr, data)
            }
        }
    }

    /// Converts the raster into an `image` buffer of the matching color type
    pub fn to_image(&self) -> DynamicImage {
        let (width, height) = (self.width(), self.height());
        let mut data = self.as_raw().to_vec();

        // The buffer length is validated on construction, so from_raw cannot fail.
        match self.channels() {
            Channels::Gray => GrayImage::from_raw(width, height, data)
                .map(DynamicImage::ImageLuma8)
                .unwrap_or_else(|| DynamicImage::new_luma8(width, height)),
            Channels::Bgr => {
                swap_red_blue(&mut data, 3);
                RgbImage::from_raw(width, height, data)
                    .map(DynamicImage::ImageRgb8)
                    .unwrap_or_else(|| DynamicImage::new_rgb8(width, height))
            }
            Channels::Bgra => {
                swap_red_blue(&mut data, 4);
                RgbaImage::from_raw(width, height, data)
                    .map(DynamicImage::ImageRgba8)
                    .unwrap_or_else(|| DynamicImage::new_rgba8(width, height))
            }
        }
    }
}

fn swap_red_blue(data: &mut [u8], channels: usize) {
    for px in data.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, Rgba};

    #[test]
    fn test_rgb_image_becomes_bgr() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([10, 20, 30])));
        let raster = Raster::from_image(&img).unwrap();

        assert_eq!(raster.channels(), Channels::Bgr);
        assert_eq!(raster.pixel(0, 1), &[30, 20, 10]);
        assert_eq!(raster.to_image().to_rgb8().get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_rgba_image_keeps_alpha_last() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4])));
        let raster = Raster::from_image(&img).unwrap();

        assert_eq!(raster.channels(), Channels::Bgra);
        assert_eq!(raster.pixel(0, 0), &[3, 2, 1, 4]);
    }

    #[test]
    fn test_gray_image_stays_single_channel() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([77])));
        let raster = Raster::from_image(&img).unwrap();

        assert_eq!(raster.channels(), Channels::Gray);
        assert_eq!(raster.as_raw(), &[77; 6]);
        assert!(matches!(raster.to_image(), DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let img = DynamicImage::new_rgb8(0, 0);
        assert!(Raster::from_image(&img).is_err());
    }
}
