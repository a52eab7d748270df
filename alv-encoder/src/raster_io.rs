//! Reading and writing rasters through the `image` crate

use crate::{Error, Result};
use alv_core::Raster;
use std::path::Path;

/// Decodes an image file into a raster
pub fn read_raster(path: &Path) -> Result<Raster> {
    let image = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Raster::from_image(&image)?)
}

/// Decodes a mask file as a 3-channel raster.
///
/// Grayscale masks are replicated across the three channels, which is the
/// layout the packer expects.
pub fn read_mask(path: &Path) -> Result<Raster> {
    Ok(read_raster(path)?.to_bgr())
}

/// Encodes a raster, choosing the format from the file extension
pub fn write_raster(path: &Path, raster: &Raster) -> Result<()> {
    raster.to_image().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alv_core::Channels;
    use image::{GrayImage, Luma};

    #[test]
    fn test_gray_mask_is_read_as_bgr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        GrayImage::from_pixel(4, 2, Luma([90])).save(&path).unwrap();

        let mask = read_mask(&path).unwrap();
        assert_eq!(mask.channels(), Channels::Bgr);
        assert_eq!((mask.width(), mask.height()), (4, 2));
        assert!(mask.as_raw().iter().all(|&v| v == 90));
    }

    #[test]
    fn test_write_then_read_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raster.png");
        let raster = Raster::from_raw(2, 1, Channels::Bgr, vec![1, 2, 3, 4, 5, 6]).unwrap();

        write_raster(&path, &raster).unwrap();
        assert_eq!(read_raster(&path).unwrap(), raster);
    }

    #[test]
    fn test_corrupt_file_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(read_raster(&path), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_missing_file_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_mask(&dir.path().join("absent.png")),
            Err(Error::Decode { .. })
        ));
    }
}
