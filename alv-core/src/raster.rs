//! Raster data structures for ALV

use crate::{Error, Result};

/// Channel layout of a raster, in the fixed B,G,R[,A] order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Single grayscale channel
    Gray,
    /// Blue, green, red
    Bgr,
    /// Blue, green, red, alpha
    Bgra,
}

impl Channels {
    /// Number of samples per pixel
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Bgr => 3,
            Channels::Bgra => 4,
        }
    }
}

/// An 8-bit raster stored row-major with interleaved channels.
///
/// The shape is `(height, width, channels)`; both dimensions are always
/// positive and the buffer always holds exactly `height * width * channels`
/// samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl Raster {
    /// Creates a zero-filled raster
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        Self::filled(width, height, channels, 0)
    }

    /// Creates a raster with every sample set to `value`
    pub fn filled(width: u32, height: u32, channels: Channels, value: u8) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = width as usize * height as usize * channels.count();
        Ok(Self {
            width,
            height,
            channels,
            data: vec![value; len],
        })
    }

    /// Wraps an existing sample buffer
    pub fn from_raw(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Gets the raster width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the raster height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Gets the channel layout
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of bytes in one row
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels.count()
    }

    /// Returns the samples of one row
    pub fn row(&self, row: u32) -> &[u8] {
        let stride = self.stride();
        let start = row as usize * stride;
        &self.data[start..start + stride]
    }

    /// Returns the samples of one row, mutably
    pub fn row_mut(&mut self, row: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = row as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Returns all samples of the pixel at `(row, col)`
    pub fn pixel(&self, row: u32, col: u32) -> &[u8] {
        let offset = self.offset(row, col);
        &self.data[offset..offset + self.channels.count()]
    }

    /// Reads one sample
    pub fn get(&self, row: u32, col: u32, channel: usize) -> u8 {
        self.data[self.offset(row, col) + channel]
    }

    /// Writes one sample
    pub fn set(&mut self, row: u32, col: u32, channel: usize, value: u8) {
        let offset = self.offset(row, col) + channel;
        self.data[offset] = value;
    }

    /// Borrows the raw sample buffer
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the raster and returns its sample buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns a 3-channel copy: gray samples are replicated, alpha is dropped
    pub fn to_bgr(&self) -> Raster {
        let data = match self.channels {
            Channels::Bgr => self.data.clone(),
            Channels::Gray => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            Channels::Bgra => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        };

        Raster {
            width: self.width,
            height: self.height,
            channels: Channels::Bgr,
            data,
        }
    }

    fn offset(&self, row: u32, col: u32) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row as usize * self.stride() + col as usize * self.channels.count()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            Raster::new(0, 4, Channels::Bgr),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(Raster::new(4, 0, Channels::Gray).is_err());
    }

    #[test]
    fn test_from_raw_checks_length() {
        let err = Raster::from_raw(2, 2, Channels::Bgra, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_pixel_addressing() {
        let data: Vec<u8> = (0..18).collect();
        let raster = Raster::from_raw(3, 2, Channels::Bgr, data).unwrap();

        assert_eq!(raster.stride(), 9);
        assert_eq!(raster.pixel(1, 2), &[15, 16, 17]);
        assert_eq!(raster.get(0, 1, 2), 5);
        assert_eq!(raster.row(1)[0], 9);
    }

    #[test]
    fn test_set_writes_single_sample() {
        let mut raster = Raster::new(2, 2, Channels::Gray).unwrap();
        raster.set(1, 0, 0, 200);

        assert_eq!(raster.as_raw(), &[0, 0, 200, 0]);
    }

    #[test]
    fn test_to_bgr_expands_gray_and_drops_alpha() {
        let gray = Raster::from_raw(2, 1, Channels::Gray, vec![10, 20]).unwrap();
        assert_eq!(gray.to_bgr().as_raw(), &[10, 10, 10, 20, 20, 20]);

        let bgra = Raster::from_raw(1, 1, Channels::Bgra, vec![1, 2, 3, 4]).unwrap();
        let bgr = bgra.to_bgr();
        assert_eq!(bgr.channels(), Channels::Bgr);
        assert_eq!(bgr.as_raw(), &[1, 2, 3]);
    }
}
