//! In-memory grayscale raster.
//!
//! A `RasterImage` is a row-major grid of luminance bytes with origin at
//! the top-left. It is the unit the coordinator owns before distribution
//! and after gather; workers only ever see row bands cut from it.
//!
//! # Ownership
//!
//! A raster is exclusively owned by one group member at a time. All
//! movement across the group happens by value (the transport copies
//! bytes), never by shared reference.

use crate::error::{RasterError, Result};

/// Grayscale image: `width * height` luminance bytes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a zero-filled raster.
    ///
    /// # Errors
    /// - `RasterError::EmptyDimensions` if width or height is zero
    /// - `RasterError::Oversize` if `width * height` overflows
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = checked_pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    /// Create a raster from an existing pixel buffer.
    ///
    /// # Errors
    /// Dimension errors as in [`RasterImage::new`], plus
    /// `RasterError::PixelCountMismatch` if the buffer length is not
    /// `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let len = checked_pixel_count(width, height)?;
        if pixels.len() != len {
            return Err(RasterError::PixelCountMismatch {
                expected: len,
                actual: pixels.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Full pixel buffer, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One row of pixels.
    ///
    /// # Panics
    /// Panics if `y >= height`. Row access is only used with indices
    /// derived from the raster's own dimensions.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Copy `count` rows starting at `start` into a fresh buffer.
    ///
    /// This is how bands are cut out of the raster: the result is an
    /// independent value with no ties to the source.
    ///
    /// # Errors
    /// `RasterError::RowsOutOfBounds` if the range exceeds the height.
    pub fn copy_rows(&self, start: usize, count: usize) -> Result<Vec<u8>> {
        let end = start
            .checked_add(count)
            .ok_or(RasterError::RowsOutOfBounds {
                start,
                end: usize::MAX,
                height: self.height,
            })?;
        if end > self.height {
            return Err(RasterError::RowsOutOfBounds {
                start,
                end,
                height: self.height,
            }
            .into());
        }
        Ok(self.pixels[start * self.width..end * self.width].to_vec())
    }

    /// Overwrite rows starting at `start` with `data`.
    ///
    /// Used by the coordinator to splice processed bands back into the
    /// image in place.
    ///
    /// # Errors
    /// - `RasterError::RaggedRows` if `data` is not a whole number of rows
    /// - `RasterError::RowsOutOfBounds` if the rows exceed the height
    pub fn write_rows(&mut self, start: usize, data: &[u8]) -> Result<()> {
        if data.len() % self.width != 0 {
            return Err(RasterError::RaggedRows {
                len: data.len(),
                width: self.width,
            }
            .into());
        }
        let count = data.len() / self.width;
        let end = start
            .checked_add(count)
            .ok_or(RasterError::RowsOutOfBounds {
                start,
                end: usize::MAX,
                height: self.height,
            })?;
        if end > self.height {
            return Err(RasterError::RowsOutOfBounds {
                start,
                end,
                height: self.height,
            }
            .into());
        }
        self.pixels[start * self.width..end * self.width].copy_from_slice(data);
        Ok(())
    }
}

/// Validate dimensions and compute the pixel count.
fn checked_pixel_count(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyDimensions { width, height }.into());
    }
    width
        .checked_mul(height)
        .ok_or_else(|| RasterError::Oversize { width, height }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_new_zeroed() {
        let raster = RasterImage::new(4, 3).unwrap();
        assert_eq!(raster.width(), 4);
        assert_eq!(raster.height(), 3);
        assert_eq!(raster.pixels().len(), 12);
        assert!(raster.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            RasterImage::new(0, 10),
            Err(Error::Raster(RasterError::EmptyDimensions { .. }))
        ));
        assert!(matches!(
            RasterImage::new(10, 0),
            Err(Error::Raster(RasterError::EmptyDimensions { .. }))
        ));
    }

    #[test]
    fn test_oversize_rejected() {
        let result = RasterImage::new(usize::MAX, 2);
        assert!(matches!(
            result,
            Err(Error::Raster(RasterError::Oversize { .. }))
        ));
    }

    #[test]
    fn test_from_pixels_length_checked() {
        let result = RasterImage::from_pixels(3, 3, vec![0; 8]);
        assert!(matches!(
            result,
            Err(Error::Raster(RasterError::PixelCountMismatch {
                expected: 9,
                actual: 8
            }))
        ));
    }

    #[test]
    fn test_row_access() {
        let pixels: Vec<u8> = (0..12).collect();
        let raster = RasterImage::from_pixels(4, 3, pixels).unwrap();

        assert_eq!(raster.row(0), &[0, 1, 2, 3]);
        assert_eq!(raster.row(2), &[8, 9, 10, 11]);
    }

    #[test]
    fn test_copy_rows() {
        let pixels: Vec<u8> = (0..12).collect();
        let raster = RasterImage::from_pixels(4, 3, pixels).unwrap();

        let band = raster.copy_rows(1, 2).unwrap();
        assert_eq!(band, (4..12).collect::<Vec<u8>>());
    }

    #[test]
    fn test_copy_rows_out_of_bounds() {
        let raster = RasterImage::new(4, 3).unwrap();
        assert!(matches!(
            raster.copy_rows(2, 2),
            Err(Error::Raster(RasterError::RowsOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_write_rows_in_place() {
        let mut raster = RasterImage::new(4, 3).unwrap();
        raster.write_rows(1, &[7; 8]).unwrap();

        assert_eq!(raster.row(0), &[0; 4]);
        assert_eq!(raster.row(1), &[7; 4]);
        assert_eq!(raster.row(2), &[7; 4]);
    }

    #[test]
    fn test_write_rows_ragged_rejected() {
        let mut raster = RasterImage::new(4, 3).unwrap();
        assert!(matches!(
            raster.write_rows(0, &[0; 6]),
            Err(Error::Raster(RasterError::RaggedRows { len: 6, width: 4 }))
        ));
    }

    #[test]
    fn test_write_rows_out_of_bounds() {
        let mut raster = RasterImage::new(4, 3).unwrap();
        assert!(matches!(
            raster.write_rows(2, &[0; 8]),
            Err(Error::Raster(RasterError::RowsOutOfBounds { .. }))
        ));
    }
}
