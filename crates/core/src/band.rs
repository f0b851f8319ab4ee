//! Row bands and their wire format.
//!
//! A band is a contiguous horizontal slice of a raster: the unit of
//! transfer between the coordinator and a worker, and the unit of
//! parallel work. Bands for distinct workers never overlap, and a band
//! never outlives a single pipeline run.
//!
//! # Frame Format
//!
//! A worker has no independent knowledge of the image, so every frame
//! carries the band's geometry ahead of the payload:
//!
//! ```text
//! +------------------+
//! | Magic (2 bytes)  |  0x42 0x46 ("BF")
//! +------------------+
//! | start_row (4)    |  u32 first row in the parent image
//! +------------------+
//! | row_count (4)    |  u32 rows in this band
//! +------------------+
//! | width (4)        |  u32 pixels per row
//! +------------------+
//! | crc32 (4)        |  u32 checksum
//! +------------------+
//! | payload          |  row_count * width luminance bytes, row-major
//! | (variable)       |
//! +------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers start_row, row_count, width, and the payload, so a
//! corrupted geometry field is caught as well as corrupted pixels.

use crate::error::{BandError, Error, Result};
use crate::raster::RasterImage;

/// Magic number for band frames: "BF"
const MAGIC: [u8; 2] = [0x42, 0x46];

/// Size of the band frame header in bytes
pub const HEADER_SIZE: usize = 18;

/// A contiguous slice of raster rows owned by exactly one group member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    /// First row of this band in the parent image
    pub start_row: usize,

    /// Pixels per row, inherited from the parent image
    pub width: usize,

    /// Number of rows in this band
    pub rows: usize,

    /// Luminance bytes, row-major, length `rows * width`
    pixels: Vec<u8>,
}

impl Band {
    /// Create a band from an existing pixel buffer.
    ///
    /// # Errors
    /// - `BandError::EmptyBand` if `rows` or `width` is zero
    /// - `BandError::PayloadLengthMismatch` if the buffer is not
    ///   `rows * width` bytes
    pub fn new(start_row: usize, width: usize, rows: usize, pixels: Vec<u8>) -> Result<Self> {
        if rows == 0 || width == 0 {
            return Err(BandError::EmptyBand { rows, width }.into());
        }
        let expected = rows * width;
        if pixels.len() != expected {
            return Err(BandError::PayloadLengthMismatch {
                expected,
                actual: pixels.len(),
            }
            .into());
        }
        Ok(Self {
            start_row,
            width,
            rows,
            pixels,
        })
    }

    /// Cut a band out of a raster by copying `rows` rows from `start_row`.
    ///
    /// The band is an independent value; the raster is left untouched.
    pub fn from_raster(raster: &RasterImage, start_row: usize, rows: usize) -> Result<Self> {
        let pixels = raster.copy_rows(start_row, rows)?;
        Self::new(start_row, raster.width(), rows, pixels)
    }

    /// Payload bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable payload, for in-place filtering.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Serialize this band into a wire frame.
    pub fn to_wire(&self) -> Vec<u8> {
        let start_row = self.start_row as u32;
        let row_count = self.rows as u32;
        let width = self.width as u32;
        let crc32 = compute_crc(start_row, row_count, width, &self.pixels);

        let mut frame = Vec::with_capacity(HEADER_SIZE + self.pixels.len());
        frame.extend_from_slice(&MAGIC);
        frame.extend_from_slice(&start_row.to_le_bytes());
        frame.extend_from_slice(&row_count.to_le_bytes());
        frame.extend_from_slice(&width.to_le_bytes());
        frame.extend_from_slice(&crc32.to_le_bytes());
        frame.extend_from_slice(&self.pixels);
        frame
    }

    /// Parse a band from a wire frame.
    ///
    /// # Errors
    /// - `BandError::FrameTooShort` if the buffer ends inside the header
    /// - `BandError::InvalidMagic` if the marker doesn't match
    /// - `BandError::EmptyBand` for zero rows or width
    /// - `BandError::PayloadLengthMismatch` if the payload isn't exactly
    ///   `row_count * width` bytes
    /// - `Error::Crc` if the checksum doesn't match
    pub fn from_wire(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(BandError::FrameTooShort {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let magic: [u8; 2] = bytes[0..2].try_into().unwrap();
        if magic != MAGIC {
            return Err(BandError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let start_row = u32::from_le_bytes(bytes[2..6].try_into().unwrap());
        let row_count = u32::from_le_bytes(bytes[6..10].try_into().unwrap());
        let width = u32::from_le_bytes(bytes[10..14].try_into().unwrap());
        let crc32 = u32::from_le_bytes(bytes[14..18].try_into().unwrap());

        if row_count == 0 || width == 0 {
            return Err(BandError::EmptyBand {
                rows: row_count as usize,
                width: width as usize,
            }
            .into());
        }

        let expected = row_count as usize * width as usize;
        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != expected {
            return Err(BandError::PayloadLengthMismatch {
                expected,
                actual: payload.len(),
            }
            .into());
        }

        let computed = compute_crc(start_row, row_count, width, payload);
        if computed != crc32 {
            return Err(Error::Crc {
                expected: crc32,
                actual: computed,
            });
        }

        Ok(Self {
            start_row: start_row as usize,
            width: width as usize,
            rows: row_count as usize,
            pixels: payload.to_vec(),
        })
    }
}

/// Compute CRC32 over the protected fields.
fn compute_crc(start_row: u32, row_count: u32, width: u32, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&start_row.to_le_bytes());
    hasher.update(&row_count.to_le_bytes());
    hasher.update(&width.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}
