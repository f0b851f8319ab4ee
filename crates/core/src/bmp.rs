//! Bitmap file codec.
//!
//! Decodes and encodes the on-disk image format the pipeline consumes and
//! produces. Color input is reduced to single-channel luminance on decode;
//! encode replicates the gray value into all three channels.
//!
//! # File Format
//!
//! ```text
//! +--------------------+
//! | Magic "BM" (2)     |
//! | file_size (4)      |  u32 total file size
//! | reserved (4)       |  two u16, always 0
//! | pixel_offset (4)   |  u32 offset of pixel data
//! +--------------------+
//! | header_size (4)    |  u32, 40
//! | width (4)          |  i32
//! | height (4)         |  i32, negative = top-down row order
//! | planes (2)         |  u16, 1
//! | bit_count (2)      |  u16, only 24 supported
//! | compression (4)    |  u32, only 0 (uncompressed) supported
//! | image_size (4)     |  u32 pixel data bytes incl. padding
//! | x_ppm, y_ppm (8)   |  i32 each, 0
//! | colors_used (4)    |  u32, 0
//! | colors_important(4)|  u32, 0
//! +--------------------+
//! | pixel rows         |  3 bytes per pixel, B G R order,
//! | (variable)         |  each row padded to a 4-byte boundary
//! +--------------------+
//! ```
//!
//! Output is always written top-down (negative height), 24-bit,
//! uncompressed.

use crate::error::{CodecError, Result};
use crate::raster::RasterImage;
use std::path::Path;

/// Magic marker: "BM"
const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Size of the file-level header in bytes
const FILE_HEADER_SIZE: usize = 14;

/// Size of the image-metadata header in bytes
const INFO_HEADER_SIZE: usize = 40;

/// Combined header size; pixel data is written right after
const HEADERS_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Bytes of padding appended to each pixel row.
fn row_padding(width: usize) -> usize {
    (4 - (width * 3) % 4) % 4
}

/// Decode a bitmap into a grayscale raster.
///
/// Luminance is the truncating mean `(r + g + b) / 3` of each pixel.
/// Rows are stored bottom-up unless the height field is negative.
///
/// # Errors
/// - `CodecError::TooShort` if the buffer ends inside the headers
/// - `CodecError::InvalidMagic` if the marker isn't "BM"
/// - `CodecError::UnsupportedBitDepth` / `UnsupportedCompression` for
///   anything but 24-bit uncompressed
/// - `CodecError::InvalidDimensions` for non-positive width or zero height
/// - `CodecError::TruncatedPixelData` if pixel rows end early
pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
    if bytes.len() < HEADERS_SIZE {
        return Err(CodecError::TooShort {
            required: HEADERS_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let magic: [u8; 2] = bytes[0..2].try_into().unwrap();
    if magic != MAGIC {
        return Err(CodecError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let pixel_offset = u32::from_le_bytes(bytes[10..14].try_into().unwrap()) as usize;

    let raw_width = i32::from_le_bytes(bytes[18..22].try_into().unwrap());
    let raw_height = i32::from_le_bytes(bytes[22..26].try_into().unwrap());
    let bit_count = u16::from_le_bytes(bytes[28..30].try_into().unwrap());
    let compression = u32::from_le_bytes(bytes[30..34].try_into().unwrap());

    if bit_count != 24 {
        return Err(CodecError::UnsupportedBitDepth(bit_count).into());
    }
    if compression != 0 {
        return Err(CodecError::UnsupportedCompression(compression).into());
    }
    if raw_width <= 0 || raw_height == 0 {
        return Err(CodecError::InvalidDimensions {
            width: raw_width,
            height: raw_height,
        }
        .into());
    }

    // Negative height marks top-down row order.
    let top_down = raw_height < 0;
    let width = raw_width as usize;
    let height = raw_height.unsigned_abs() as usize;

    let stride = width * 3 + row_padding(width);
    let required = stride * height;
    if pixel_offset > bytes.len() || bytes.len() - pixel_offset < required {
        return Err(CodecError::TruncatedPixelData {
            required,
            offset: pixel_offset,
            actual: bytes.len().saturating_sub(pixel_offset),
        }
        .into());
    }

    let mut pixels = vec![0u8; width * height];
    for file_row in 0..height {
        let y = if top_down {
            file_row
        } else {
            height - 1 - file_row
        };
        let row_start = pixel_offset + file_row * stride;
        for x in 0..width {
            let p = row_start + x * 3;
            let b = bytes[p] as u16;
            let g = bytes[p + 1] as u16;
            let r = bytes[p + 2] as u16;
            pixels[y * width + x] = ((r + g + b) / 3) as u8;
        }
    }

    RasterImage::from_pixels(width, height, pixels)
}

/// Encode a raster as a top-down 24-bit uncompressed bitmap.
///
/// The gray value is replicated into the blue, green, and red channels.
pub fn encode(raster: &RasterImage) -> Vec<u8> {
    let width = raster.width();
    let height = raster.height();
    let padding = row_padding(width);
    let stride = width * 3 + padding;
    let image_size = (stride * height) as u32;
    let file_size = (HEADERS_SIZE + stride * height) as u32;

    let mut bytes = Vec::with_capacity(file_size as usize);

    // File header
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&(HEADERS_SIZE as u32).to_le_bytes());

    // Info header; negative height puts the origin at the top-left
    bytes.extend_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(-(height as i32)).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&image_size.to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    // Pixel rows, top-down, gray replicated to B G R
    for y in 0..height {
        for &gray in raster.row(y) {
            bytes.push(gray);
            bytes.push(gray);
            bytes.push(gray);
        }
        bytes.extend(std::iter::repeat(0u8).take(padding));
    }

    bytes
}

/// Read and decode a bitmap file.
///
/// # Errors
/// `Error::Io` if the file cannot be opened or read, plus any decode error.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode a raster and write it to a file.
pub fn write_file<P: AsRef<Path>>(path: P, raster: &RasterImage) -> Result<()> {
    std::fs::write(path, encode(raster))?;
    Ok(())
}
