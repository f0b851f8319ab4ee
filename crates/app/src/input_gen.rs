//! Sample image generation for testing.
//!
//! When no input file is specified, we generate a sample image with
//! interesting smoothing characteristics: a mix of smooth gradients,
//! flat rectangles with hard edges, and speckle noise.
//!
//! # Design
//!
//! Generated images have:
//! - A base gradient (already smooth; barely changed by the filter)
//! - Flat rectangles (hard edges that smoothing visibly softens)
//! - Salt-and-pepper speckles (which the filter suppresses)
//!
//! This makes the filter's effect obvious when comparing input and
//! output, including the unfiltered seam rows between bands.

use bandblur_core::error::Result;
use bandblur_core::raster::RasterImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate a sample grayscale image.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `width`, `height`: image dimensions
///
/// # Returns
/// A raster ready to be encoded and fed to the pipeline.
pub fn generate_sample_image(seed: u64, width: usize, height: usize) -> Result<RasterImage> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pixels = vec![0u8; width * height];

    // Base diagonal gradient
    for y in 0..height {
        for x in 0..width {
            let value = (x * 128 / width + y * 128 / height) as u8;
            pixels[y * width + x] = value;
        }
    }

    // Flat rectangles with hard edges
    let rect_count = (width * height / 4096).clamp(4, 32);
    for _ in 0..rect_count {
        let rect_w = rng.gen_range(width / 16..=width / 4).max(1);
        let rect_h = rng.gen_range(height / 16..=height / 4).max(1);
        let x0 = rng.gen_range(0..width);
        let y0 = rng.gen_range(0..height);
        let value: u8 = rng.gen();

        for y in y0..(y0 + rect_h).min(height) {
            for x in x0..(x0 + rect_w).min(width) {
                pixels[y * width + x] = value;
            }
        }
    }

    // Salt-and-pepper speckles over ~2% of pixels
    let speckles = width * height / 50;
    for _ in 0..speckles {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        pixels[y * width + x] = if rng.gen::<bool>() { 255 } else { 0 };
    }

    RasterImage::from_pixels(width, height, pixels)
}
