//! Fixed-kernel smoothing over a band.
//!
//! The filter is a 3x3 weighted average applied to every interior pixel
//! of a band. The band's outer ring (first/last row, first/last column)
//! is never touched: a worker only holds its own rows, so it has no
//! neighbor data for the band edges. Inter-band seam rows therefore stay
//! unfiltered in the final image; that is a property of the halo-less
//! partition scheme, not an accident of this module.
//!
//! # Algorithm
//!
//! Every interior output pixel is
//!
//! ```text
//! out[y][x] = sum(in[y+ky][x+kx] * weights[ky+1][kx+1]) / divisor
//! ```
//!
//! with truncating integer division. All reads come from the band's
//! original values: the filter double-buffers, so an updated pixel never
//! feeds a neighbor's sum.

use crate::band::Band;

/// Immutable 3x3 smoothing kernel.
///
/// Passed explicitly to the filter; never global mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    /// Non-negative weights, row-major
    pub weights: [[u32; 3]; 3],

    /// Normalization divisor (the sum of the weights)
    pub divisor: u32,
}

/// The fixed smoothing kernel: `{1,2,1; 2,4,2; 1,2,1} / 16`.
pub const SMOOTHING_KERNEL: Kernel = Kernel {
    weights: [[1, 2, 1], [2, 4, 2], [1, 2, 1]],
    divisor: 16,
};

/// Smooth a band's interior in place.
///
/// Bands too small to have an interior (`rows < 3` or `width < 3`) are
/// returned unchanged.
pub fn smooth_band(band: &mut Band, kernel: &Kernel) {
    let width = band.width;
    let rows = band.rows;
    if rows < 3 || width < 3 {
        return;
    }

    // Snapshot the input so every sum reads original values.
    let input = band.pixels().to_vec();
    let output = band.pixels_mut();

    for y in 1..rows - 1 {
        for x in 1..width - 1 {
            let mut sum: u32 = 0;
            for (ky, row_weights) in kernel.weights.iter().enumerate() {
                for (kx, &weight) in row_weights.iter().enumerate() {
                    let py = y + ky - 1;
                    let px = x + kx - 1;
                    sum += input[py * width + px] as u32 * weight;
                }
            }
            output[y * width + x] = (sum / kernel.divisor) as u8;
        }
    }
}
