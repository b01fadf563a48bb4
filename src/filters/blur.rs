//! Box blur.
//!
//! Normalized k x k averaging over every channel. The window is anchored at
//! `k / 2` and borders are mirrored (reflect-101), so an even kernel size
//! reaches one sample further up and left.
//!
//! Window sides are capped at `2 * max(height, width) + 1`.

use ndarray::{Array3, ArrayView3};

use super::core::{box_mean_u8, BorderMode};

/// Apply a box blur.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels (height, width, channels)
/// * `ksize` - Side length of the square window; 0 and 1 leave the image
///   unchanged, larger values are capped by [`max_kernel_size`]
///
/// # Returns
/// Blurred image with same dimensions
pub fn box_blur_u8(input: ArrayView3<u8>, ksize: usize) -> Array3<u8> {
    if ksize <= 1 {
        // No blur, return copy
        return input.to_owned();
    }

    let (height, width, _) = input.dim();
    box_mean_u8(input, ksize.min(max_kernel_size(height, width)), BorderMode::Reflect101)
}

/// Largest window side used for an image of the given extent.
pub fn max_kernel_size(height: usize, width: usize) -> usize {
    height.max(width).saturating_mul(2).saturating_add(1)
}
