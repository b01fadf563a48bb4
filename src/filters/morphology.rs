//! Morphology filters: Erode, Dilate, Open, Close.
//!
//! All filters use a square all-ones [`StructuringElement`] and run a single
//! iteration. Every channel is processed independently.
//!
//! Samples outside the image never take part: erosion near the border only
//! looks at the pixels that exist, and so does dilation.
//!
//! ## Performance
//!
//! A rectangular element is separable, so each filter is a horizontal pass
//! followed by a vertical pass: O(n x 2k) instead of O(n x k²).

use ndarray::{Array3, ArrayView3};

use super::kernels::StructuringElement;

/// Running min / max over the element, one axis at a time.
fn rank_filter(
    input: ArrayView3<u8>,
    element: StructuringElement,
    identity: u8,
    pick: fn(u8, u8) -> u8,
) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    if height == 0 || width == 0 {
        return input.to_owned();
    }
    let offsets = element.fit_to(height, width).offsets();
    let (lo, hi) = (*offsets.start(), *offsets.end());

    // Pass 1: Horizontal
    let mut temp_flat = vec![identity; height * width * channels];
    temp_flat
        .chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let x_start = (x as isize + lo).max(0) as usize;
                let x_end = (x as isize + hi).min(width as isize - 1) as usize;

                for c in 0..channels {
                    let mut acc = identity;
                    for sx in x_start..=x_end {
                        acc = pick(acc, input[[y, sx, c]]);
                    }
                    row[x * channels + c] = acc;
                }
            }
        });

    // Pass 2: Vertical
    let mut output = Array3::<u8>::from_elem((height, width, channels), identity);
    for y in 0..height {
        let y_start = (y as isize + lo).max(0) as usize;
        let y_end = (y as isize + hi).min(height as isize - 1) as usize;

        for x in 0..width {
            for c in 0..channels {
                let mut acc = identity;
                for sy in y_start..=y_end {
                    acc = pick(acc, temp_flat[(sy * width + x) * channels + c]);
                }
                output[[y, x, c]] = acc;
            }
        }
    }

    output
}

// ============================================================================
// Erode / Dilate
// ============================================================================

/// Apply erosion.
///
/// Takes the minimum over the element, so bright regions shrink and dark
/// regions grow.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels (height, width, channels)
/// * `element` - Square structuring element
///
/// # Returns
/// Eroded image with same channel count
pub fn erode_u8(input: ArrayView3<u8>, element: StructuringElement) -> Array3<u8> {
    rank_filter(input, element, u8::MAX, u8::min)
}

/// Apply dilation.
///
/// Takes the maximum over the element, so bright regions grow and dark
/// regions shrink.
pub fn dilate_u8(input: ArrayView3<u8>, element: StructuringElement) -> Array3<u8> {
    rank_filter(input, element, u8::MIN, u8::max)
}

// ============================================================================
// Open / Close
// ============================================================================

/// Erode then dilate: removes bright specks smaller than the element.
pub fn open_u8(input: ArrayView3<u8>, element: StructuringElement) -> Array3<u8> {
    let eroded = erode_u8(input, element);
    dilate_u8(eroded.view(), element)
}

/// Dilate then erode: fills dark holes smaller than the element.
pub fn close_u8(input: ArrayView3<u8>, element: StructuringElement) -> Array3<u8> {
    let dilated = dilate_u8(input, element);
    erode_u8(dilated.view(), element)
}
