//! Grayscale conversion.
//!
//! Input color images are BGR (channel 0 = blue). Luminance uses the
//! ITU-R BT.601 weights in 14-bit fixed point, so results match the
//! integer conversion most decoders and vision libraries produce.

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

/// BT.601 weights scaled by 2^14
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;
const LUMA_SHIFT: u32 = 14;

/// Luminance of one BGR sample.
#[inline]
pub fn luma(b: u8, g: u8, r: u8) -> u8 {
    let acc = b as u32 * LUMA_B + g as u32 * LUMA_G + r as u32 * LUMA_R;
    ((acc + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Convert a BGR image to a single-channel luminance image.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 3), BGR order
///
/// # Returns
/// New array of shape (height, width, 1)
pub fn bgr_to_gray_u8(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 1));

    for y in 0..height {
        for x in 0..width {
            output[[y, x, 0]] = luma(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
        }
    }

    output
}

/// Single-channel view of `input` for operators that work on luminance.
///
/// 3-channel input is converted, 1-channel input is copied. Any other
/// channel count is rejected.
pub fn ensure_gray(input: ArrayView3<u8>, operation: &'static str) -> Result<Array3<u8>> {
    match input.dim().2 {
        1 => Ok(input.to_owned()),
        3 => Ok(bgr_to_gray_u8(input)),
        actual => Err(FilterError::ChannelMismatch {
            operation,
            expected: "1 or 3",
            actual,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_white_and_black() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
    }

    #[test]
    fn test_gray_weights_follow_channel_order() {
        // Pure red in BGR order is the last channel
        assert_eq!(luma(0, 0, 255), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(255, 0, 0), 29);
    }

    #[test]
    fn test_bgr_to_gray_shape() {
        let img = Array3::<u8>::from_elem((2, 3, 3), 100);
        let gray = bgr_to_gray_u8(img.view());
        assert_eq!(gray.dim(), (2, 3, 1));
        assert!(gray.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_ensure_gray_rejects_four_channels() {
        let img = Array3::<u8>::zeros((2, 2, 4));
        let err = ensure_gray(img.view(), "OTSU").unwrap_err();
        assert!(matches!(err, FilterError::ChannelMismatch { actual: 4, .. }));
    }

    #[test]
    fn test_ensure_gray_copies_single_channel() {
        let mut img = Array3::<u8>::zeros((2, 2, 1));
        img[[1, 1, 0]] = 42;
        let gray = ensure_gray(img.view(), "OTSU").unwrap();
        assert_eq!(gray, img);
    }
}
