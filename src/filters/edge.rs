//! Edge detection filters: Canny, Sobel, Laplacian, Prewitt, Roberts.
//!
//! ## Supported Formats
//!
//! - **Sobel, Prewitt, Roberts**: 1 or 3 channels, each channel filtered
//!   independently, output keeps the channel count
//! - **Laplacian**: converted to luminance first, output is 1 channel
//! - **Canny**: 1 or 3 channels in, 1 channel binary edge map out
//!
//! Gradient responses are computed at full precision, saturated to the
//! requested [`Depth`], and re-quantized to 8-bit.

use std::collections::VecDeque;

use ndarray::{Array2, Array3, ArrayView3};

use super::core::{correlate, saturate_u8, BorderMode};
use super::grayscale::ensure_gray;
use super::kernels::{LAPLACIAN, PREWITT_X, PREWITT_Y, ROBERTS_X, ROBERTS_Y, SOBEL_X, SOBEL_Y};
use crate::error::Result;
use crate::params::Depth;

// ============================================================================
// Sobel
// ============================================================================

/// Sobel gradient with equal weighting of both directions.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels (height, width, channels)
/// * `depth` - Sample depth the dx / dy responses and their blend are held at
///
/// # Returns
/// `0.5 * dx + 0.5 * dy` per channel, same channel count
pub fn sobel_u8(input: ArrayView3<u8>, depth: Depth) -> Array3<u8> {
    let dx = correlate(input, &SOBEL_X, BorderMode::Reflect101);
    let dy = correlate(input, &SOBEL_Y, BorderMode::Reflect101);

    let mut output = Array3::<u8>::zeros(input.dim());
    ndarray::Zip::from(&mut output)
        .and(&dx)
        .and(&dy)
        .for_each(|out, &gx, &gy| {
            let blended = 0.5 * depth.saturate(gx) + 0.5 * depth.saturate(gy);
            *out = saturate_u8(depth.saturate(blended));
        });

    output
}

// ============================================================================
// Laplacian
// ============================================================================

/// Second-derivative response of the image luminance.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels; color is converted to luminance
/// * `depth` - Sample depth the response is held at before re-quantizing
///
/// # Returns
/// Single-channel image
pub fn laplacian_u8(input: ArrayView3<u8>, depth: Depth) -> Result<Array3<u8>> {
    let gray = ensure_gray(input, "LAPLACIAN")?;
    let response = correlate(gray.view(), &LAPLACIAN, BorderMode::Reflect101);
    Ok(response.mapv(|v| saturate_u8(depth.saturate(v))))
}

// ============================================================================
// Prewitt / Roberts
// ============================================================================

/// Blend two directional responses after rectifying them to 8-bit.
///
/// Each response is first saturated into 0-255 (negative slopes vanish),
/// then `weight_x * |gx| + weight_y * |gy|` is rounded and saturated.
fn blend_directional(gx: &Array3<f64>, gy: &Array3<f64>, weight_x: f64, weight_y: f64) -> Array3<u8> {
    let mut output = Array3::<u8>::zeros(gx.dim());
    ndarray::Zip::from(&mut output)
        .and(gx)
        .and(gy)
        .for_each(|out, &a, &b| {
            let a = saturate_u8(a) as f64;
            let b = saturate_u8(b) as f64;
            *out = saturate_u8(weight_x * a + weight_y * b);
        });
    output
}

/// Prewitt edge filter.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels
/// * `weight_x` - Weight of the horizontal-derivative response (already normalized, e.g. 0.5)
/// * `weight_y` - Weight of the vertical-derivative response
pub fn prewitt_u8(input: ArrayView3<u8>, weight_x: f64, weight_y: f64) -> Array3<u8> {
    let gx = correlate(input, &PREWITT_X, BorderMode::Reflect101);
    let gy = correlate(input, &PREWITT_Y, BorderMode::Reflect101);
    blend_directional(&gx, &gy, weight_x, weight_y)
}

/// Roberts cross edge filter, same weighting scheme as [`prewitt_u8`].
pub fn roberts_u8(input: ArrayView3<u8>, weight_x: f64, weight_y: f64) -> Array3<u8> {
    let gx = correlate(input, &ROBERTS_X, BorderMode::Reflect101);
    let gy = correlate(input, &ROBERTS_Y, BorderMode::Reflect101);
    blend_directional(&gx, &gy, weight_x, weight_y)
}

// ============================================================================
// Canny
// ============================================================================

const TAN_22_5: f64 = 0.414_213_562_373_095_1;
const TAN_67_5: f64 = 2.414_213_562_373_095;

/// Canny edge detector.
///
/// Sobel 3x3 gradients (replicated border), L1 magnitude, non-maximum
/// suppression along the quantized gradient direction, then hysteresis with
/// 8-connectivity. For color input the channel with the strongest gradient
/// wins at each pixel. If `threshold1 > threshold2` they are swapped.
///
/// # Returns
/// Single-channel edge map with values 0 or 255
pub fn canny_u8(input: ArrayView3<u8>, threshold1: f64, threshold2: f64) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let (low, high) = if threshold1 > threshold2 {
        (threshold2.floor(), threshold1.floor())
    } else {
        (threshold1.floor(), threshold2.floor())
    };

    let dx = correlate(input, &SOBEL_X, BorderMode::Replicate);
    let dy = correlate(input, &SOBEL_Y, BorderMode::Replicate);

    // Strongest channel per pixel
    let mut gx = Array2::<f64>::zeros((height, width));
    let mut gy = Array2::<f64>::zeros((height, width));
    let mut mag = Array2::<f64>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let m = dx[[y, x, c]].abs() + dy[[y, x, c]].abs();
                if c == 0 || m > mag[[y, x]] {
                    mag[[y, x]] = m;
                    gx[[y, x]] = dx[[y, x, c]];
                    gy[[y, x]] = dy[[y, x, c]];
                }
            }
        }
    }

    // Magnitude outside the image counts as zero
    let at = |y: isize, x: isize| -> f64 {
        if y < 0 || x < 0 || y >= height as isize || x >= width as isize {
            0.0
        } else {
            mag[[y as usize, x as usize]]
        }
    };

    let mut candidate = Array2::<bool>::from_elem((height, width), false);
    let mut queue = VecDeque::new();
    let mut output = Array3::<u8>::zeros((height, width, 1));

    for y in 0..height {
        for x in 0..width {
            let m = mag[[y, x]];
            if m <= low {
                continue;
            }
            let (yi, xi) = (y as isize, x as isize);
            let ax = gx[[y, x]].abs();
            let ay = gy[[y, x]].abs();

            let is_peak = if ay < ax * TAN_22_5 {
                m > at(yi, xi - 1) && m >= at(yi, xi + 1)
            } else if ay > ax * TAN_67_5 {
                m > at(yi - 1, xi) && m >= at(yi + 1, xi)
            } else {
                let s: isize = if (gx[[y, x]] < 0.0) != (gy[[y, x]] < 0.0) { -1 } else { 1 };
                m > at(yi - 1, xi - s) && m > at(yi + 1, xi + s)
            };

            if !is_peak {
                continue;
            }
            candidate[[y, x]] = true;
            if m > high {
                output[[y, x, 0]] = 255;
                queue.push_back((y, x));
            }
        }
    }

    // Hysteresis: grow strong edges through connected candidates
    while let Some((y, x)) = queue.pop_front() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                if candidate[[ny, nx]] && output[[ny, nx, 0]] == 0 {
                    output[[ny, nx, 0]] = 255;
                    queue.push_back((ny, nx));
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(height: usize, width: usize, channels: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((height, width, channels));
        for y in 0..height {
            for x in width / 2..width {
                for c in 0..channels {
                    img[[y, x, c]] = 200;
                }
            }
        }
        img
    }

    #[test]
    fn test_sobel_detects_vertical_edge() {
        let img = vertical_step(6, 6, 1);
        let result = sobel_u8(img.view(), Depth::U8);

        // Rising edge gives a positive dx, halved by the blend
        assert!(result[[3, 2, 0]] > 100);
        assert!(result[[3, 3, 0]] > 100);
        assert_eq!(result[[3, 0, 0]], 0);
        assert_eq!(result[[3, 5, 0]], 0);
    }

    #[test]
    fn test_sobel_depth_changes_saturation() {
        let img = vertical_step(6, 6, 1);
        // dx = 800 at the edge: clipped to 255 before blending at U8 only
        let narrow = sobel_u8(img.view(), Depth::U8);
        let wide = sobel_u8(img.view(), Depth::I16);
        assert_eq!(narrow[[3, 2, 0]], 128);
        assert_eq!(wide[[3, 2, 0]], 255);
    }

    #[test]
    fn test_sobel_keeps_channels() {
        let img = vertical_step(4, 4, 3);
        assert_eq!(sobel_u8(img.view(), Depth::U8).dim(), (4, 4, 3));
    }

    #[test]
    fn test_laplacian_flat_is_zero() {
        let img = Array3::<u8>::from_elem((5, 5, 3), 128);
        let result = laplacian_u8(img.view(), Depth::U8).unwrap();
        assert_eq!(result.dim(), (5, 5, 1));
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_laplacian_bright_spot_center_clipped() {
        let mut img = Array3::<u8>::zeros((5, 5, 1));
        img[[2, 2, 0]] = 50;
        let result = laplacian_u8(img.view(), Depth::U8).unwrap();
        // Center response is -200 and saturates to 0, neighbours see +50
        assert_eq!(result[[2, 2, 0]], 0);
        assert_eq!(result[[1, 2, 0]], 50);
        assert_eq!(result[[2, 1, 0]], 50);
    }

    #[test]
    fn test_prewitt_zero_weights_is_black() {
        let img = vertical_step(5, 6, 3);
        let result = prewitt_u8(img.view(), 0.0, 0.0);
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_prewitt_horizontal_weight_only() {
        let img = vertical_step(5, 6, 1);
        let result = prewitt_u8(img.view(), 1.0, 0.0);
        // Rising edge: 3 * 200 clipped to 255
        assert_eq!(result[[2, 2, 0]], 255);
        assert_eq!(result[[2, 0, 0]], 0);
    }

    #[test]
    fn test_roberts_diagonal_response() {
        let img = vertical_step(4, 4, 1);
        // Anchor (1, 1): out = src(y-1, x-1) - src(y, x) for ROBERTS_X,
        // negative across a rising edge so only ROBERTS_Y responds
        let result = roberts_u8(img.view(), 1.0, 1.0);
        assert_eq!(result[[2, 2, 0]], 200);
        assert_eq!(result[[2, 0, 0]], 0);
    }

    #[test]
    fn test_canny_flat_has_no_edges() {
        let img = Array3::<u8>::from_elem((6, 6, 3), 77);
        let result = canny_u8(img.view(), 0.0, 0.0);
        assert_eq!(result.dim(), (6, 6, 1));
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_canny_step_gives_thin_edge() {
        let img = vertical_step(8, 8, 1);
        let result = canny_u8(img.view(), 50.0, 100.0);

        for y in 0..8 {
            let row: Vec<u8> = (0..8).map(|x| result[[y, x, 0]]).collect();
            assert_eq!(row.iter().filter(|&&v| v == 255).count(), 1, "row {y}: {row:?}");
            assert_eq!(row[3], 255);
        }
    }

    #[test]
    fn test_canny_high_threshold_suppresses_everything() {
        let img = vertical_step(8, 8, 1);
        let result = canny_u8(img.view(), 2000.0, 1000.0);
        assert!(result.iter().all(|&v| v == 0));
    }
}
