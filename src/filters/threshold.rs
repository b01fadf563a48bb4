//! Binarization: Otsu, adaptive and fixed thresholds.
//!
//! Every threshold converts 3-channel input to luminance first and returns
//! a single-channel image. Single-channel input is used as is.

use ndarray::{Array3, ArrayView3};

use super::core::{box_mean_u8, gaussian_kernel_1d, saturate_u8, separable_filter, BorderMode};
use super::grayscale::ensure_gray;
use crate::error::Result;
use crate::params::AdaptiveMethod;

/// Neighbourhood side length for adaptive thresholding
pub const ADAPTIVE_BLOCK_SIZE: usize = 11;

/// Constant subtracted from the local estimate (negative raises the bar)
pub const ADAPTIVE_OFFSET: i32 = -2;

/// Cut-off used by the fixed threshold
pub const FIXED_THRESHOLD: u8 = 128;

/// Output value of the fixed threshold for samples above the cut-off
pub const FIXED_MAX_VALUE: u8 = 255;

// ============================================================================
// Otsu
// ============================================================================

/// Compute the Otsu threshold of a single-channel image.
///
/// Maximizes the between-class variance over the 256-bin histogram. Ties
/// keep the lowest level; a uniform image yields 0.
pub fn otsu_level(gray: ArrayView3<u8>) -> u8 {
    let mut hist = [0u64; 256];
    for &v in gray.iter() {
        hist[v as usize] += 1;
    }
    let total = gray.len() as f64;
    if total == 0.0 {
        return 0;
    }

    let mu: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64 / total)
        .sum();

    let mut q1 = 0.0f64;
    let mut sum1 = 0.0f64;
    let mut max_sigma = 0.0f64;
    let mut level = 0u8;

    for (i, &h) in hist.iter().enumerate() {
        let p = h as f64 / total;
        q1 += p;
        sum1 += i as f64 * p;
        let q2 = 1.0 - q1;
        if q1.min(q2) < f32::EPSILON as f64 || q1.max(q2) > 1.0 - f32::EPSILON as f64 {
            continue;
        }

        let mu1 = sum1 / q1;
        let mu2 = (mu - sum1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            level = i as u8;
        }
    }

    level
}

/// Binarize with an automatically chosen global threshold.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels
/// * `min_value` - Output for samples at or below the Otsu level
/// * `max_value` - Output for samples above it
///
/// # Returns
/// Single-channel image containing only `min_value` and `max_value`
pub fn otsu_threshold_u8(input: ArrayView3<u8>, min_value: u8, max_value: u8) -> Result<Array3<u8>> {
    let gray = ensure_gray(input, "OTSU")?;
    let level = otsu_level(gray.view());
    log::debug!("otsu level {level}");
    Ok(gray.mapv(|v| if v > level { max_value } else { min_value }))
}

// ============================================================================
// Adaptive
// ============================================================================

/// Binarize against a per-pixel threshold from the surrounding 11x11 block.
///
/// A sample becomes `max_value` when it exceeds the local estimate minus
/// [`ADAPTIVE_OFFSET`], otherwise 0. Borders replicate the edge samples.
///
/// # Arguments
/// * `input` - Image with 1 or 3 channels
/// * `max_value` - Output for samples above the local threshold
/// * `method` - Box mean or Gaussian-weighted mean of the block
pub fn adaptive_threshold_u8(
    input: ArrayView3<u8>,
    max_value: u8,
    method: AdaptiveMethod,
) -> Result<Array3<u8>> {
    let gray = ensure_gray(input, "ADAPTIVE_THRESHOLD")?;

    let local = match method {
        AdaptiveMethod::Mean => box_mean_u8(gray.view(), ADAPTIVE_BLOCK_SIZE, BorderMode::Replicate),
        AdaptiveMethod::Gaussian => {
            let kernel = gaussian_kernel_1d(ADAPTIVE_BLOCK_SIZE, 0.0);
            separable_filter(gray.view(), &kernel, &kernel, BorderMode::Replicate).mapv(saturate_u8)
        }
    };

    let mut output = Array3::<u8>::zeros(gray.dim());
    ndarray::Zip::from(&mut output)
        .and(&gray)
        .and(&local)
        .for_each(|out, &v, &m| {
            if v as i32 - m as i32 > -ADAPTIVE_OFFSET {
                *out = max_value;
            }
        });

    Ok(output)
}

// ============================================================================
// Fixed
// ============================================================================

/// Binarize at the fixed cut-off of 128: above becomes 255, the rest 0.
pub fn fixed_threshold_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    let gray = ensure_gray(input, "THRESHOLD")?;
    Ok(gray.mapv(|v| if v > FIXED_THRESHOLD { FIXED_MAX_VALUE } else { 0 }))
}
