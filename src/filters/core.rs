//! Core utilities shared by the filter modules.
//!
//! This module provides:
//! - Border handling for out-of-image sample positions
//! - 2D correlation with small fixed kernels
//! - Separable filtering (box and Gaussian)
//! - Gaussian kernel generation
//! - Saturating conversion back to 8-bit samples

use ndarray::{Array3, ArrayView3};

/// How sample positions outside the image are mapped back inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// `gfedcb|abcdefgh|gfedcba` - mirror without repeating the edge sample
    Reflect101,
    /// `aaaaaa|abcdefgh|hhhhhhh` - clamp to the nearest edge sample
    Replicate,
}

impl BorderMode {
    /// Map a possibly out-of-range index into `0..len`.
    #[inline]
    pub fn index(self, i: isize, len: usize) -> usize {
        let n = len as isize;
        if (0..n).contains(&i) {
            return i as usize;
        }
        match self {
            BorderMode::Replicate => i.clamp(0, n - 1) as usize,
            BorderMode::Reflect101 => {
                if n == 1 {
                    return 0;
                }
                let period = 2 * (n - 1);
                let mut j = i.rem_euclid(period);
                if j >= n {
                    j = period - j;
                }
                j as usize
            }
        }
    }
}

/// Round half to even and clamp into the 8-bit range.
#[inline]
pub fn saturate_u8(v: f64) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Correlate every channel with a small integer kernel.
///
/// The anchor sits at `(H / 2, W / 2)`, so 3x3 kernels are centred and 2x2
/// kernels reach one sample up and to the left. The kernel is not flipped.
///
/// # Returns
/// Raw responses as f64, same shape as the input
pub fn correlate<const H: usize, const W: usize>(
    input: ArrayView3<u8>,
    kernel: &[[i32; W]; H],
    border: BorderMode,
) -> Array3<f64> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<f64>::zeros((height, width, channels));
    let (ay, ax) = ((H / 2) as isize, (W / 2) as isize);

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0i32;
                for (ky, row) in kernel.iter().enumerate() {
                    let sy = border.index(y as isize + ky as isize - ay, height);
                    for (kx, &kv) in row.iter().enumerate() {
                        if kv == 0 {
                            continue;
                        }
                        let sx = border.index(x as isize + kx as isize - ax, width);
                        sum += kv * input[[sy, sx, c]] as i32;
                    }
                }
                output[[y, x, c]] = sum as f64;
            }
        }
    }

    output
}

/// Apply a separable filter: `kernel_x` along rows, then `kernel_y` along columns.
///
/// Each kernel is anchored at `len / 2`. Weights are used as given, so a box
/// filter passes ones and scales the result afterwards.
pub fn separable_filter(
    input: ArrayView3<u8>,
    kernel_x: &[f64],
    kernel_y: &[f64],
    border: BorderMode,
) -> Array3<f64> {
    let (height, width, channels) = input.dim();
    let mut temp = Array3::<f64>::zeros((height, width, channels));
    let mut result = Array3::<f64>::zeros((height, width, channels));
    let ax = (kernel_x.len() / 2) as isize;
    let ay = (kernel_y.len() / 2) as isize;

    // Horizontal pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f64;
                for (ki, &kv) in kernel_x.iter().enumerate() {
                    let sx = border.index(x as isize + ki as isize - ax, width);
                    sum += input[[y, sx, c]] as f64 * kv;
                }
                temp[[y, x, c]] = sum;
            }
        }
    }

    // Vertical pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f64;
                for (ki, &kv) in kernel_y.iter().enumerate() {
                    let sy = border.index(y as isize + ki as isize - ay, height);
                    sum += temp[[sy, x, c]] * kv;
                }
                result[[y, x, c]] = sum;
            }
        }
    }

    result
}

/// Normalized mean over a `ksize` x `ksize` window, rounded to 8-bit.
pub fn box_mean_u8(input: ArrayView3<u8>, ksize: usize, border: BorderMode) -> Array3<u8> {
    let ones = vec![1.0f64; ksize];
    let area = ksize as f64 * ksize as f64;
    separable_filter(input, &ones, &ones, border).mapv(|sum| saturate_u8(sum / area))
}

/// Generate a normalized 1D Gaussian kernel of fixed size.
///
/// A non-positive `sigma` is derived from the size:
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel_1d(ksize: usize, sigma: f64) -> Vec<f64> {
    if ksize <= 1 {
        return vec![1.0];
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (ksize - 1) as f64 / 2.0;

    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    // Normalize
    let sum: f64 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect101_index() {
        let b = BorderMode::Reflect101;
        assert_eq!(b.index(-1, 5), 1);
        assert_eq!(b.index(-2, 5), 2);
        assert_eq!(b.index(5, 5), 3);
        assert_eq!(b.index(6, 5), 2);
        assert_eq!(b.index(-3, 1), 0);
    }

    #[test]
    fn test_replicate_index() {
        let b = BorderMode::Replicate;
        assert_eq!(b.index(-4, 5), 0);
        assert_eq!(b.index(9, 5), 4);
        assert_eq!(b.index(2, 5), 2);
    }

    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        let k = gaussian_kernel_1d(11, 0.0);
        assert_eq!(k.len(), 11);
        let sum: f64 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(k[5] > k[4] && k[4] > k[0]);
        assert!((k[0] - k[10]).abs() < 1e-12);
    }

    #[test]
    fn test_correlate_flat_is_zero() {
        let img = Array3::<u8>::from_elem((4, 4, 1), 90);
        let kernel = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
        let out = correlate(img.view(), &kernel, BorderMode::Reflect101);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_box_mean_of_constant() {
        let img = Array3::<u8>::from_elem((6, 5, 3), 77);
        let out = box_mean_u8(img.view(), 3, BorderMode::Reflect101);
        assert!(out.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_saturate_u8_rounds_half_even() {
        assert_eq!(saturate_u8(2.5), 2);
        assert_eq!(saturate_u8(3.5), 4);
        assert_eq!(saturate_u8(-7.0), 0);
        assert_eq!(saturate_u8(400.0), 255);
    }
}
