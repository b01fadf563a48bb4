//! Color space conversions: HSV, YUV, CIE L*a*b*.
//!
//! All conversions take a BGR u8 image and produce a 3-channel u8 image in
//! the target space, scaled to fit 8-bit samples:
//!
//! | Space | Channel 0 | Channel 1 | Channel 2 |
//! |-------|-----------|-----------|-----------|
//! | HSV | H, 0-180 (degrees / 2) | S, 0-255 | V, 0-255 |
//! | YUV | Y, 0-255 | U, 128-centred | V, 128-centred |
//! | Lab | L * 255 / 100 | a + 128 | b + 128 |
//!
//! Callers are responsible for checking that the input has 3 channels.

use ndarray::{Array3, ArrayView3};

use super::core::saturate_u8;
use super::grayscale::luma;

// ============================================================================
// Per-pixel conversions
// ============================================================================

/// Convert BGR to 8-bit HSV.
/// Output: (h, s, v) where h is 0-180 and s, v are 0-255
#[inline]
fn bgr_to_hsv(b: u8, g: u8, r: u8) -> [u8; 3] {
    let (bf, gf, rf) = (b as f64, g as f64, r as f64);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let s = if max > 0.0 { 255.0 * diff / max } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else {
        // Sextant offset in units of diff, then 30 half-degrees per unit
        let units = if max == rf {
            gf - bf
        } else if max == gf {
            bf - rf + 2.0 * diff
        } else {
            rf - gf + 4.0 * diff
        };
        let mut h = (30.0 * units / diff).round_ties_even();
        if h < 0.0 {
            h += 180.0;
        }
        h
    };

    [saturate_u8(h), saturate_u8(s), max as u8]
}

/// Convert BGR to 8-bit YUV with a 128 offset on the chroma channels.
#[inline]
fn bgr_to_yuv(b: u8, g: u8, r: u8) -> [u8; 3] {
    let y = luma(b, g, r);
    let yf = y as f64;
    let u = (b as f64 - yf) * 0.492 + 128.0;
    let v = (r as f64 - yf) * 0.877 + 128.0;
    [y, saturate_u8(u), saturate_u8(v)]
}

/// sRGB transfer function inverse, input and output in 0.0-1.0
#[inline]
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// CIE L*a*b* companding function
#[inline]
fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Convert BGR to 8-bit Lab (D65 white point).
#[inline]
fn bgr_to_lab(b: u8, g: u8, r: u8) -> [u8; 3] {
    let r = srgb_to_linear(r as f64 / 255.0);
    let g = srgb_to_linear(g as f64 / 255.0);
    let b = srgb_to_linear(b as f64 / 255.0);

    // Linear RGB -> XYZ, normalized by the D65 white point
    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / 0.950456;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / 1.088754;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > 0.008856 { 116.0 * fy - 16.0 } else { 903.3 * y };
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);

    [
        saturate_u8(l * 255.0 / 100.0),
        saturate_u8(a + 128.0),
        saturate_u8(bb + 128.0),
    ]
}

fn map_bgr(input: ArrayView3<u8>, convert: impl Fn(u8, u8, u8) -> [u8; 3]) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 3));

    for y in 0..height {
        for x in 0..width {
            let px = convert(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            for (c, v) in px.into_iter().enumerate() {
                output[[y, x, c]] = v;
            }
        }
    }

    output
}

// ============================================================================
// Image conversions
// ============================================================================

/// Convert a BGR image to HSV.
pub fn bgr_to_hsv_u8(input: ArrayView3<u8>) -> Array3<u8> {
    map_bgr(input, bgr_to_hsv)
}

/// Convert a BGR image to YUV.
pub fn bgr_to_yuv_u8(input: ArrayView3<u8>) -> Array3<u8> {
    map_bgr(input, bgr_to_yuv)
}

/// Convert a BGR image to CIE L*a*b*.
pub fn bgr_to_lab_u8(input: ArrayView3<u8>) -> Array3<u8> {
    map_bgr(input, bgr_to_lab)
}
