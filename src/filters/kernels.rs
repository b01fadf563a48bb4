//! Fixed convolution kernels and structuring elements.
//!
//! Kernels are used as correlation masks (not flipped). All of them are
//! compile-time constants shared by every pipeline run.

/// Sobel horizontal derivative
pub const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Sobel vertical derivative
pub const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Prewitt horizontal derivative
pub const PREWITT_X: [[i32; 3]; 3] = [[-1, 0, 1], [-1, 0, 1], [-1, 0, 1]];

/// Prewitt vertical derivative
pub const PREWITT_Y: [[i32; 3]; 3] = [[-1, -1, -1], [0, 0, 0], [1, 1, 1]];

/// Roberts cross, main diagonal
pub const ROBERTS_X: [[i32; 2]; 2] = [[1, 0], [0, -1]];

/// Roberts cross, anti-diagonal
pub const ROBERTS_Y: [[i32; 2]; 2] = [[0, 1], [-1, 0]];

/// 4-neighbour Laplacian aperture
pub const LAPLACIAN: [[i32; 3]; 3] = [[0, 1, 0], [1, -4, 1], [0, 1, 0]];

/// Side length used when a caller asks for an empty structuring element.
pub const DEFAULT_ELEMENT_SIZE: usize = 3;

/// Square all-ones structuring element.
///
/// The anchor is at `(size / 2, size / 2)`, so even sizes extend one sample
/// further up and left than down and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
}

impl StructuringElement {
    /// Build a `px` x `px` element. A zero size yields a 3x3 element.
    pub fn square(px: usize) -> Self {
        let size = if px == 0 { DEFAULT_ELEMENT_SIZE } else { px };
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Shrink the element to at most `2 * max(height, width) + 1`.
    ///
    /// At that size the window already covers the whole image from every
    /// anchor position, and samples outside the image never take part, so
    /// the result of a rank filter is unchanged.
    pub fn fit_to(self, height: usize, width: usize) -> Self {
        let cap = height.max(width).saturating_mul(2).saturating_add(1);
        Self {
            size: self.size.min(cap),
        }
    }

    /// Offsets covered by the element along one axis, relative to the anchor.
    pub fn offsets(&self) -> std::ops::RangeInclusive<isize> {
        let anchor = self.size / 2;
        let after = self.size - 1 - anchor;
        -(anchor as isize)..=(after as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivative_kernels_sum_to_zero() {
        for k in [SOBEL_X, SOBEL_Y, PREWITT_X, PREWITT_Y, LAPLACIAN] {
            assert_eq!(k.iter().flatten().sum::<i32>(), 0);
        }
        for k in [ROBERTS_X, ROBERTS_Y] {
            assert_eq!(k.iter().flatten().sum::<i32>(), 0);
        }
    }

    #[test]
    fn test_square_element_offsets() {
        assert_eq!(StructuringElement::square(3).offsets(), -1..=1);
        assert_eq!(StructuringElement::square(4).offsets(), -2..=1);
        assert_eq!(StructuringElement::square(1).offsets(), 0..=0);
    }

    #[test]
    fn test_huge_element_fits_image() {
        let element = StructuringElement::square(usize::MAX);
        assert_eq!(element.offsets(), -(isize::MAX)..=isize::MAX);

        let fitted = element.fit_to(4, 6);
        assert_eq!(fitted.size(), 13);
        assert_eq!(fitted.offsets(), -6..=6);
        assert_eq!(StructuringElement::square(5).fit_to(4, 6).size(), 5);
    }

    #[test]
    fn test_empty_element_is_3x3() {
        assert_eq!(StructuringElement::square(0).size(), 3);
    }
}
