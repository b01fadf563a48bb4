use ndarray::Array3;

/// Uniform BGR image.
pub fn solid_bgr(height: usize, width: usize, value: u8) -> Array3<u8> {
    Array3::from_elem((height, width, 3), value)
}

/// BGR image whose top half is white and bottom half black.
pub fn split_white_black_bgr(height: usize, width: usize) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height / 2 {
        for x in 0..width {
            for c in 0..3 {
                img[[y, x, c]] = 255;
            }
        }
    }
    img
}

/// Single-channel binary image with a filled square of 255 on 0.
pub fn square_u8(size: usize, top: usize, left: usize, side: usize) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((size, size, 1));
    for y in top..top + side {
        for x in left..left + side {
            img[[y, x, 0]] = 255;
        }
    }
    img
}

/// BGR image with distinct values per channel and smooth diagonal variation.
pub fn gradient_bgr(height: usize, width: usize) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            img[[y, x, 0]] = ((x * 255) / width.max(1)) as u8;
            img[[y, x, 1]] = ((y * 255) / height.max(1)) as u8;
            img[[y, x, 2]] = (((x + y) * 127) / (width + height).max(1)) as u8;
        }
    }
    img
}

/// Number of non-zero samples.
pub fn foreground_count(img: &Array3<u8>) -> usize {
    img.iter().filter(|&&v| v != 0).count()
}

/// BGR image whose left half is black and right half white.
pub fn vertical_step_bgr(height: usize, width: usize) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in width / 2..width {
            for c in 0..3 {
                img[[y, x, c]] = 255;
            }
        }
    }
    img
}
