//! Filter modules for the pipeline operations.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | BGR8 | (H, W, 3) | u8 | Blue, green, red, 0-255 |
//!
//! Channel count is inferred from input array dimensions.
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - take an `ArrayView3<u8>` and return a new `Array3<u8>`
//! - **8-bit in, 8-bit out** - wider intermediates are re-quantized
//! - **No parameter parsing** - defaults and symbol lookup live in the registry
//!
//! ## Filter Categories
//!
//! - **Color**: grayscale, HSV, YUV, Lab (require BGR input)
//! - **Smoothing**: box blur
//! - **Edge detection**: Canny, Sobel, Laplacian, Prewitt, Roberts
//! - **Thresholding**: Otsu, adaptive, fixed
//! - **Morphology**: erode, dilate, open, close

pub mod core;
pub mod kernels;
pub mod grayscale;
pub mod color_science;
pub mod blur;
pub mod edge;
pub mod threshold;
pub mod morphology;
