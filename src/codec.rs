//! Transport codec: base64 text to raster and back.
//!
//! Decoding accepts any PNG or JPEG payload, optionally wrapped in a
//! `data:<mime>;base64,` URL, and always yields a 3-channel BGR image.
//! Encoding accepts 1 or 3 channels.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

/// Compressed format of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: OutputFormat,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg { quality: 95 },
        }
    }
}

impl EncodeOptions {
    pub fn png() -> Self {
        Self {
            format: OutputFormat::Png,
        }
    }
}

/// Strip an optional data-URL prefix and any whitespace.
fn base64_payload(text: &str) -> String {
    let body = match text.find(";base64,") {
        Some(pos) if text.starts_with("data:") => &text[pos + ";base64,".len()..],
        _ => text,
    };
    body.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Decode compressed image bytes into a BGR raster.
pub fn decode_image(bytes: &[u8]) -> Result<Array3<u8>> {
    let decoded = image::load_from_memory(bytes).map_err(|e| FilterError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut output = Array3::<u8>::zeros((height as usize, width as usize, 3));
    for (x, y, px) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        output[[y, x, 0]] = px[2];
        output[[y, x, 1]] = px[1];
        output[[y, x, 2]] = px[0];
    }

    Ok(output)
}

/// Decode base64 text into a BGR raster.
pub fn decode_base64_image(text: &str) -> Result<Array3<u8>> {
    let bytes = STANDARD
        .decode(base64_payload(text))
        .map_err(|e| FilterError::Decode(e.to_string()))?;
    decode_image(&bytes)
}

/// Encode a 1-channel or BGR raster into compressed bytes.
pub fn encode_image(image: ArrayView3<u8>, options: &EncodeOptions) -> Result<Vec<u8>> {
    let (height, width, channels) = image.dim();
    let (raw, color) = match channels {
        1 => (image.iter().copied().collect::<Vec<u8>>(), ExtendedColorType::L8),
        3 => {
            let mut raw = Vec::with_capacity(height * width * 3);
            for y in 0..height {
                for x in 0..width {
                    raw.extend_from_slice(&[image[[y, x, 2]], image[[y, x, 1]], image[[y, x, 0]]]);
                }
            }
            (raw, ExtendedColorType::Rgb8)
        }
        actual => {
            return Err(FilterError::ChannelMismatch {
                operation: "encode",
                expected: "1 or 3",
                actual,
            })
        }
    };

    let (w, h) = (width as u32, height as u32);
    let mut buffer = Vec::new();
    let written = match options.format {
        OutputFormat::Jpeg { quality } => {
            JpegEncoder::new_with_quality(&mut buffer, quality).write_image(&raw, w, h, color)
        }
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(&raw, w, h, color),
    };
    written.map_err(|e| FilterError::Encode(e.to_string()))?;

    Ok(buffer)
}

/// Encode a raster and wrap it as base64 text.
pub fn encode_base64_image(image: ArrayView3<u8>, options: &EncodeOptions) -> Result<String> {
    Ok(STANDARD.encode(encode_image(image, options)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_bgr(height: usize, width: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((height, width, 3));
        for y in 0..height {
            for x in 0..width {
                img[[y, x, 0]] = (x * 40) as u8;
                img[[y, x, 1]] = (y * 40) as u8;
                img[[y, x, 2]] = 200;
            }
        }
        img
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let img = gradient_bgr(4, 5);
        let text = encode_base64_image(img.view(), &EncodeOptions::png()).unwrap();
        assert_eq!(decode_base64_image(&text).unwrap(), img);
    }

    #[test]
    fn test_gray_decodes_as_three_channels() {
        let mut gray = Array3::<u8>::zeros((3, 3, 1));
        gray[[1, 1, 0]] = 180;
        let text = encode_base64_image(gray.view(), &EncodeOptions::png()).unwrap();
        let decoded = decode_base64_image(&text).unwrap();
        assert_eq!(decoded.dim(), (3, 3, 3));
        assert_eq!(decoded[[1, 1, 0]], 180);
        assert_eq!(decoded[[1, 1, 2]], 180);
    }

    #[test]
    fn test_jpeg_encodes() {
        let img = gradient_bgr(8, 8);
        let bytes = encode_image(img.view(), &EncodeOptions::default()).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode_image(&bytes).unwrap().dim(), (8, 8, 3));
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let img = gradient_bgr(2, 2);
        let text = encode_base64_image(img.view(), &EncodeOptions::png()).unwrap();
        let wrapped = format!("data:image/png;base64,{}\n", text);
        assert_eq!(decode_base64_image(&wrapped).unwrap(), img);
    }

    #[test]
    fn test_bad_payloads_are_decode_errors() {
        assert!(matches!(decode_base64_image("@@@"), Err(FilterError::Decode(_))));
        let not_an_image = STANDARD.encode(b"plain text");
        assert!(matches!(decode_base64_image(&not_an_image), Err(FilterError::Decode(_))));
    }

    #[test]
    fn test_four_channels_rejected() {
        let img = Array3::<u8>::zeros((2, 2, 4));
        assert!(matches!(
            encode_image(img.view(), &EncodeOptions::png()),
            Err(FilterError::ChannelMismatch { actual: 4, .. })
        ));
    }
}
