//! WebAssembly exports for the filter pipeline.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Pixel data
//! crosses the boundary as flat interleaved bytes in (row, column, channel)
//! order, BGR for color.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::pipeline::Pipeline;
use crate::registry::Registry;
use crate::service;

fn to_js_error(err: crate::error::FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Pipeline
// ============================================================================

/// Result of a pipeline run. The channel count may differ from the input.
#[wasm_bindgen]
pub struct FilteredImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    data: Vec<u8>,
}

#[wasm_bindgen]
impl FilteredImage {
    #[wasm_bindgen(getter)]
    pub fn data(&self) -> Vec<u8> {
        self.data.clone()
    }
}

fn run_pipeline(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    filters_json: &str,
) -> Result<FilteredImage, JsValue> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec())
        .map_err(|e| to_js_error(e.into()))?;
    let pipeline = Pipeline::from_json(filters_json).map_err(to_js_error)?;

    let output = pipeline.apply(input.view()).map_err(to_js_error)?;
    let (height, width, channels) = output.image.dim();
    Ok(FilteredImage {
        width,
        height,
        channels,
        data: output.image.into_raw_vec_and_offset().0,
    })
}

/// Apply a filter pipeline to raw pixels.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1 (grayscale) or 3 (BGR)
/// * `filters_json` - JSON list of `{"command": ..., "additionalParameters": {...}}`
///
/// # Returns
/// Flat array of the filtered pixels. Its length is width * height when the
/// pipeline ends on a single-channel operation; use
/// [`apply_filters_shaped_wasm`] to get the channel count back.
#[wasm_bindgen]
pub fn apply_filters_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    filters_json: &str,
) -> Result<Vec<u8>, JsValue> {
    run_pipeline(data, width, height, channels, filters_json).map(|image| image.data)
}

/// Like [`apply_filters_wasm`], returning the output dimensions with the pixels.
#[wasm_bindgen]
pub fn apply_filters_shaped_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    filters_json: &str,
) -> Result<FilteredImage, JsValue> {
    run_pipeline(data, width, height, channels, filters_json)
}

// ============================================================================
// Request boundary
// ============================================================================

/// Handle a JSON request (`{"image": <base64>, "filters": [...]}`) and
/// return the JSON response.
#[wasm_bindgen]
pub fn process_image_wasm(request_json: &str) -> String {
    service::process_request_json(request_json)
}

/// Identifiers accepted in the `command` field.
#[wasm_bindgen]
pub fn filter_commands_wasm() -> Vec<String> {
    Registry::global().commands().map(str::to_string).collect()
}
