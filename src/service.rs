//! Request boundary: JSON in, JSON out.
//!
//! A request carries a base64 image and a list of filter steps. The response
//! is either the processed image (base64) or a structured error; transport
//! status codes are left to whoever hosts this.
//!
//! ```text
//! {"image": "<base64>", "filters": [{"command": "BLUR", "additionalParameters": {"Kernel": 5}}]}
//! -> {"message": "Image processed successfully", "processed_image": "<base64>"}
//! -> {"error": "Missing image or filters data"}
//! -> {"error": "Failed to process image"}
//! ```

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_base64_image, encode_base64_image, EncodeOptions};
use crate::error::{FilterError, Result};
use crate::pipeline::{FilterStep, Pipeline};

pub const SUCCESS_MESSAGE: &str = "Image processed successfully";
pub const MISSING_INPUT_MESSAGE: &str = "Missing image or filters data";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image";

/// Incoming request. Both fields are required; absence is reported, not a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub filters: Option<Vec<FilterStep>>,
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessResponse {
    Success {
        message: String,
        processed_image: String,
    },
    Failure {
        error: String,
    },
}

impl ProcessResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessResponse::Success { .. })
    }

    fn failure(message: &str) -> Self {
        ProcessResponse::Failure {
            error: message.to_string(),
        }
    }
}

/// Decode, run the pipeline, encode.
#[derive(Debug, Clone, Default)]
pub struct ImageService {
    encode: EncodeOptions,
}

impl ImageService {
    pub fn new(encode: EncodeOptions) -> Self {
        Self { encode }
    }

    /// Run a request and return the base64 result image.
    pub fn try_process(&self, request: &ProcessRequest) -> Result<String> {
        let image_text = request
            .image
            .as_deref()
            .ok_or(FilterError::MissingInput("image"))?;
        let filters = request
            .filters
            .as_ref()
            .ok_or(FilterError::MissingInput("filters"))?;

        let image = decode_base64_image(image_text)?;
        debug!("decoded {:?}, {} filter step(s)", image.dim(), filters.len());

        let pipeline = Pipeline::new(filters.clone());
        let output = pipeline.apply(image.view())?;
        encode_base64_image(output.image.view(), &self.encode)
    }

    /// Run a request, mapping every failure to one of the two error payloads.
    pub fn process(&self, request: &ProcessRequest) -> ProcessResponse {
        match self.try_process(request) {
            Ok(processed_image) => ProcessResponse::Success {
                message: SUCCESS_MESSAGE.to_string(),
                processed_image,
            },
            Err(FilterError::MissingInput(what)) => {
                error!("request rejected: missing {what}");
                ProcessResponse::failure(MISSING_INPUT_MESSAGE)
            }
            Err(e) => {
                error!("request failed: {e}");
                ProcessResponse::failure(PROCESSING_FAILED_MESSAGE)
            }
        }
    }

    /// JSON string in, JSON string out. Malformed JSON is a processing failure.
    pub fn process_json(&self, body: &str) -> String {
        let response = match serde_json::from_str::<ProcessRequest>(body) {
            Ok(request) => self.process(&request),
            Err(e) => {
                error!("malformed request: {e}");
                ProcessResponse::failure(PROCESSING_FAILED_MESSAGE)
            }
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|_| format!(r#"{{"error":"{PROCESSING_FAILED_MESSAGE}"}}"#))
    }
}

/// [`ImageService::process`] with default encoder settings.
pub fn process_request(request: &ProcessRequest) -> ProcessResponse {
    ImageService::default().process(request)
}

/// [`ImageService::process_json`] with default encoder settings.
pub fn process_request_json(body: &str) -> String {
    ImageService::default().process_json(body)
}
