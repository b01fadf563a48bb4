//! Error types for the filter pipeline.
//!
//! Only hard failures are errors. Soft failures (unknown commands, channel
//! preconditions that degrade to a no-op) are recorded as
//! [`Diagnostic`](crate::pipeline::Diagnostic) values instead.

use thiserror::Error;

/// Hard failure raised by an operation, the codec, or the request boundary.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Request lacks a required top-level input
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    /// Operation cannot run on an image with this channel count
    #[error("{operation} expects {expected} channel(s), got {actual}")]
    ChannelMismatch {
        operation: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// Raw pixel buffer does not match the declared shape
    #[error("invalid image shape: {0}")]
    InvalidShape(String),

    /// Input bytes could not be decoded into a raster
    #[error("decode error: {0}")]
    Decode(String),

    /// Raster could not be encoded
    #[error("encode error: {0}")]
    Encode(String),

    /// Request payload is malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pipeline produced no usable image
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

impl From<ndarray::ShapeError> for FilterError {
    fn from(err: ndarray::ShapeError) -> Self {
        FilterError::InvalidShape(err.to_string())
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::InvalidRequest(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FilterError>;
