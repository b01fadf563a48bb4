//! StagPipeline
//!
//! Applies an ordered list of image filters to one raster image, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Images are `ndarray` arrays of shape (height, width, channels), 8-bit:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **Color**: (height, width, 3) - BGR order (channel 0 = blue)
//!
//! Steps may change the channel count: grayscale conversion, Canny,
//! Laplacian and every threshold produce a single channel, and the next step
//! receives that image.
//!
//! ## Pipeline
//! ```
//! use ndarray::Array3;
//! use stag_pipeline::{apply_filters, FilterStep, Params};
//!
//! let image = Array3::<u8>::from_elem((4, 4, 3), 255);
//! let steps = vec![
//!     FilterStep::new("COLOR_RGB2GRAY"),
//!     FilterStep::with_params("BLUR", Params::new().with("Kernel", 3i64)),
//!     FilterStep::new("THRESHOLD"),
//! ];
//! let result = apply_filters(image.view(), &steps).unwrap();
//! assert_eq!(result.dim(), (4, 4, 1));
//! assert!(result.iter().all(|&v| v == 255));
//! ```
//!
//! Unknown commands and grayscale conversion of a non-color image are
//! skipped with a logged diagnostic; see [`pipeline`] for the full policy.

pub mod error;
pub mod filters;
pub mod params;
pub mod pipeline;
pub mod registry;

#[cfg(feature = "codec")]
pub mod codec;
#[cfg(feature = "codec")]
pub mod service;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{FilterError, Result};
pub use params::{AdaptiveMethod, Depth, ParamValue, Params};
pub use pipeline::{apply_filters, process_batch, Diagnostic, FilterStep, Pipeline, PipelineOutput};
pub use registry::{Command, Registry};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::FilterError;
    use crate::pipeline::Pipeline;
    use crate::registry::Registry;
    use crate::service;

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Apply a filter pipeline to a u8 image.
    ///
    /// # Arguments
    /// * `image` - Array of shape (height, width, 1 or 3), BGR order
    /// * `filters_json` - JSON list of `{"command": ..., "additionalParameters": {...}}`
    ///
    /// # Returns
    /// New array; the channel count may differ from the input
    #[pyfunction]
    pub fn apply_filters<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        filters_json: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let pipeline = Pipeline::from_json(filters_json)?;
        let output = pipeline.apply(image.as_array())?;
        Ok(output.image.into_pyarray(py))
    }

    /// Handle a JSON request (`{"image": <base64>, "filters": [...]}`).
    ///
    /// Always returns a JSON response; failures are reported in its `error` field.
    #[pyfunction]
    pub fn process_image(request_json: &str) -> String {
        service::process_request_json(request_json)
    }

    /// Identifiers accepted in the `command` field.
    #[pyfunction]
    pub fn filter_commands() -> Vec<&'static str> {
        Registry::global().commands().collect()
    }

    #[pymodule]
    pub fn stag_pipeline(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(apply_filters, m)?)?;
        m.add_function(wrap_pyfunction!(process_image, m)?)?;
        m.add_function(wrap_pyfunction!(filter_commands, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::stag_pipeline;
