//! Pipeline executor.
//!
//! A pipeline is an ordered list of [`FilterStep`]s. Each step is resolved
//! against the [`Registry`] and applied to the output of the previous step.
//! Unknown commands and unmet grayscale preconditions are soft failures:
//! they are logged, recorded as [`Diagnostic`]s, and the image passes
//! through unchanged. Any operation error aborts the run.

use std::fmt;

use log::{debug, warn};
use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::params::Params;
use crate::registry::Registry;

/// One operation invocation: a command identifier and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStep {
    pub command: String,
    #[serde(rename = "additionalParameters", default)]
    pub params: Params,
}

impl FilterStep {
    /// Step with no parameters, so every default applies.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Params::new(),
        }
    }

    pub fn with_params(command: impl Into<String>, params: Params) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }
}

/// A soft failure recorded while running a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No operation is registered under this identifier; the step was skipped
    UnknownCommand { step: usize, command: String },
    /// The operation's channel precondition was not met; the step was a no-op
    ChannelPrecondition {
        step: usize,
        command: String,
        reason: String,
    },
}

impl Diagnostic {
    /// Index of the step that produced the diagnostic.
    pub fn step(&self) -> usize {
        match self {
            Diagnostic::UnknownCommand { step, .. } | Diagnostic::ChannelPrecondition { step, .. } => *step,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownCommand { step, command } => {
                write!(f, "step {step}: unrecognized filter {command:?}, skipped")
            }
            Diagnostic::ChannelPrecondition {
                step,
                command,
                reason,
            } => write!(f, "step {step}: {command}: {reason}"),
        }
    }
}

/// What an operation sees besides its input image.
pub struct StepContext<'a> {
    step: usize,
    command: &'a str,
    params: &'a Params,
    registry: &'a Registry,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> StepContext<'a> {
    pub fn params(&self) -> &'a Params {
        self.params
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Record that the step degraded to a no-op.
    pub fn degrade(&mut self, reason: impl Into<String>) {
        let diagnostic = Diagnostic::ChannelPrecondition {
            step: self.step,
            command: self.command.to_string(),
            reason: reason.into(),
        };
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Final image of a pipeline run plus every soft failure on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub image: Array3<u8>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Ordered list of filter steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    steps: Vec<FilterStep>,
}

impl Pipeline {
    pub fn new(steps: Vec<FilterStep>) -> Self {
        Self { steps }
    }

    /// Parse a JSON array of `{command, additionalParameters}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run against the process-wide registry.
    pub fn apply(&self, image: ArrayView3<u8>) -> Result<PipelineOutput> {
        self.apply_with(Registry::global(), image)
    }

    /// Run against a specific registry.
    pub fn apply_with(&self, registry: &Registry, image: ArrayView3<u8>) -> Result<PipelineOutput> {
        run_steps(registry, image, &self.steps)
    }
}

impl From<Vec<FilterStep>> for Pipeline {
    fn from(steps: Vec<FilterStep>) -> Self {
        Self::new(steps)
    }
}

impl FromIterator<FilterStep> for Pipeline {
    fn from_iter<I: IntoIterator<Item = FilterStep>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn run_steps(registry: &Registry, image: ArrayView3<u8>, steps: &[FilterStep]) -> Result<PipelineOutput> {
    // The caller's image is never touched
    let mut current = image.to_owned();
    let mut diagnostics = Vec::new();

    for (step, filter) in steps.iter().enumerate() {
        let Some(operation) = registry.lookup(&filter.command) else {
            let diagnostic = Diagnostic::UnknownCommand {
                step,
                command: filter.command.clone(),
            };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
            continue;
        };

        debug!(
            "step {step}: {} on {:?} with {} parameter(s)",
            operation.name(),
            current.dim(),
            filter.params.len()
        );

        let mut ctx = StepContext {
            step,
            command: operation.name(),
            params: &filter.params,
            registry,
            diagnostics: &mut diagnostics,
        };
        current = operation.apply(current.view(), &mut ctx)?;
    }

    if current.is_empty() {
        return Err(FilterError::ProcessingFailed(format!(
            "pipeline produced an empty image {:?}",
            current.dim()
        )));
    }

    Ok(PipelineOutput {
        image: current,
        diagnostics,
    })
}

/// Apply `steps` to `image` with the process-wide registry.
///
/// Diagnostics are logged but not returned; use [`Pipeline::apply`] to
/// inspect them.
pub fn apply_filters(image: ArrayView3<u8>, steps: &[FilterStep]) -> Result<Array3<u8>> {
    run_steps(Registry::global(), image, steps).map(|out| out.image)
}

/// Run one independent pipeline per image, in parallel.
///
/// Results are returned in input order. A failure in one run does not
/// affect the others.
pub fn process_batch(images: &[Array3<u8>], pipeline: &Pipeline) -> Vec<Result<PipelineOutput>> {
    images
        .par_iter()
        .map(|image| pipeline.apply(image.view()))
        .collect()
}
