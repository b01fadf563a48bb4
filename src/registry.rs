//! Filter registry: command identifiers mapped to operations.
//!
//! The registry is built once per process and never mutated afterwards. It
//! also owns the two symbol tables that turn string parameters into enum
//! values (`ddepth` and `AdaptiveType`).
//!
//! Each entry is an adapter with the signature [`OperationFn`]: it reads its
//! parameters from the [`StepContext`], applies defaults, checks channel
//! preconditions and calls the pure filter in [`crate::filters`].

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};
use crate::filters::kernels::StructuringElement;
use crate::filters::{blur, color_science, edge, grayscale, morphology, threshold};
use crate::params::{AdaptiveMethod, Depth};
use crate::pipeline::StepContext;

/// Parameter names as sent by clients.
pub mod keys {
    pub const KERNEL: &str = "Kernel";
    pub const THRESHOLD_1: &str = "Threshold 1";
    pub const THRESHOLD_2: &str = "Threshold 2";
    pub const DEPTH: &str = "ddepth";
    pub const WEIGHT_X: &str = "x";
    pub const WEIGHT_Y: &str = "y";
    pub const MIN: &str = "Min";
    pub const MAX: &str = "Max";
    pub const ADAPTIVE_TYPE: &str = "AdaptiveType";
    pub const ELEMENT_SIZE: &str = "px";
}

/// Built-in operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Identity,
    ToGrayscale,
    ToHsv,
    ToYuv,
    ToLab,
    Blur,
    Canny,
    Sobel,
    Laplacian,
    Prewitt,
    Roberts,
    Otsu,
    AdaptiveThreshold,
    Threshold,
    Erode,
    Dilate,
    Open,
    Close,
}

impl Command {
    pub const ALL: [Command; 18] = [
        Command::Identity,
        Command::ToGrayscale,
        Command::ToHsv,
        Command::ToYuv,
        Command::ToLab,
        Command::Blur,
        Command::Canny,
        Command::Sobel,
        Command::Laplacian,
        Command::Prewitt,
        Command::Roberts,
        Command::Otsu,
        Command::AdaptiveThreshold,
        Command::Threshold,
        Command::Erode,
        Command::Dilate,
        Command::Open,
        Command::Close,
    ];

    /// Identifier used in filter steps.
    pub fn wire_name(self) -> &'static str {
        match self {
            Command::Identity => "COLOR_RGB2RGB",
            Command::ToGrayscale => "COLOR_RGB2GRAY",
            Command::ToHsv => "COLOR_RGB2HSV",
            Command::ToYuv => "COLOR_RGB2YUV",
            Command::ToLab => "COLOR_RGB2LAB",
            Command::Blur => "BLUR",
            Command::Canny => "CANNY",
            Command::Sobel => "SOBEL",
            Command::Laplacian => "LAPLACIAN",
            Command::Prewitt => "PREWITT",
            Command::Roberts => "ROBERTS",
            Command::Otsu => "OTSU",
            Command::AdaptiveThreshold => "ADAPTIVE_THRESHOLD",
            Command::Threshold => "THRESHOLD",
            Command::Erode => "EROSION",
            Command::Dilate => "MORPH_DILATE",
            Command::Open => "OPENING",
            Command::Close => "CLOSING",
        }
    }

    fn operation(self) -> OperationFn {
        match self {
            Command::Identity => identity,
            Command::ToGrayscale => to_grayscale,
            Command::ToHsv => to_hsv,
            Command::ToYuv => to_yuv,
            Command::ToLab => to_lab,
            Command::Blur => box_blur,
            Command::Canny => canny,
            Command::Sobel => sobel,
            Command::Laplacian => laplacian,
            Command::Prewitt => prewitt,
            Command::Roberts => roberts,
            Command::Otsu => otsu,
            Command::AdaptiveThreshold => adaptive_threshold,
            Command::Threshold => fixed_threshold,
            Command::Erode => erode,
            Command::Dilate => dilate,
            Command::Open => open,
            Command::Close => close,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Signature shared by every registry entry.
pub type OperationFn = fn(ArrayView3<u8>, &mut StepContext<'_>) -> Result<Array3<u8>>;

/// A registered operation.
#[derive(Clone, Copy)]
pub struct Operation {
    name: &'static str,
    apply: OperationFn,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
        (self.apply)(input, ctx)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

/// Lookup tables for operations and symbolic parameter values.
#[derive(Debug)]
pub struct Registry {
    order: Vec<&'static str>,
    operations: HashMap<&'static str, Operation>,
    depths: HashMap<&'static str, Depth>,
    adaptive_methods: HashMap<&'static str, AdaptiveMethod>,
}

impl Registry {
    /// Process-wide registry with the built-in operations.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::builtin)
    }

    /// Registry without operations but with the symbol tables filled in.
    pub fn empty() -> Self {
        let depths = HashMap::from([
            ("cv2.CV_8U", Depth::U8),
            ("cv2.CV_16U", Depth::U16),
            ("cv2.CV_16S", Depth::I16),
            ("cv2.CV_32F", Depth::F32),
            ("cv2.CV_64F", Depth::F64),
        ]);
        let adaptive_methods = HashMap::from([
            ("cv2.ADAPTIVE_THRESH_MEAN_C", AdaptiveMethod::Mean),
            ("cv2.ADAPTIVE_THRESH_GAUSSIAN_C", AdaptiveMethod::Gaussian),
        ]);

        Self {
            order: Vec::new(),
            operations: HashMap::new(),
            depths,
            adaptive_methods,
        }
    }

    /// Registry with every [`Command`].
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for command in Command::ALL {
            registry.register(command.wire_name(), command.operation());
        }
        registry
    }

    /// Add or replace an operation. Replacing keeps the original position.
    pub fn register(&mut self, name: &'static str, apply: OperationFn) {
        if self.operations.insert(name, Operation { name, apply }).is_none() {
            self.order.push(name);
        }
    }

    pub fn lookup(&self, command: &str) -> Option<&Operation> {
        self.operations.get(command)
    }

    /// Registered identifiers in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Resolve a depth symbol; unknown or absent symbols mean 8-bit unsigned.
    pub fn depth(&self, symbol: Option<&str>) -> Depth {
        symbol
            .and_then(|s| self.depths.get(s).copied())
            .unwrap_or_default()
    }

    /// Resolve an adaptive method symbol; unknown or absent symbols mean mean.
    pub fn adaptive_method(&self, symbol: Option<&str>) -> AdaptiveMethod {
        symbol
            .and_then(|s| self.adaptive_methods.get(s).copied())
            .unwrap_or_default()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Operation adapters
// ============================================================================

fn require_bgr(input: ArrayView3<u8>, operation: &'static str) -> Result<()> {
    match input.dim().2 {
        3 => Ok(()),
        actual => Err(FilterError::ChannelMismatch {
            operation,
            expected: "3",
            actual,
        }),
    }
}

fn identity(input: ArrayView3<u8>, _ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    Ok(input.to_owned())
}

fn to_grayscale(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let channels = input.dim().2;
    if channels != 3 {
        ctx.degrade(format!(
            "image has {channels} channel(s), grayscale conversion needs 3; left unchanged"
        ));
        return Ok(input.to_owned());
    }
    Ok(grayscale::bgr_to_gray_u8(input))
}

fn to_hsv(input: ArrayView3<u8>, _ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    require_bgr(input, "COLOR_RGB2HSV")?;
    Ok(color_science::bgr_to_hsv_u8(input))
}

fn to_yuv(input: ArrayView3<u8>, _ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    require_bgr(input, "COLOR_RGB2YUV")?;
    Ok(color_science::bgr_to_yuv_u8(input))
}

fn to_lab(input: ArrayView3<u8>, _ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    require_bgr(input, "COLOR_RGB2LAB")?;
    Ok(color_science::bgr_to_lab_u8(input))
}

fn box_blur(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let ksize = ctx.params().size_or(keys::KERNEL, 1);
    Ok(blur::box_blur_u8(input, ksize))
}

fn canny(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let params = ctx.params();
    let low = params.f64_or(keys::THRESHOLD_1, 0.0);
    let high = params.f64_or(keys::THRESHOLD_2, 0.0);
    Ok(edge::canny_u8(input, low, high))
}

fn sobel(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let depth = ctx.registry().depth(ctx.params().text(keys::DEPTH));
    Ok(edge::sobel_u8(input, depth))
}

fn laplacian(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let depth = ctx.registry().depth(ctx.params().text(keys::DEPTH));
    edge::laplacian_u8(input, depth)
}

/// Directional weights are given in percent.
fn directional_weights(ctx: &StepContext<'_>) -> (f64, f64) {
    let params = ctx.params();
    (
        params.f64_or(keys::WEIGHT_X, 0.0) / 100.0,
        params.f64_or(keys::WEIGHT_Y, 0.0) / 100.0,
    )
}

fn prewitt(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let (wx, wy) = directional_weights(ctx);
    Ok(edge::prewitt_u8(input, wx, wy))
}

fn roberts(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let (wx, wy) = directional_weights(ctx);
    Ok(edge::roberts_u8(input, wx, wy))
}

fn otsu(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let params = ctx.params();
    let min = params.u8_or(keys::MIN, 0);
    let max = params.u8_or(keys::MAX, 255);
    threshold::otsu_threshold_u8(input, min, max)
}

fn adaptive_threshold(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    let max = ctx.params().u8_or(keys::MAX, 255);
    let method = ctx
        .registry()
        .adaptive_method(ctx.params().text(keys::ADAPTIVE_TYPE));
    threshold::adaptive_threshold_u8(input, max, method)
}

fn fixed_threshold(input: ArrayView3<u8>, _ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    threshold::fixed_threshold_u8(input)
}

fn element(ctx: &StepContext<'_>) -> StructuringElement {
    StructuringElement::square(ctx.params().size_or(keys::ELEMENT_SIZE, 0))
}

fn erode(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    Ok(morphology::erode_u8(input, element(ctx)))
}

fn dilate(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    Ok(morphology::dilate_u8(input, element(ctx)))
}

fn open(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    Ok(morphology::open_u8(input, element(ctx)))
}

fn close(input: ArrayView3<u8>, ctx: &mut StepContext<'_>) -> Result<Array3<u8>> {
    Ok(morphology::close_u8(input, element(ctx)))
}
