//! Inter-image arithmetic and the operations built on it.
//!
//! [`combine`] is the single elementwise kernel; blending, background
//! subtraction, flat-field correction and motion maps are compositions of it.
//! All binary operations require identical shapes.

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    ensure_not_empty, saturate_to_byte, saturate_value, validate_image, validate_matching_shapes, validate_numeric,
    Sample, SampleKind,
};
use crate::error::{CvError, CvResult};

/// Adaptation rate of the running background in [`MotionMethod::RunningBackground`].
const BACKGROUND_RATE: f64 = 0.1;

// ============================================================================
// Combine
// ============================================================================

/// Elementwise operation applied by [`combine`].
///
/// | Op | Formula |
/// |----|---------|
/// | `sum` | w1·a + w2·b |
/// | `difference` | a − b |
/// | `product` | a·b / 255 |
/// | `ratio` | a / (b, or 1 where b = 0) · 255 |
/// | `weighted_average` | (w1·a + w2·b) / (w1 + w2) |
/// | `absolute_difference` | \|a − b\| |
/// | `max` / `min` | elementwise extrema |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Sum,
    Difference,
    Product,
    Ratio,
    WeightedAverage,
    AbsoluteDifference,
    Max,
    Min,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 8] = [
        Self::Sum,
        Self::Difference,
        Self::Product,
        Self::Ratio,
        Self::WeightedAverage,
        Self::AbsoluteDifference,
        Self::Max,
        Self::Min,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Difference => "difference",
            Self::Product => "product",
            Self::Ratio => "ratio",
            Self::WeightedAverage => "weighted_average",
            Self::AbsoluteDifference => "absolute_difference",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArithmeticOp {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CvError::InvalidOperation(s.to_string()))
    }
}

/// Combine two equally shaped images elementwise, then saturate.
///
/// # Arguments
/// * `a`, `b` - `(H, W)` or `(H, W, 3)` buffers of identical shape
/// * `op` - Operation, see [`ArithmeticOp`]
/// * `w1`, `w2` - Weights for `sum` and `weighted_average` (>= 0), ignored otherwise
///
/// # Returns
/// Saturated u8 buffer. `weighted_average` with both weights zero returns all
/// zeros; a zero denominator in `ratio` is replaced by 1.
pub fn combine<A: Sample, B: Sample>(
    a: ArrayViewD<A>,
    b: ArrayViewD<B>,
    op: ArithmeticOp,
    w1: f64,
    w2: f64,
) -> CvResult<ArrayD<u8>> {
    let dims = validate_image(&a, "img1")?;
    validate_image(&b, "img2")?;
    validate_matching_shapes(&a, &b, "img1", "img2")?;
    if matches!(op, ArithmeticOp::Sum | ArithmeticOp::WeightedAverage) {
        validate_numeric(w1, "weight1", Some(0.0), None)?;
        validate_numeric(w2, "weight2", Some(0.0), None)?;
    }
    trace!(height = dims.height, width = dims.width, %op, w1, w2, "combine");

    if op == ArithmeticOp::WeightedAverage && w1 + w2 == 0.0 {
        debug!("both weights are zero, output is black");
        return Ok(ArrayD::zeros(a.raw_dim()));
    }

    let kernel = |x: f64, y: f64| -> f64 {
        match op {
            ArithmeticOp::Sum => w1 * x + w2 * y,
            ArithmeticOp::Difference => x - y,
            ArithmeticOp::Product => x * y / 255.0,
            ArithmeticOp::Ratio => x / if y == 0.0 { 1.0 } else { y } * 255.0,
            ArithmeticOp::WeightedAverage => (w1 * x + w2 * y) / (w1 + w2),
            ArithmeticOp::AbsoluteDifference => (x - y).abs(),
            ArithmeticOp::Max => x.max(y),
            ArithmeticOp::Min => x.min(y),
        }
    };

    Ok(Zip::from(&a)
        .and(&b)
        .map_collect(|&x, &y| saturate_value(kernel(x.to_f64(), y.to_f64()))))
}

/// Linear blend `alpha * a + (1 - alpha) * b`.
pub fn alpha_blend<A: Sample, B: Sample>(a: ArrayViewD<A>, b: ArrayViewD<B>, alpha: f64) -> CvResult<ArrayD<u8>> {
    validate_numeric(alpha, "alpha", Some(0.0), Some(1.0))?;
    combine(a, b, ArithmeticOp::WeightedAverage, alpha, 1.0 - alpha)
}

// ============================================================================
// Derived Operations
// ============================================================================

/// Output of [`background_subtract`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSubtraction {
    /// `|current - background|`, same shape as the inputs.
    pub difference: ArrayD<u8>,
    /// `(H, W)` mask, 255 where the difference exceeds the threshold.
    pub mask: ArrayD<u8>,
}

/// Absolute difference against a background plus a thresholded change mask.
///
/// For 3-channel input a pixel counts as changed when its largest channel
/// difference exceeds `threshold`.
pub fn background_subtract<A: Sample, B: Sample>(
    current: ArrayViewD<A>,
    background: ArrayViewD<B>,
    threshold: f64,
) -> CvResult<BackgroundSubtraction> {
    validate_numeric(threshold, "threshold", Some(0.0), Some(255.0))?;
    let difference = combine(current, background, ArithmeticOp::AbsoluteDifference, 1.0, 1.0)?;

    let intensity = if difference.ndim() == 3 {
        difference.fold_axis(Axis(2), 0u8, |&acc, &v| acc.max(v))
    } else {
        difference.clone()
    };
    let mask = intensity.mapv(|v| if v as f64 > threshold { 255u8 } else { 0 });
    trace!(changed = mask.iter().filter(|&&v| v == 255).count(), threshold, "background_subtract");

    Ok(BackgroundSubtraction { difference, mask })
}

/// Flat-field correction: `(image - dark) / (flat - dark)`, or `image / flat`
/// without a dark frame, scaled to 0-255.
///
/// Each step saturates, so a dark frame brighter than the image clips to 0.
pub fn flat_field_correct<T: Sample>(
    image: ArrayViewD<T>,
    flat: ArrayViewD<T>,
    dark: Option<ArrayViewD<T>>,
) -> CvResult<ArrayD<u8>> {
    validate_matching_shapes(&image, &flat, "image", "flat")?;
    match dark {
        Some(dark) => {
            validate_matching_shapes(&image, &dark, "image", "dark")?;
            let numerator = combine(image, dark.view(), ArithmeticOp::Difference, 1.0, 1.0)?;
            let denominator = combine(flat, dark, ArithmeticOp::Difference, 1.0, 1.0)?;
            combine(numerator.view(), denominator.view(), ArithmeticOp::Ratio, 1.0, 1.0)
        }
        None => combine(image, flat, ArithmeticOp::Ratio, 1.0, 1.0),
    }
}

/// Weighted mean of several exposures of the same scene.
///
/// # Arguments
/// * `images` - One or more buffers of identical shape
/// * `weights` - One weight per image, uniform if `None`
///
/// # Errors
/// * [`CvError::InvalidArgument`] for an empty list, a weight count that
///   does not match, or weights summing to zero or less
/// * [`CvError::ShapeMismatch`] if any image differs in shape from the first
pub fn fuse_exposures<T: Sample>(images: &[ArrayViewD<T>], weights: Option<&[f64]>) -> CvResult<ArrayD<u8>> {
    let first = images
        .first()
        .ok_or_else(|| CvError::InvalidArgument("no images to fuse".to_string()))?;
    let dims = validate_image(first, "images[0]")?;
    for (i, image) in images.iter().enumerate().skip(1) {
        let name = format!("images[{i}]");
        validate_image(image, &name)?;
        validate_matching_shapes(first, image, "images[0]", &name)?;
    }

    let uniform = vec![1.0; images.len()];
    let weights = weights.unwrap_or(&uniform[..]);
    if weights.len() != images.len() {
        return Err(CvError::InvalidArgument(format!(
            "got {} weights for {} images",
            weights.len(),
            images.len()
        )));
    }
    for &w in weights {
        validate_numeric(w, "weight", None, None)?;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(CvError::InvalidArgument(format!(
            "weights must sum to a positive value, got {total}"
        )));
    }
    trace!(height = dims.height, width = dims.width, count = images.len(), total, "fuse_exposures");

    let mut accumulator = ArrayD::<f64>::zeros(first.raw_dim());
    for (image, &w) in images.iter().zip(weights) {
        accumulator.zip_mut_with(image, |acc, &v| *acc += v.to_f64() * w);
    }
    Ok(accumulator.mapv(|v| saturate_value(v / total)))
}

/// Blend an image toward `background_value` where the mask is low.
///
/// A `u8` mask is scaled by 1/255; any other mask type is clamped to [0, 1].
/// Output is `image * m + background_value * (1 - m)`.
pub fn apply_mask<A: Sample, M: Sample>(
    image: ArrayViewD<A>,
    mask: ArrayViewD<M>,
    background_value: f64,
) -> CvResult<ArrayD<u8>> {
    let dims = validate_image(&image, "image")?;
    validate_matching_shapes(&image, &mask, "image", "mask")?;
    validate_numeric(background_value, "background_value", None, None)?;
    trace!(height = dims.height, width = dims.width, mask_type = M::KIND.name(), background_value, "apply_mask");

    let normalize = |m: f64| {
        if M::KIND == SampleKind::U8 {
            m / 255.0
        } else {
            m.clamp(0.0, 1.0)
        }
    };

    Ok(Zip::from(&image).and(&mask).map_collect(|&v, &m| {
        let m = normalize(m.to_f64());
        saturate_value(v.to_f64() * m + background_value * (1.0 - m))
    }))
}

// ============================================================================
// Motion
// ============================================================================

/// Strategy for [`detect_temporal_motion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMethod {
    /// `|frame[i] - frame[i-1]|`
    #[default]
    ConsecutiveDifference,
    /// `|frame[i] - frame[0]|`
    ReferenceDifference,
    /// `|frame[i] - background|`, with the background an exponential moving
    /// average of the frames seen so far
    RunningBackground,
}

impl MotionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConsecutiveDifference => "consecutive_difference",
            Self::ReferenceDifference => "reference_difference",
            Self::RunningBackground => "running_background",
        }
    }
}

impl fmt::Display for MotionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionMethod {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consecutive_difference" => Ok(Self::ConsecutiveDifference),
            "reference_difference" => Ok(Self::ReferenceDifference),
            "running_background" => Ok(Self::RunningBackground),
            other => Err(CvError::InvalidMethod(other.to_string())),
        }
    }
}

/// Motion maps for a frame sequence, one per frame after the first.
///
/// # Errors
/// * [`CvError::InvalidArgument`] with fewer than 2 frames
/// * [`CvError::ShapeMismatch`] if frames differ in shape
pub fn detect_temporal_motion<T: Sample>(frames: &[ArrayViewD<T>], method: MotionMethod) -> CvResult<Vec<ArrayD<u8>>> {
    if frames.len() < 2 {
        return Err(CvError::InvalidArgument(format!(
            "motion detection needs at least 2 frames, got {}",
            frames.len()
        )));
    }
    let first = &frames[0];
    validate_image(first, "frames[0]")?;
    for (i, frame) in frames.iter().enumerate().skip(1) {
        let name = format!("frames[{i}]");
        validate_image(frame, &name)?;
        validate_matching_shapes(first, frame, "frames[0]", &name)?;
    }
    trace!(frames = frames.len(), %method, "detect_temporal_motion");

    let absolute_difference =
        |a: &ArrayViewD<T>, b: &ArrayViewD<T>| combine(a.view(), b.view(), ArithmeticOp::AbsoluteDifference, 1.0, 1.0);

    match method {
        MotionMethod::ConsecutiveDifference => (1..frames.len())
            .into_par_iter()
            .map(|i| absolute_difference(&frames[i], &frames[i - 1]))
            .collect(),
        MotionMethod::ReferenceDifference => (1..frames.len())
            .into_par_iter()
            .map(|i| absolute_difference(&frames[i], first))
            .collect(),
        MotionMethod::RunningBackground => {
            let mut background = first.mapv(T::to_f64);
            let mut maps = Vec::with_capacity(frames.len() - 1);
            for frame in &frames[1..] {
                let snapshot = saturate_to_byte(background.view());
                maps.push(combine(frame.view(), snapshot.view(), ArithmeticOp::AbsoluteDifference, 1.0, 1.0)?);
                background.zip_mut_with(frame, |bg, &v| {
                    *bg = BACKGROUND_RATE * v.to_f64() + (1.0 - BACKGROUND_RATE) * *bg
                });
            }
            Ok(maps)
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Similarity metrics between two equally shaped images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonMetrics {
    /// Mean absolute error.
    pub mae: f64,
    /// Mean squared error.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB, `+inf` when the images match.
    pub psnr: f64,
    /// Normalized cross-correlation, 0 when either image has zero variance.
    pub correlation: f64,
    pub max_abs_difference: f64,
    /// Mean of `a - b`.
    pub mean_difference: f64,
    pub identical_count: usize,
    pub identical_fraction: f64,
}

/// Compare two images sample by sample.
pub fn compare_metrics<A: Sample, B: Sample>(a: ArrayViewD<A>, b: ArrayViewD<B>) -> CvResult<ComparisonMetrics> {
    validate_image(&a, "img1")?;
    validate_image(&b, "img2")?;
    validate_matching_shapes(&a, &b, "img1", "img2")?;
    ensure_not_empty(&a, "img1")?;
    trace!(samples = a.len(), "compare_metrics");

    let n = a.len() as f64;
    let mean_a = a.iter().map(|v| v.to_f64()).sum::<f64>() / n;
    let mean_b = b.iter().map(|v| v.to_f64()).sum::<f64>() / n;

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut signed_sum = 0.0;
    let mut max_abs: f64 = 0.0;
    let mut identical = 0usize;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    Zip::from(&a).and(&b).for_each(|&x, &y| {
        let (x, y) = (x.to_f64(), y.to_f64());
        let d = x - y;
        abs_sum += d.abs();
        sq_sum += d * d;
        signed_sum += d;
        max_abs = max_abs.max(d.abs());
        if d == 0.0 {
            identical += 1;
        }
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    });

    let mse = sq_sum / n;
    let psnr = if mse > 0.0 {
        10.0 * (255.0 * 255.0 / mse).log10()
    } else {
        f64::INFINITY
    };
    let (std_a, std_b) = ((var_a / n).sqrt(), (var_b / n).sqrt());
    let correlation = if std_a > 0.0 && std_b > 0.0 {
        cov / n / (std_a * std_b)
    } else {
        0.0
    };

    Ok(ComparisonMetrics {
        mae: abs_sum / n,
        mse,
        psnr,
        correlation,
        max_abs_difference: max_abs,
        mean_difference: signed_sum / n,
        identical_count: identical,
        identical_fraction: identical as f64 / n,
    })
}
