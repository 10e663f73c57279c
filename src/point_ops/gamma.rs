//! Gamma correction: forward, inverse, region-adaptive and heuristic detection.
//!
//! Power-law transfer `out = c * (x / 255)^gamma * 255`.
//!
//! | gamma | Effect |
//! |-------|--------|
//! | < 1 | brightens, lifts shadows |
//! | 1 | identity (with c = 1) |
//! | > 1 | darkens, compresses shadows |

use ndarray::{s, Array2, ArrayD, ArrayViewD};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{
    ensure_not_empty, gray_view, histogram_256, saturate_value, validate_image, validate_numeric, Sample,
};
use crate::error::{CvError, CvResult};

/// Lower clamp of normalized input so zero never meets a negative power.
const MIN_NORMALIZED: f64 = 1e-7;
/// Bounds of a derived per-region gamma.
const REGION_GAMMA_MIN: f64 = 0.3;
const REGION_GAMMA_MAX: f64 = 3.0;

/// Candidate gammas tried by [`detect_gamma`] when none are given.
pub const DEFAULT_GAMMA_CANDIDATES: [f64; 7] = [0.5, 0.7, 1.0, 1.4, 1.8, 2.2, 2.8];

/// Power-law transfer of one sample on the 0-255 scale, unsaturated.
#[inline]
pub fn gamma_value(v: f64, gamma: f64, c: f64) -> f64 {
    let normalized = (v / 255.0).clamp(MIN_NORMALIZED, 1.0);
    c * normalized.powf(gamma) * 255.0
}

fn gamma_map<T: Sample>(image: &ArrayViewD<T>, gamma: f64, c: f64) -> ArrayD<u8> {
    image.mapv(|v| saturate_value(gamma_value(v.to_f64(), gamma, c)))
}

// ============================================================================
// Gamma Correction
// ============================================================================

/// Apply power-law gamma correction.
///
/// # Arguments
/// * `image` - `(H, W)` or `(H, W, 3)` buffer
/// * `gamma` - Exponent (0.1-5.0)
/// * `c` - Output gain (0.1-5.0)
///
/// # Returns
/// Saturated u8 buffer
pub fn gamma_correct<T: Sample>(image: ArrayViewD<T>, gamma: f64, c: f64) -> CvResult<ArrayD<u8>> {
    validate_numeric(gamma, "gamma", Some(0.1), Some(5.0))?;
    validate_numeric(c, "c", Some(0.1), Some(5.0))?;
    let dims = validate_image(&image, "image")?;
    trace!(height = dims.height, width = dims.width, gamma, c, "gamma_correct");

    Ok(gamma_map(&image, gamma, c))
}

/// Undo a gamma correction by applying `1 / original_gamma`.
///
/// `original_gamma` must lie in [0.2, 10] so the inverse stays in the
/// accepted gamma range.
pub fn invert_gamma<T: Sample>(image: ArrayViewD<T>, original_gamma: f64) -> CvResult<ArrayD<u8>> {
    validate_numeric(original_gamma, "original_gamma", Some(0.2), Some(10.0))?;
    gamma_correct(image, 1.0 / original_gamma, 1.0)
}

/// Region layout (rows, columns) for adaptive gamma.
fn region_grid(regions: usize) -> CvResult<(usize, usize)> {
    match regions {
        2 => Ok((2, 1)),
        4 => Ok((2, 2)),
        8 => Ok((2, 4)),
        other => Err(CvError::InvalidArgument(format!(
            "regions must be 2, 4 or 8, got {other}"
        ))),
    }
}

/// Split `len` into `parts` contiguous spans; the last span takes the remainder.
fn split_bounds(len: usize, parts: usize) -> Vec<(usize, usize)> {
    let step = len / parts;
    (0..parts)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == parts { len } else { start + step };
            (start, end)
        })
        .collect()
}

/// Gamma correction with one gamma per rectangular region.
///
/// The single-channel image is split into a 2×1, 2×2 or 2×4 grid. Each
/// region gets `base_gamma + (mean / 128 - 1) * adaptation_factor`, clamped
/// to [0.3, 3.0], so dark regions are brightened and bright regions
/// darkened. Regions are corrected independently; seams at region borders
/// are expected.
///
/// # Arguments
/// * `image` - `(H, W)` buffer
/// * `regions` - 2, 4 or 8
/// * `base_gamma` - Gamma of a region with mean 128
/// * `adaptation_factor` - Adaptation strength (0.0-1.0)
pub fn gamma_adaptive_by_region<T: Sample>(
    image: ArrayViewD<T>,
    regions: usize,
    base_gamma: f64,
    adaptation_factor: f64,
) -> CvResult<ArrayD<u8>> {
    let (rows, cols) = region_grid(regions)?;
    validate_numeric(base_gamma, "base_gamma", None, None)?;
    validate_numeric(adaptation_factor, "adaptation_factor", Some(0.0), Some(1.0))?;
    let input = gray_view(image, "image")?;
    let (height, width) = input.dim();
    trace!(height, width, regions, base_gamma, adaptation_factor, "gamma_adaptive_by_region");

    let mut output = Array2::<u8>::zeros((height, width));

    for &(y1, y2) in &split_bounds(height, rows) {
        for &(x1, x2) in &split_bounds(width, cols) {
            let region = input.slice(s![y1..y2, x1..x2]);
            if region.is_empty() {
                continue;
            }

            let mean = region.iter().map(|v| v.to_f64()).sum::<f64>() / region.len() as f64;
            let gamma = (base_gamma + (mean / 128.0 - 1.0) * adaptation_factor)
                .clamp(REGION_GAMMA_MIN, REGION_GAMMA_MAX);
            debug!(y1, y2, x1, x2, mean, gamma, "region gamma");

            output
                .slice_mut(s![y1..y2, x1..x2])
                .zip_mut_with(&region, |out, &v| *out = saturate_value(gamma_value(v.to_f64(), gamma, 1.0)));
        }
    }

    Ok(output.into_dyn())
}

// ============================================================================
// Gamma Detection
// ============================================================================

/// Diagnostics for one candidate gamma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GammaCandidateScore {
    pub gamma: f64,
    /// Lower is more natural.
    pub score: f64,
    /// Fraction of samples in the 10 darkest and 10 brightest bins.
    pub extremes: f64,
    /// `1 - std(hist) / mean(hist)`.
    pub uniformity: f64,
    /// Distance of the mean from mid-gray, normalized to [0, 1].
    pub asymmetry: f64,
    pub mean: f64,
    pub std: f64,
}

/// Result of [`detect_gamma`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GammaDetection {
    pub detected_gamma: f64,
    /// `1 - score` of the winning candidate.
    pub confidence: f64,
    /// One entry per candidate, in input order.
    pub candidates: Vec<GammaCandidateScore>,
}

fn score_candidate<T: Sample>(image: &ArrayViewD<T>, gamma: f64) -> GammaCandidateScore {
    let corrected = gamma_map(image, 1.0 / gamma, 1.0);
    let hist = histogram_256(&corrected.view());

    let total = hist.iter().sum::<u64>() as f64;
    let tails = hist[..10].iter().chain(&hist[246..]).sum::<u64>() as f64;
    let extremes = tails / total;

    let hist_mean = total / 256.0;
    let hist_var = hist
        .iter()
        .map(|&h| (h as f64 - hist_mean) * (h as f64 - hist_mean))
        .sum::<f64>()
        / 256.0;
    let uniformity = 1.0 - hist_var.sqrt() / hist_mean;

    let n = corrected.len() as f64;
    let mean = corrected.iter().map(|&v| v as f64).sum::<f64>() / n;
    let std = (corrected.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n).sqrt();
    let asymmetry = (mean - 127.5).abs() / 127.5;

    GammaCandidateScore {
        gamma,
        score: extremes + 0.3 * uniformity + 0.2 * asymmetry,
        extremes,
        uniformity,
        asymmetry,
        mean,
        std,
    }
}

/// Estimate which gamma was applied to an image.
///
/// Each candidate is undone with `1 / gamma` and the result is scored by
/// how much mass sits in the extreme bins, how uneven the histogram is, and
/// how far the mean is from mid-gray. The lowest score wins; ties go to the
/// earlier candidate. This is a heuristic and can be wrong on synthetic or
/// heavily processed images.
///
/// # Arguments
/// * `image` - `(H, W)` buffer with at least one pixel
/// * `candidates` - Gammas to try, default [`DEFAULT_GAMMA_CANDIDATES`]
pub fn detect_gamma<T: Sample>(image: ArrayViewD<T>, candidates: Option<&[f64]>) -> CvResult<GammaDetection> {
    let candidates = candidates.unwrap_or(&DEFAULT_GAMMA_CANDIDATES);
    if candidates.is_empty() {
        return Err(CvError::InvalidArgument("no candidate gammas given".to_string()));
    }
    for &gamma in candidates {
        validate_numeric(gamma, "candidate gamma", Some(f64::MIN_POSITIVE), Some(f64::MAX))?;
    }
    let input = gray_view(image, "image")?.into_dyn();
    ensure_not_empty(&input, "image")?;
    trace!(height = input.shape()[0], width = input.shape()[1], candidates = candidates.len(), "detect_gamma");

    let scores: Vec<GammaCandidateScore> = candidates
        .par_iter()
        .map(|&gamma| score_candidate(&input, gamma))
        .collect();

    let mut best = scores[0];
    for candidate in &scores[1..] {
        if candidate.score < best.score {
            best = *candidate;
        }
    }
    debug!(gamma = best.gamma, score = best.score, "detected gamma");

    Ok(GammaDetection {
        detected_gamma: best.gamma,
        confidence: 1.0 - best.score,
        candidates: scores,
    })
}

// ============================================================================
// Curve Sampling
// ============================================================================

/// Sampled transfer curve for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GammaCurve {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

/// Sample `255 * (x / 255)^gamma` at `n_points` evenly spaced inputs in [0, 255].
pub fn generate_gamma_curve(gamma: f64, n_points: usize) -> CvResult<GammaCurve> {
    validate_numeric(gamma, "gamma", Some(f64::MIN_POSITIVE), None)?;
    if n_points < 2 {
        return Err(CvError::InvalidArgument(format!(
            "a curve needs at least 2 points, got {n_points}"
        )));
    }

    let step = 255.0 / (n_points - 1) as f64;
    let input: Vec<f64> = (0..n_points).map(|i| i as f64 * step).collect();
    let output = input.iter().map(|x| (x / 255.0).powf(gamma) * 255.0).collect();
    Ok(GammaCurve { input, output })
}
