//! Intensity normalization: min-max stretch, z-score, percentile clipping,
//! overlapping-window adaptive stretch and tile-wise histogram equalization.

use ndarray::{s, Array2, ArrayD, ArrayViewD, Zip};
use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{
    ensure_not_empty, gray_view, histogram_256, image_statistics, saturate_value, validate_image, validate_numeric,
    Sample,
};
use crate::error::{CvError, CvResult};

/// Standard deviation below which an image counts as flat for z-scoring.
const FLAT_STD: f64 = 1e-6;

/// Stretch the image's own [min, max] linearly onto [new_min, new_max].
///
/// A uniform image becomes `new_min` everywhere.
///
/// # Arguments
/// * `image` - `(H, W)` or `(H, W, 3)` buffer with at least one sample
/// * `new_min` - Output minimum (0-254)
/// * `new_max` - Output maximum (new_min + 1 to 255)
pub fn normalize_min_max<T: Sample>(image: ArrayViewD<T>, new_min: f64, new_max: f64) -> CvResult<ArrayD<u8>> {
    validate_numeric(new_min, "new_min", Some(0.0), Some(254.0))?;
    validate_numeric(new_max, "new_max", Some(new_min + 1.0), Some(255.0))?;
    let dims = validate_image(&image, "image")?;
    ensure_not_empty(&image, "image")?;
    trace!(height = dims.height, width = dims.width, new_min, new_max, "normalize_min_max");

    let stats = image_statistics(image.view())?;
    if stats.max == stats.min {
        debug!(value = stats.min, "uniform image, filling with new_min");
        return Ok(image.mapv(|_| saturate_value(new_min)));
    }

    let scale = (new_max - new_min) / (stats.max - stats.min);
    Ok(image.mapv(|v| saturate_value((v.to_f64() - stats.min) * scale + new_min)))
}

/// Standardize to zero mean and unit variance, then rescale to
/// `target_mean` and `target_std`.
///
/// An image whose std is below 1e-6 becomes `target_mean` everywhere.
pub fn normalize_z_score<T: Sample>(image: ArrayViewD<T>, target_mean: f64, target_std: f64) -> CvResult<ArrayD<u8>> {
    validate_numeric(target_mean, "target_mean", None, None)?;
    validate_numeric(target_std, "target_std", Some(0.0), None)?;
    let dims = validate_image(&image, "image")?;
    ensure_not_empty(&image, "image")?;
    trace!(height = dims.height, width = dims.width, target_mean, target_std, "normalize_z_score");

    let stats = image_statistics(image.view())?;
    if stats.std < FLAT_STD {
        debug!(std = stats.std, "flat image, filling with target_mean");
        return Ok(image.mapv(|_| saturate_value(target_mean)));
    }

    Ok(image.mapv(|v| saturate_value((v.to_f64() - stats.mean) / stats.std * target_std + target_mean)))
}

/// Percentile of sorted data with linear interpolation between ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Clip to the [low, high] percentile values, then stretch onto [0, 255].
///
/// More robust to isolated outliers than [`normalize_min_max`]. When both
/// percentiles coincide the image becomes 127 everywhere.
///
/// # Errors
/// [`CvError::InvalidArgument`] unless `0 <= low < high <= 100`.
pub fn normalize_percentile<T: Sample>(image: ArrayViewD<T>, low: f64, high: f64) -> CvResult<ArrayD<u8>> {
    if !(0.0 <= low && low < high && high <= 100.0) {
        return Err(CvError::InvalidArgument(format!(
            "percentiles must satisfy 0 <= low < high <= 100, got ({low}, {high})"
        )));
    }
    let dims = validate_image(&image, "image")?;
    ensure_not_empty(&image, "image")?;
    trace!(height = dims.height, width = dims.width, low, high, "normalize_percentile");

    let mut sorted: Vec<f64> = image.iter().map(|v| v.to_f64()).collect();
    sorted.sort_by(f64::total_cmp);
    let lo = percentile(&sorted, low);
    let hi = percentile(&sorted, high);

    if hi == lo {
        debug!(value = lo, "degenerate percentile range, filling with 127");
        return Ok(image.mapv(|_| 127u8));
    }

    Ok(image.mapv(|v| saturate_value((v.to_f64().max(lo).min(hi) - lo) / (hi - lo) * 255.0)))
}

/// Weight mask that fades linearly to 0 over `fade` samples at every edge.
///
/// The outermost ring has weight 0; corners multiply both fades.
fn edge_fade_mask(height: usize, width: usize, fade: usize) -> Array2<f64> {
    let mut mask = Array2::<f64>::ones((height, width));
    for i in 0..fade {
        let weight = i as f64 / fade as f64;
        if i < width {
            mask.column_mut(i).mapv_inplace(|m| m * weight);
            mask.column_mut(width - 1 - i).mapv_inplace(|m| m * weight);
        }
        if i < height {
            mask.row_mut(i).mapv_inplace(|m| m * weight);
            mask.row_mut(height - 1 - i).mapv_inplace(|m| m * weight);
        }
    }
    mask
}

/// Min-max stretch over overlapping `window × window` tiles, blended with an
/// edge-fade weight.
///
/// Tiles start every `window * (1 - overlap)` samples and only full tiles
/// are used. Each tile is stretched to [0, 255] with [`normalize_min_max`]
/// and weighted by a mask fading over `window / 8` samples at its borders.
/// The output is the weighted mean; samples no tile weights (the image
/// border when `window >= 8`, or the whole image when it is smaller than one
/// tile) are 0.
///
/// # Arguments
/// * `image` - `(H, W)` buffer
/// * `window` - Tile side (>= 1)
/// * `overlap` - Fraction of a tile shared with its neighbour, in [0, 1)
///
/// # Errors
/// * [`CvError::Range`] if `overlap` is outside [0, 1)
/// * [`CvError::InvalidArgument`] if `window` is 0 or the step rounds to 0
pub fn normalize_adaptive_local<T: Sample>(image: ArrayViewD<T>, window: usize, overlap: f64) -> CvResult<ArrayD<u8>> {
    if window == 0 {
        return Err(CvError::InvalidArgument("window must be at least 1".to_string()));
    }
    if !(0.0..1.0).contains(&overlap) {
        return Err(CvError::Range {
            name: "overlap".to_string(),
            value: overlap,
            expected: "expected [0, 1)".to_string(),
        });
    }
    let step = (window as f64 * (1.0 - overlap)) as usize;
    if step == 0 {
        return Err(CvError::InvalidArgument(format!(
            "window {window} with overlap {overlap} gives a step of 0"
        )));
    }
    let input = gray_view(image, "image")?;
    let (height, width) = input.dim();
    trace!(height, width, window, overlap, step, "normalize_adaptive_local");

    let mut weighted = Array2::<f64>::zeros((height, width));
    let mut weight_sum = Array2::<f64>::zeros((height, width));

    if height < window || width < window {
        debug!("image smaller than one window, output is black");
    } else {
        let mask = edge_fade_mask(window, window, window / 8).into_dyn();
        for y in (0..=height - window).step_by(step) {
            for x in (0..=width - window).step_by(step) {
                let tile = input.slice(s![y..y + window, x..x + window]).into_dyn();
                let stretched = normalize_min_max(tile, 0.0, 255.0)?;

                let mut acc = weighted.slice_mut(s![y..y + window, x..x + window]).into_dyn();
                let mut total = weight_sum.slice_mut(s![y..y + window, x..x + window]).into_dyn();
                Zip::from(&mut acc)
                    .and(&mut total)
                    .and(&stretched)
                    .and(&mask)
                    .for_each(|acc, total, &v, &w| {
                        *acc += v as f64 * w;
                        *total += w;
                    });
            }
        }
    }

    Ok(Zip::from(&weighted)
        .and(&weight_sum)
        .map_collect(|&v, &w| saturate_value(v / if w == 0.0 { 1.0 } else { w }))
        .into_dyn())
}

/// Histogram-equalize each non-overlapping `window × window` tile on its own.
///
/// Tiles at the right and bottom edges may be smaller. Each tile maps a
/// sample through its own cumulative histogram scaled to [0, 255]; samples
/// between integer levels interpolate between neighbouring CDF entries.
pub fn equalize_histogram_local<T: Sample>(image: ArrayViewD<T>, window: usize) -> CvResult<ArrayD<u8>> {
    if window == 0 {
        return Err(CvError::InvalidArgument("window must be at least 1".to_string()));
    }
    let input = gray_view(image, "image")?;
    let (height, width) = input.dim();
    trace!(height, width, window, "equalize_histogram_local");

    let mut output = Array2::<u8>::zeros((height, width));

    for y in (0..height).step_by(window) {
        for x in (0..width).step_by(window) {
            let y2 = (y + window).min(height);
            let x2 = (x + window).min(width);
            let tile = input.slice(s![y..y2, x..x2]);

            // Unit-width bins over [0, 256)
            let mut hist = [0u64; 256];
            for &v in tile.iter() {
                let v = v.to_f64();
                if (0.0..256.0).contains(&v) {
                    hist[v as usize] += 1;
                }
            }
            let mut cdf = [0f64; 256];
            let mut running = 0u64;
            for (level, &count) in hist.iter().enumerate() {
                running += count;
                cdf[level] = running as f64;
            }
            let last = cdf[255];
            if last > 0.0 {
                cdf.iter_mut().for_each(|c| *c = *c * 255.0 / last);
            }

            output
                .slice_mut(s![y..y2, x..x2])
                .zip_mut_with(&tile, |out, &v| *out = saturate_value(lookup_cdf(&cdf, v.to_f64())));
        }
    }

    Ok(output.into_dyn())
}

/// Piecewise-linear lookup of `v` in a 256-entry table indexed by level.
fn lookup_cdf(cdf: &[f64; 256], v: f64) -> f64 {
    if v.is_nan() || v <= 0.0 {
        return cdf[0];
    }
    if v >= 255.0 {
        return cdf[255];
    }
    let lower = v.floor() as usize;
    let frac = v - lower as f64;
    cdf[lower] + (cdf[lower + 1] - cdf[lower]) * frac
}

/// Shannon entropy (bits) of the 256-bin histogram over [0, 255].
fn entropy<T: Sample>(image: &ArrayViewD<T>) -> f64 {
    let hist = histogram_256(image);
    let total = hist.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0.0;
    }
    hist.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Quality indicators comparing an image before and after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationMetrics {
    pub original_range: (f64, f64),
    pub normalized_range: (f64, f64),
    /// `(max - min) / 255` of the original.
    pub original_range_utilization: f64,
    pub normalized_range_utilization: f64,
    pub original_mean: f64,
    pub normalized_mean: f64,
    pub original_std: f64,
    pub normalized_std: f64,
    /// Entropy in bits, at most 8.
    pub original_entropy: f64,
    pub normalized_entropy: f64,
}

pub fn normalization_metrics<A: Sample, B: Sample>(
    original: ArrayViewD<A>,
    normalized: ArrayViewD<B>,
) -> CvResult<NormalizationMetrics> {
    validate_image(&original, "original")?;
    validate_image(&normalized, "normalized")?;

    let before = image_statistics(original.view())?;
    let after = image_statistics(normalized.view())?;

    Ok(NormalizationMetrics {
        original_range: (before.min, before.max),
        normalized_range: (after.min, after.max),
        original_range_utilization: (before.max - before.min) / 255.0,
        normalized_range_utilization: (after.max - after.min) / 255.0,
        original_mean: before.mean,
        normalized_mean: after.mean,
        original_std: before.std,
        normalized_std: after.std,
        original_entropy: entropy(&original),
        normalized_entropy: entropy(&normalized),
    })
}
