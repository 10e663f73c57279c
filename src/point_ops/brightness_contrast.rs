//! Linear tonal adjustments: brightness/contrast, range remapping and
//! piecewise-linear curves.
//!
//! All operations accept `(H, W)` or `(H, W, 3)` buffers and apply the same
//! mapping to every sample.

use ndarray::{ArrayD, ArrayViewD};
use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{image_statistics, saturate_value, validate_image, validate_numeric, ImageStatistics, Sample};
use crate::error::{CvError, CvResult};

// ============================================================================
// Brightness / Contrast
// ============================================================================

/// Apply `contrast * x + brightness` to every sample.
///
/// # Arguments
/// * `image` - `(H, W)` or `(H, W, 3)` buffer
/// * `brightness` - Additive offset (-255 to 255)
/// * `contrast` - Multiplicative gain (>= 0, 1.0 = unchanged)
///
/// # Returns
/// Saturated u8 buffer. With `contrast = 0` every sample equals the
/// saturated brightness.
pub fn adjust_brightness_contrast<T: Sample>(
    image: ArrayViewD<T>,
    brightness: f64,
    contrast: f64,
) -> CvResult<ArrayD<u8>> {
    validate_numeric(brightness, "brightness", Some(-255.0), Some(255.0))?;
    validate_numeric(contrast, "contrast", Some(0.0), None)?;
    let dims = validate_image(&image, "image")?;
    trace!(height = dims.height, width = dims.width, brightness, contrast, "adjust_brightness_contrast");

    Ok(image.mapv(|v| saturate_value(contrast * v.to_f64() + brightness)))
}

/// Linearly map `source` onto `target`, then saturate.
///
/// Values outside `source` extrapolate and are clamped by saturation.
///
/// # Errors
/// [`CvError::InvalidArgument`] if either interval is empty or reversed.
pub fn remap_range<T: Sample>(
    image: ArrayViewD<T>,
    source: (f64, f64),
    target: (f64, f64),
) -> CvResult<ArrayD<u8>> {
    let (src_min, src_max) = source;
    let (dst_min, dst_max) = target;
    // Negated so NaN bounds fail too
    if !(src_min < src_max) {
        return Err(CvError::InvalidArgument(format!(
            "source interval ({src_min}, {src_max}) must satisfy min < max"
        )));
    }
    if !(dst_min < dst_max) {
        return Err(CvError::InvalidArgument(format!(
            "target interval ({dst_min}, {dst_max}) must satisfy min < max"
        )));
    }
    let dims = validate_image(&image, "image")?;
    trace!(height = dims.height, width = dims.width, src_min, src_max, dst_min, dst_max, "remap_range");

    let scale = (dst_max - dst_min) / (src_max - src_min);
    Ok(image.mapv(|v| saturate_value((v.to_f64() - src_min) * scale + dst_min)))
}

// ============================================================================
// Piecewise-linear Curves
// ============================================================================

/// Sort control points by x (then y) and check they lie in [0, 255].
pub(crate) fn prepare_curve_points(points: &[(f64, f64)]) -> CvResult<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Err(CvError::InvalidArgument(format!(
            "a curve needs at least 2 points, got {}",
            points.len()
        )));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    for &(x, y) in &sorted {
        validate_numeric(x, "curve point x", Some(0.0), Some(255.0))?;
        validate_numeric(y, "curve point y", Some(0.0), Some(255.0))?;
    }
    Ok(sorted)
}

/// Evaluate a sorted piecewise-linear curve at `x`.
///
/// Inputs left of the first point or right of the last take that point's y.
/// A zero-width segment yields its first y.
pub(crate) fn interpolate_curve(x: f64, points: &[(f64, f64)]) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return x,
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }

    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return y1;
            }
            let t = (x - x1) / (x2 - x1);
            return y1 + t * (y2 - y1);
        }
    }
    x
}

/// Map every sample through a piecewise-linear curve.
///
/// # Arguments
/// * `image` - `(H, W)` or `(H, W, 3)` buffer
/// * `points` - `(x, y)` control points in [0, 255], any order
///
/// # Errors
/// * [`CvError::InvalidArgument`] with fewer than 2 points
/// * [`CvError::Range`] if a point lies outside [0, 255]
pub fn apply_piecewise_curve<T: Sample>(image: ArrayViewD<T>, points: &[(f64, f64)]) -> CvResult<ArrayD<u8>> {
    let sorted = prepare_curve_points(points)?;
    let dims = validate_image(&image, "image")?;
    trace!(height = dims.height, width = dims.width, points = sorted.len(), "apply_piecewise_curve");

    Ok(image.mapv(|v| saturate_value(interpolate_curve(v.to_f64(), &sorted))))
}

// ============================================================================
// Statistics
// ============================================================================

/// Before/after statistics of a tonal transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformStatistics {
    pub original: ImageStatistics,
    pub transformed: ImageStatistics,
    /// Transformed mean minus original mean.
    pub mean_change: f64,
    /// Transformed std minus original std.
    pub std_change: f64,
    /// Transformed std over original std, `+inf` for a flat original.
    pub contrast_factor: f64,
}

/// Compare statistics of an image before and after a transform.
///
/// The two buffers need not share a shape.
pub fn transform_statistics<A: Sample, B: Sample>(
    original: ArrayViewD<A>,
    transformed: ArrayViewD<B>,
) -> CvResult<TransformStatistics> {
    validate_image(&original, "original")?;
    validate_image(&transformed, "transformed")?;

    let before = image_statistics(original)?;
    let after = image_statistics(transformed)?;

    let contrast_factor = if before.std > 0.0 {
        after.std / before.std
    } else {
        debug!("original image is flat, contrast factor is infinite");
        f64::INFINITY
    };

    Ok(TransformStatistics {
        original: before,
        transformed: after,
        mean_change: after.mean - before.mean,
        std_change: after.std - before.std,
        contrast_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::saturate_to_byte;
    use approx::assert_relative_eq;
    use ndarray::{arr2, arr3, Array2};

    #[test]
    fn test_identity() {
        let img = arr2(&[[-5.0, 10.4], [128.5, 400.0]]).into_dyn();
        let result = adjust_brightness_contrast(img.view(), 0.0, 1.0).unwrap();
        assert_eq!(result, saturate_to_byte(img.view()));
    }

    #[test]
    fn test_zero_contrast_is_flat() {
        let img = arr3(&[[[0u8, 100, 255], [50, 60, 70]]]).into_dyn();
        let result = adjust_brightness_contrast(img.view(), 42.0, 0.0).unwrap();
        assert_eq!(result.shape(), &[1, 2, 3]);
        assert!(result.iter().all(|&v| v == 42));

        let negative = adjust_brightness_contrast(img.view(), -10.0, 0.0).unwrap();
        assert!(negative.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_brightness_and_contrast() {
        let img = arr2(&[[10u8, 100, 200]]).into_dyn();
        let result = adjust_brightness_contrast(img.view(), 20.0, 1.5).unwrap();
        assert_eq!(result, arr2(&[[35u8, 170, 255]]).into_dyn());
    }

    #[test]
    fn test_parameter_ranges() {
        let img = Array2::<u8>::zeros((2, 2)).into_dyn();
        assert!(matches!(
            adjust_brightness_contrast(img.view(), 300.0, 1.0),
            Err(CvError::Range { .. })
        ));
        assert!(matches!(
            adjust_brightness_contrast(img.view(), 0.0, -0.5),
            Err(CvError::Range { .. })
        ));
    }

    #[test]
    fn test_remap_range() {
        let img = arr2(&[[20u8, 50, 110, 200, 250]]).into_dyn();
        let result = remap_range(img.view(), (50.0, 200.0), (0.0, 255.0)).unwrap();
        assert_eq!(result, arr2(&[[0u8, 0, 102, 255, 255]]).into_dyn());
    }

    #[test]
    fn test_remap_range_rejects_degenerate() {
        let img = Array2::<u8>::zeros((1, 1)).into_dyn();
        assert!(matches!(
            remap_range(img.view(), (10.0, 10.0), (0.0, 255.0)),
            Err(CvError::InvalidArgument(_))
        ));
        assert!(matches!(
            remap_range(img.view(), (0.0, 255.0), (200.0, 100.0)),
            Err(CvError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_piecewise_curve() {
        let img = arr2(&[[0u8, 32, 64, 128, 255]]).into_dyn();
        // Unordered on purpose
        let points = [(128.0, 200.0), (64.0, 64.0), (255.0, 255.0)];
        let result = apply_piecewise_curve(img.view(), &points).unwrap();
        // Below the first point clamps to its y
        assert_eq!(result, arr2(&[[64u8, 64, 64, 200, 255]]).into_dyn());
    }

    #[test]
    fn test_piecewise_curve_interpolates() {
        let sorted = prepare_curve_points(&[(64.0, 64.0), (128.0, 200.0)]).unwrap();
        assert_relative_eq!(interpolate_curve(96.0, &sorted), 132.0);
        assert_relative_eq!(interpolate_curve(80.0, &sorted), 98.0);
    }

    #[test]
    fn test_piecewise_curve_duplicate_x() {
        let sorted = prepare_curve_points(&[(0.0, 0.0), (100.0, 50.0), (100.0, 150.0), (255.0, 255.0)]).unwrap();
        assert_eq!(interpolate_curve(100.0, &sorted), 50.0);
    }

    #[test]
    fn test_piecewise_curve_validation() {
        let img = Array2::<u8>::zeros((1, 1)).into_dyn();
        assert!(matches!(
            apply_piecewise_curve(img.view(), &[(0.0, 0.0)]),
            Err(CvError::InvalidArgument(_))
        ));
        assert!(matches!(
            apply_piecewise_curve(img.view(), &[(0.0, 0.0), (300.0, 255.0)]),
            Err(CvError::Range { .. })
        ));
    }

    #[test]
    fn test_transform_statistics() {
        let original = arr2(&[[100u8, 100], [150, 150]]).into_dyn();
        let transformed = adjust_brightness_contrast(original.view(), 10.0, 2.0).unwrap();
        let stats = transform_statistics(original.view(), transformed.view()).unwrap();
        assert_relative_eq!(stats.original.mean, 125.0);
        assert_relative_eq!(stats.transformed.mean, 255.0 / 2.0 + 210.0 / 2.0);
        assert_relative_eq!(stats.mean_change, 232.5 - 125.0);
        assert_relative_eq!(stats.contrast_factor, 22.5 / 25.0);
    }

    #[test]
    fn test_transform_statistics_flat_original() {
        let flat = Array2::<u8>::from_elem((3, 3), 7).into_dyn();
        let brighter = adjust_brightness_contrast(flat.view(), 10.0, 1.0).unwrap();
        let stats = transform_statistics(flat.view(), brighter.view()).unwrap();
        assert!(stats.contrast_factor.is_infinite());
        assert_relative_eq!(stats.mean_change, 10.0);
        assert_eq!(stats.std_change, 0.0);
    }
}
