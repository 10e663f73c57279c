//! Core utilities shared by every transform.
//!
//! This module provides:
//! - The [`Sample`] trait describing accepted element types
//! - Shape, channel, type and range validation
//! - The saturating cast to `u8` that every transform returns through
//! - Small statistics helpers (min/max/mean/std/median, 256-bin histogram)
//!
//! ## Image Layout
//!
//! | Rank | Shape | Meaning |
//! |------|-------|---------|
//! | 2 | (H, W) | Single channel, reported as `channels = 1` |
//! | 3 | (H, W, 3) | RGB (or any 3-component color space) |
//!
//! Byte buffers hold 0-255. Float buffers are interpreted on the same 0-255
//! scale and are only brought back into range by [`saturate_to_byte`].

use ndarray::{ArrayD, ArrayView2, ArrayView3, ArrayViewD, Ix2, Ix3};
use serde::Serialize;

use crate::error::{CvError, CvResult};

// ============================================================================
// Sample Types
// ============================================================================

/// Element type tag for a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    U8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl SampleKind {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Whether buffers of this type are accepted as images.
    pub fn is_image_type(self) -> bool {
        matches!(self, Self::U8 | Self::F32 | Self::F64)
    }
}

/// A numeric element that can be read as `f64`.
///
/// Implemented for the integer types masks and raw frames commonly use,
/// but only `u8`, `f32` and `f64` pass [`validate_image`].
pub trait Sample: Copy + Send + Sync + 'static {
    const KIND: SampleKind;

    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl Sample for $t {
                const KIND: SampleKind = SampleKind::$kind;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u8 => U8, u16 => U16, i16 => I16, i32 => I32, f32 => F32, f64 => F64);

// ============================================================================
// Validation
// ============================================================================

/// Spatial extent and channel count of a validated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDims {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageDims {
    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }
}

/// Validate an image buffer and report its dimensions.
///
/// # Errors
/// * [`CvError::Shape`] if the rank is not 2 or 3
/// * [`CvError::Channel`] if a rank-3 buffer does not have 3 channels
/// * [`CvError::Type`] if the element type is not u8, f32 or f64
pub fn validate_image<T: Sample>(image: &ArrayViewD<'_, T>, name: &str) -> CvResult<ImageDims> {
    let shape = image.shape();
    let dims = match shape.len() {
        2 => ImageDims {
            height: shape[0],
            width: shape[1],
            channels: 1,
        },
        3 => {
            if shape[2] != 3 {
                return Err(CvError::Channel {
                    name: name.to_string(),
                    expected: 3,
                    found: shape[2],
                });
            }
            ImageDims {
                height: shape[0],
                width: shape[1],
                channels: 3,
            }
        }
        ndim => {
            return Err(CvError::Shape {
                name: name.to_string(),
                ndim,
            })
        }
    };

    if !T::KIND.is_image_type() {
        return Err(CvError::Type {
            name: name.to_string(),
            found: T::KIND.name(),
        });
    }

    Ok(dims)
}

/// Validate a 3-channel image and return it as a fixed-rank view.
pub fn rgb_view<'a, T: Sample>(image: ArrayViewD<'a, T>, name: &str) -> CvResult<ArrayView3<'a, T>> {
    let dims = validate_image(&image, name)?;
    if dims.channels != 3 {
        return Err(CvError::Channel {
            name: name.to_string(),
            expected: 3,
            found: dims.channels,
        });
    }
    image.into_dimensionality::<Ix3>().map_err(|_| CvError::Shape {
        name: name.to_string(),
        ndim: 2,
    })
}

/// Validate a single-channel (rank 2) image and return it as a fixed-rank view.
pub fn gray_view<'a, T: Sample>(image: ArrayViewD<'a, T>, name: &str) -> CvResult<ArrayView2<'a, T>> {
    let dims = validate_image(&image, name)?;
    if dims.channels != 1 {
        return Err(CvError::Channel {
            name: name.to_string(),
            expected: 1,
            found: dims.channels,
        });
    }
    image.into_dimensionality::<Ix2>().map_err(|_| CvError::Shape {
        name: name.to_string(),
        ndim: 3,
    })
}

/// Validate a scalar against optional inclusive bounds.
///
/// NaN never satisfies a bound and is always rejected.
pub fn validate_numeric(value: f64, name: &str, min: Option<f64>, max: Option<f64>) -> CvResult<()> {
    let below = min.is_some_and(|lo| value < lo);
    let above = max.is_some_and(|hi| value > hi);
    if !(value.is_nan() || below || above) {
        return Ok(());
    }

    let expected = match (min, max) {
        (Some(lo), Some(hi)) => format!("expected [{lo}, {hi}]"),
        (Some(lo), None) => format!("expected >= {lo}"),
        (None, Some(hi)) => format!("expected <= {hi}"),
        (None, None) => "expected a number".to_string(),
    };
    Err(CvError::Range {
        name: name.to_string(),
        value,
        expected,
    })
}

/// Fail with [`CvError::ShapeMismatch`] unless both buffers share a shape.
pub fn validate_matching_shapes<A, B>(
    a: &ArrayViewD<'_, A>,
    b: &ArrayViewD<'_, B>,
    name_a: &str,
    name_b: &str,
) -> CvResult<()> {
    if a.shape() == b.shape() {
        return Ok(());
    }
    Err(CvError::ShapeMismatch {
        left_name: name_a.to_string(),
        left: a.shape().to_vec(),
        right_name: name_b.to_string(),
        right: b.shape().to_vec(),
    })
}

pub(crate) fn ensure_not_empty<T>(image: &ArrayViewD<'_, T>, name: &str) -> CvResult<()> {
    if image.is_empty() {
        return Err(CvError::InvalidArgument(format!("{name} has no pixels")));
    }
    Ok(())
}

// ============================================================================
// Saturation
// ============================================================================

/// Clamp to [0, 255], round, and cast to `u8`.
///
/// NaN saturates to 0.
#[inline]
pub fn saturate_value(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round() as u8
}

/// Saturate every element of a buffer to `u8`.
///
/// For `u8` input this is a plain copy.
pub fn saturate_to_byte<T: Sample>(image: ArrayViewD<'_, T>) -> ArrayD<u8> {
    image.mapv(|v| saturate_value(v.to_f64()))
}

/// Widen any sample buffer to `f64`.
pub fn to_f64_array<T: Sample>(image: ArrayViewD<'_, T>) -> ArrayD<f64> {
    image.mapv(T::to_f64)
}

// ============================================================================
// Statistics
// ============================================================================

/// Summary statistics over every sample of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
}

/// Compute min, max, mean, population std and median of all samples.
pub fn image_statistics<T: Sample>(image: ArrayViewD<'_, T>) -> CvResult<ImageStatistics> {
    ensure_not_empty(&image, "image")?;

    let mut values: Vec<f64> = image.iter().map(|v| v.to_f64()).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    Ok(ImageStatistics {
        min: values[0],
        max: values[values.len() - 1],
        mean,
        std: variance.sqrt(),
        median,
    })
}

/// 256-bin histogram over the closed range [0, 255].
///
/// Bins are 255/256 wide; 255 itself lands in the last bin. Samples outside
/// the range are not counted.
pub(crate) fn histogram_256<T: Sample>(image: &ArrayViewD<'_, T>) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in image.iter() {
        let v = v.to_f64();
        if !(0.0..=255.0).contains(&v) {
            continue;
        }
        let bin = ((v * 256.0 / 255.0) as usize).min(255);
        hist[bin] += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Array3, Array4, ArrayD, IxDyn};

    #[test]
    fn test_validate_image_gray_reports_one_channel() {
        let img = Array2::<u8>::zeros((4, 5)).into_dyn();
        let dims = validate_image(&img.view(), "img").unwrap();
        assert_eq!(
            dims,
            ImageDims {
                height: 4,
                width: 5,
                channels: 1
            }
        );
    }

    #[test]
    fn test_validate_image_rgb() {
        let img = Array3::<f32>::zeros((2, 3, 3)).into_dyn();
        let dims = validate_image(&img.view(), "img").unwrap();
        assert_eq!(dims.channels, 3);
        assert_eq!(dims.pixel_count(), 6);
    }

    #[test]
    fn test_validate_image_bad_rank() {
        let img = Array4::<u8>::zeros((1, 1, 1, 3)).into_dyn();
        let err = validate_image(&img.view(), "img").unwrap_err();
        assert!(matches!(err, CvError::Shape { ndim: 4, .. }));

        let flat = ArrayD::<u8>::zeros(IxDyn(&[9]));
        assert!(matches!(
            validate_image(&flat.view(), "flat"),
            Err(CvError::Shape { ndim: 1, .. })
        ));
    }

    #[test]
    fn test_validate_image_bad_channels() {
        let img = Array3::<u8>::zeros((2, 2, 4)).into_dyn();
        let err = validate_image(&img.view(), "rgba").unwrap_err();
        assert!(matches!(err, CvError::Channel { expected: 3, found: 4, .. }));
    }

    #[test]
    fn test_validate_image_bad_type() {
        let img = Array2::<u16>::zeros((2, 2)).into_dyn();
        let err = validate_image(&img.view(), "raw").unwrap_err();
        assert_eq!(
            err,
            CvError::Type {
                name: "raw".to_string(),
                found: "u16"
            }
        );
    }

    #[test]
    fn test_gray_view_rejects_rgb() {
        let img = Array3::<u8>::zeros((2, 2, 3)).into_dyn();
        assert!(matches!(
            gray_view(img.view(), "img"),
            Err(CvError::Channel { expected: 1, found: 3, .. })
        ));
    }

    #[test]
    fn test_validate_numeric_bounds() {
        assert!(validate_numeric(0.0, "x", Some(0.0), Some(1.0)).is_ok());
        assert!(validate_numeric(1.0, "x", Some(0.0), Some(1.0)).is_ok());
        assert!(validate_numeric(-0.1, "x", Some(0.0), None).is_err());
        assert!(validate_numeric(1e9, "x", Some(0.0), None).is_ok());
        assert!(validate_numeric(5.1, "x", None, Some(5.0)).is_err());
        assert!(validate_numeric(f64::NAN, "x", None, None).is_err());
    }

    #[test]
    fn test_validate_matching_shapes() {
        let a = Array2::<u8>::zeros((2, 3)).into_dyn();
        let b = Array2::<f64>::zeros((2, 3)).into_dyn();
        let c = Array2::<u8>::zeros((3, 2)).into_dyn();
        assert!(validate_matching_shapes(&a.view(), &b.view(), "a", "b").is_ok());
        let err = validate_matching_shapes(&a.view(), &c.view(), "a", "c").unwrap_err();
        assert!(matches!(err, CvError::ShapeMismatch { .. }));
        assert_eq!(err.to_string(), "a.shape [2, 3] != c.shape [3, 2]");
    }

    #[test]
    fn test_saturate_value() {
        assert_eq!(saturate_value(-10.0), 0);
        assert_eq!(saturate_value(300.0), 255);
        assert_eq!(saturate_value(127.4), 127);
        assert_eq!(saturate_value(127.6), 128);
        assert_eq!(saturate_value(f64::NAN), 0);
        assert_eq!(saturate_value(f64::INFINITY), 255);
    }

    #[test]
    fn test_saturate_idempotent() {
        let img = ndarray::arr2(&[[-3.7, 0.49, 254.5], [255.2, 1000.0, 77.77]]).into_dyn();
        let once = saturate_to_byte(img.view());
        let twice = saturate_to_byte(once.view());
        assert_eq!(once, twice);
        assert_eq!(once.as_slice().unwrap(), &[0, 0, 255, 255, 255, 78]);
    }

    #[test]
    fn test_image_statistics() {
        let img = ndarray::arr2(&[[1u8, 2], [3, 10]]).into_dyn();
        let stats = image_statistics(img.view()).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_relative_eq!(stats.mean, 4.0);
        assert_relative_eq!(stats.median, 2.5);
        assert_relative_eq!(stats.std, 12.5f64.sqrt());
    }

    #[test]
    fn test_image_statistics_empty() {
        let img = Array2::<u8>::zeros((0, 4)).into_dyn();
        assert!(matches!(
            image_statistics(img.view()),
            Err(CvError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_histogram_edges() {
        let img = ndarray::arr1(&[0.0, 254.0, 255.0, 256.0, -1.0]).into_dyn();
        let hist = histogram_256(&img.view());
        assert_eq!(hist[0], 1);
        assert_eq!(hist[254], 1);
        assert_eq!(hist[255], 1);
        assert_eq!(hist.iter().sum::<u64>(), 3);
    }
}
