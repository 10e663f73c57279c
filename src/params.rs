//! Named parameter records for the tonal operations.
//!
//! Each record carries its documented defaults, checks its own ranges with
//! `validate()`, and runs the matching operation with `apply()`. Records are
//! serde-serializable so they can be loaded from any config format; missing
//! fields fall back to the defaults.
//!
//! Out-of-range values are reported as [`CvError::Range`] and never clamped.
//!
//! [`CvError::Range`]: crate::error::CvError::Range

use ndarray::{ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};

use crate::core::{validate_numeric, Sample};
use crate::error::{CvError, CvResult};
use crate::point_ops::brightness_contrast::{adjust_brightness_contrast, apply_piecewise_curve, prepare_curve_points, remap_range};
use crate::point_ops::gamma::{gamma_adaptive_by_region, gamma_correct};

/// `contrast * x + brightness`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessContrast {
    /// Additive offset (-255 to 255).
    pub brightness: f64,
    /// Multiplicative gain (>= 0).
    pub contrast: f64,
}

impl Default for BrightnessContrast {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

impl BrightnessContrast {
    pub fn validate(&self) -> CvResult<()> {
        validate_numeric(self.brightness, "brightness", Some(-255.0), Some(255.0))?;
        validate_numeric(self.contrast, "contrast", Some(0.0), None)
    }

    pub fn apply<T: Sample>(&self, image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
        adjust_brightness_contrast(image, self.brightness, self.contrast)
    }
}

/// Power-law `c * x^gamma`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaCorrection {
    /// Exponent (0.1-5.0).
    pub gamma: f64,
    /// Gain (0.1-5.0).
    pub c: f64,
}

impl Default for GammaCorrection {
    fn default() -> Self {
        Self { gamma: 1.0, c: 1.0 }
    }
}

impl GammaCorrection {
    pub fn validate(&self) -> CvResult<()> {
        validate_numeric(self.gamma, "gamma", Some(0.1), Some(5.0))?;
        validate_numeric(self.c, "c", Some(0.1), Some(5.0))
    }

    pub fn apply<T: Sample>(&self, image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
        gamma_correct(image, self.gamma, self.c)
    }
}

/// Region-adaptive gamma for single-channel images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveGamma {
    /// 2, 4 or 8.
    pub regions: usize,
    pub base_gamma: f64,
    /// Adaptation strength (0.0-1.0).
    pub adaptation_factor: f64,
}

impl Default for AdaptiveGamma {
    fn default() -> Self {
        Self {
            regions: 4,
            base_gamma: 1.0,
            adaptation_factor: 0.5,
        }
    }
}

impl AdaptiveGamma {
    pub fn validate(&self) -> CvResult<()> {
        if !matches!(self.regions, 2 | 4 | 8) {
            return Err(CvError::InvalidArgument(format!(
                "regions must be 2, 4 or 8, got {}",
                self.regions
            )));
        }
        validate_numeric(self.base_gamma, "base_gamma", None, None)?;
        validate_numeric(self.adaptation_factor, "adaptation_factor", Some(0.0), Some(1.0))
    }

    pub fn apply<T: Sample>(&self, image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
        gamma_adaptive_by_region(image, self.regions, self.base_gamma, self.adaptation_factor)
    }
}

/// Linear remap of `source` onto `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeMapping {
    pub source: (f64, f64),
    pub target: (f64, f64),
}

impl Default for RangeMapping {
    fn default() -> Self {
        Self {
            source: (0.0, 255.0),
            target: (0.0, 255.0),
        }
    }
}

impl RangeMapping {
    pub fn validate(&self) -> CvResult<()> {
        for (name, (lo, hi)) in [("source", self.source), ("target", self.target)] {
            if !(lo < hi) {
                return Err(CvError::InvalidArgument(format!(
                    "{name} interval ({lo}, {hi}) must satisfy min < max"
                )));
            }
        }
        Ok(())
    }

    pub fn apply<T: Sample>(&self, image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
        remap_range(image, self.source, self.target)
    }
}

/// Piecewise-linear tone curve through `(x, y)` control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurve {
    /// Control points in [0, 255], any order, at least 2.
    pub points: Vec<(f64, f64)>,
}

impl Default for ToneCurve {
    /// The identity curve.
    fn default() -> Self {
        Self {
            points: vec![(0.0, 0.0), (255.0, 255.0)],
        }
    }
}

impl ToneCurve {
    pub fn validate(&self) -> CvResult<()> {
        prepare_curve_points(&self.points).map(|_| ())
    }

    pub fn apply<T: Sample>(&self, image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
        apply_piecewise_curve(image, &self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_defaults_are_identity() {
        let img = arr2(&[[0u8, 17, 128, 255]]).into_dyn();
        assert_eq!(BrightnessContrast::default().apply(img.view()).unwrap(), img);
        assert_eq!(GammaCorrection::default().apply(img.view()).unwrap(), img);
        assert_eq!(RangeMapping::default().apply(img.view()).unwrap(), img);
        assert_eq!(ToneCurve::default().apply(img.view()).unwrap(), img);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(BrightnessContrast::default().validate().is_ok());
        assert!(GammaCorrection::default().validate().is_ok());
        assert!(AdaptiveGamma::default().validate().is_ok());
        assert!(RangeMapping::default().validate().is_ok());
        assert!(ToneCurve::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let bc = BrightnessContrast {
            brightness: 400.0,
            contrast: 1.0,
        };
        assert!(matches!(bc.validate(), Err(CvError::Range { .. })));

        let gamma = GammaCorrection { gamma: 9.0, c: 1.0 };
        assert!(matches!(gamma.validate(), Err(CvError::Range { .. })));

        let adaptive = AdaptiveGamma {
            regions: 6,
            ..AdaptiveGamma::default()
        };
        assert!(matches!(adaptive.validate(), Err(CvError::InvalidArgument(_))));

        let mapping = RangeMapping {
            source: (10.0, 10.0),
            ..RangeMapping::default()
        };
        assert!(matches!(mapping.validate(), Err(CvError::InvalidArgument(_))));

        let curve = ToneCurve {
            points: vec![(0.0, 0.0), (128.0, 300.0)],
        };
        assert!(matches!(curve.validate(), Err(CvError::Range { .. })));
    }

    #[test]
    fn test_load_from_json_with_defaults() {
        let bc: BrightnessContrast = serde_json::from_str(r#"{"brightness": 25}"#).unwrap();
        assert_eq!(bc.brightness, 25.0);
        assert_eq!(bc.contrast, 1.0);

        let curve: ToneCurve = serde_json::from_str(r#"{"points": [[0, 10], [255, 240]]}"#).unwrap();
        assert_eq!(curve.points, vec![(0.0, 10.0), (255.0, 240.0)]);

        let adaptive: AdaptiveGamma = serde_json::from_str("{}").unwrap();
        assert_eq!(adaptive, AdaptiveGamma::default());
    }

    #[test]
    fn test_adaptive_apply() {
        let img = arr2(&[[40u8, 40], [220, 220]]).into_dyn();
        let params = AdaptiveGamma {
            regions: 2,
            base_gamma: 1.0,
            adaptation_factor: 1.0,
        };
        let result = params.apply(img.view()).unwrap();
        assert!(result[[0, 0]] > 40);
        assert!(result[[1, 0]] < 220);
    }
}
