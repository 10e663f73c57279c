//! Point operations: every output sample depends only on the input sample
//! at the same position (plus, for arithmetic, the matching sample of a
//! second image).
//!
//! ## Submodules
//!
//! - [`brightness_contrast`]: linear gain/offset, range remap, piecewise curves
//! - [`gamma`]: power-law correction, adaptive and detected gamma
//! - [`normalization`]: min-max, z-score, percentile, adaptive local stretch,
//!   local equalization
//! - [`arithmetic`]: two-image combination and derived operations

pub mod arithmetic;
pub mod brightness_contrast;
pub mod gamma;
pub mod normalization;

pub use arithmetic::{
    alpha_blend, apply_mask, background_subtract, combine, compare_metrics, detect_temporal_motion,
    flat_field_correct, fuse_exposures, ArithmeticOp, BackgroundSubtraction, ComparisonMetrics, MotionMethod,
};
pub use brightness_contrast::{
    adjust_brightness_contrast, apply_piecewise_curve, remap_range, transform_statistics, TransformStatistics,
};
pub use gamma::{
    detect_gamma, gamma_adaptive_by_region, gamma_correct, generate_gamma_curve, invert_gamma,
    GammaCandidateScore, GammaCurve, GammaDetection, DEFAULT_GAMMA_CANDIDATES,
};
pub use normalization::{
    equalize_histogram_local, normalization_metrics, normalize_adaptive_local, normalize_min_max, normalize_percentile,
    normalize_z_score, NormalizationMetrics,
};
