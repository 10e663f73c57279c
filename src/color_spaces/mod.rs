//! Color space conversions.
//!
//! Every codec takes an `(H, W, 3)` buffer and returns a byte-encoded buffer
//! of the same extent; plane extractors return `(H, W)`.
//!
//! ## Submodules
//!
//! - [`grayscale`]: 3 → 1 channel reduction (BT.601, BT.709, mean, ...)
//! - [`ycbcr`]: BT.601 full-range luma/chroma
//! - [`hsv`]: hue/saturation/value with halved hue bytes
//! - [`lab`]: CIE L*a*b* under D65
//! - [`srgb`]: transfer curves, Lab nonlinearity and matrices

pub mod grayscale;
pub mod hsv;
pub mod lab;
pub mod srgb;
pub mod ycbcr;

pub use grayscale::{channel_statistics, luminance_weights, to_grayscale, ChannelStatistics, GrayscaleMethod};
pub use hsv::{
    extract_hue, filter_by_color, hsv_to_rgb, named_hsv_ranges, rgb_to_hsv, HsvColor, HsvTolerance, NamedHsvRange,
};
pub use lab::{
    d65_white_point, delta_e, extract_lightness, lab_to_rgb, rgb_to_lab, srgb_to_xyz_matrix, xyz_to_srgb_matrix,
};
pub use ycbcr::{
    extract_chroma, extract_luma, rgb_to_ycbcr, ycbcr_coefficients, ycbcr_to_rgb, ChromaComponent, YCbCrCoefficients,
};
