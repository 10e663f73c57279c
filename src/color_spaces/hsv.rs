//! RGB ↔ HSV.
//!
//! Hue is computed in degrees and stored halved so it fits a byte:
//!
//! | Component | Float range | Stored byte |
//! |-----------|-------------|-------------|
//! | H | [0, 360) degrees | round(H / 2), in [0, 179] |
//! | S | [0, 1] | round(S * 255) |
//! | V | [0, 1] | round(V * 255) |
//!
//! The dominant channel is tested in the order r, g, b, so a tie for the
//! maximum goes to the earlier channel.

use ndarray::{Array2, Array3, ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{rgb_view, saturate_value, validate_numeric, Sample};
use crate::error::{CvError, CvResult};

/// Number of stored hue steps around the circle.
const HUE_STEPS: u8 = 180;

// ============================================================================
// Per-pixel Transforms
// ============================================================================

/// Convert one RGB pixel (0-255) to float HSV: (degrees, [0, 1], [0, 1]).
#[inline]
pub fn rgb_pixel_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let r = r / 255.0;
    let g = g / 255.0;
    let b = b / 255.0;

    let max_v = r.max(g).max(b);
    let min_v = r.min(g).min(b);
    let delta = max_v - min_v;

    let s = if max_v == 0.0 { 0.0 } else { delta / max_v };

    let h = if delta == 0.0 {
        0.0
    } else if max_v == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max_v == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (h, s, max_v)
}

/// Convert float HSV back to an RGB pixel on the 0-255 scale (unsaturated).
///
/// # Errors
/// [`CvError::OutOfRangeHue`] if `h` is 360 degrees or more. `stored` in the
/// error is the byte the hue came from.
#[inline]
pub fn hsv_pixel_to_rgb(h: f64, s: f64, v: f64) -> CvResult<(f64, f64, f64)> {
    if !(0.0..360.0).contains(&h) {
        return Err(CvError::OutOfRangeHue {
            stored: saturate_value(h / 2.0),
            degrees: h.max(0.0) as u32,
        });
    }

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0).floor() as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Ok(((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0))
}

/// Encode a float hue as a stored byte. 359.5 degrees and up wrap to 0.
#[inline]
fn encode_hue(h: f64) -> u8 {
    let stored = saturate_value(h / 2.0);
    if stored >= HUE_STEPS {
        0
    } else {
        stored
    }
}

// ============================================================================
// Image Transforms
// ============================================================================

/// Convert an RGB image to byte-encoded HSV.
///
/// # Arguments
/// * `image` - `(H, W, 3)` RGB buffer, values 0-255
///
/// # Returns
/// `(H, W, 3)` u8 buffer with H in [0, 179] and S, V in [0, 255]
pub fn rgb_to_hsv<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "rgb_to_hsv");

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let (h, s, v) = rgb_pixel_to_hsv(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            output[[y, x, 0]] = encode_hue(h);
            output[[y, x, 1]] = saturate_value(s * 255.0);
            output[[y, x, 2]] = saturate_value(v * 255.0);
        }
    }
    Ok(output.into_dyn())
}

/// Convert a byte-encoded HSV image back to RGB.
///
/// # Errors
/// [`CvError::OutOfRangeHue`] if any stored hue is negative, NaN, or 180 or
/// more. The whole buffer is checked before conversion starts.
pub fn hsv_to_rgb<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "hsv_to_rgb");

    if let Some(bad) = input
        .index_axis(ndarray::Axis(2), 0)
        .iter()
        .map(|h| h.to_f64())
        .find(|&h| !(0.0..360.0).contains(&(h * 2.0)))
    {
        return Err(CvError::OutOfRangeHue {
            stored: saturate_value(bad),
            degrees: (bad * 2.0) as u32,
        });
    }

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let h = input[[y, x, 0]].to_f64() * 2.0;
            let s = input[[y, x, 1]].to_f64() / 255.0;
            let v = input[[y, x, 2]].to_f64() / 255.0;
            let (r, g, b) = hsv_pixel_to_rgb(h, s, v)?;
            output[[y, x, 0]] = saturate_value(r);
            output[[y, x, 1]] = saturate_value(g);
            output[[y, x, 2]] = saturate_value(b);
        }
    }
    Ok(output.into_dyn())
}

/// Stored hue plane `(H, W)` of an RGB image.
pub fn extract_hue<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "extract_hue");

    let mut output = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let (h, _, _) = rgb_pixel_to_hsv(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            output[[y, x]] = encode_hue(h);
        }
    }
    Ok(output.into_dyn())
}

// ============================================================================
// Color Filtering
// ============================================================================

/// A color in stored HSV byte units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvColor {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl HsvColor {
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Per-component tolerance for [`filter_by_color`], in stored byte units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvTolerance {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Default for HsvTolerance {
    fn default() -> Self {
        Self { h: 10, s: 50, v: 50 }
    }
}

/// Circular distance between two stored hues.
#[inline]
fn hue_distance(a: u8, b: u8) -> u8 {
    let d = a.abs_diff(b);
    d.min(HUE_STEPS.saturating_sub(d))
}

/// Binary mask of pixels whose HSV lies within `tolerance` of `target`.
///
/// Hue distance wraps around the circle; S and V use plain absolute
/// difference. Matching pixels are 255, others 0.
pub fn filter_by_color<T: Sample>(
    image: ArrayViewD<T>,
    target: HsvColor,
    tolerance: HsvTolerance,
) -> CvResult<ArrayD<u8>> {
    validate_numeric(f64::from(target.h), "target.h", Some(0.0), Some(f64::from(HUE_STEPS - 1)))?;
    let hsv = rgb_to_hsv(image)?;
    let hsv = rgb_view(hsv.view(), "hsv")?;
    let (height, width, _) = hsv.dim();
    trace!(height, width, h = target.h, s = target.s, v = target.v, "filter_by_color");

    let mut mask = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let within = hue_distance(hsv[[y, x, 0]], target.h) <= tolerance.h
                && hsv[[y, x, 1]].abs_diff(target.s) <= tolerance.s
                && hsv[[y, x, 2]].abs_diff(target.v) <= tolerance.v;
            if within {
                mask[[y, x]] = 255;
            }
        }
    }
    Ok(mask.into_dyn())
}

/// Inclusive HSV bounds of a common color, in stored byte units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedHsvRange {
    pub name: &'static str,
    pub h: (u8, u8),
    pub s: (u8, u8),
    pub v: (u8, u8),
}

const fn named(name: &'static str, h: (u8, u8)) -> NamedHsvRange {
    NamedHsvRange {
        name,
        h,
        s: (50, 255),
        v: (50, 255),
    }
}

static NAMED_RANGES: [NamedHsvRange; 8] = [
    named("red_low", (0, 10)),
    named("red_high", (170, 179)),
    named("orange", (10, 25)),
    named("yellow", (25, 35)),
    named("green", (35, 85)),
    named("blue", (85, 125)),
    named("purple", (125, 155)),
    named("pink", (155, 170)),
];

/// Typical HSV ranges for common colors. Red wraps, so it has two entries.
pub fn named_hsv_ranges() -> &'static [NamedHsvRange] {
    &NAMED_RANGES
}
