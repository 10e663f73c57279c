//! RGB ↔ YCbCr (ITU-R BT.601, full range).
//!
//! Y carries luminance, Cb and Cr carry blue- and red-difference chroma
//! centered at 128. The transform is linear, so a round trip only loses
//! precision through rounding and saturation.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Array3, ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{rgb_view, saturate_value, Sample};
use crate::error::{CvError, CvResult};

const Y_ROW: [f64; 3] = [0.299, 0.587, 0.114];
const CB_ROW: [f64; 3] = [-0.169, -0.331, 0.500];
const CR_ROW: [f64; 3] = [0.500, -0.419, -0.081];
const CHROMA_OFFSET: f64 = 128.0;

/// Forward transform of one pixel, unsaturated.
#[inline]
pub fn rgb_pixel_to_ycbcr(r: f64, g: f64, b: f64) -> [f64; 3] {
    [
        Y_ROW[0] * r + Y_ROW[1] * g + Y_ROW[2] * b,
        CB_ROW[0] * r + CB_ROW[1] * g + CB_ROW[2] * b + CHROMA_OFFSET,
        CR_ROW[0] * r + CR_ROW[1] * g + CR_ROW[2] * b + CHROMA_OFFSET,
    ]
}

/// Inverse transform of one pixel, unsaturated.
#[inline]
pub fn ycbcr_pixel_to_rgb(y: f64, cb: f64, cr: f64) -> [f64; 3] {
    let cb = cb - CHROMA_OFFSET;
    let cr = cr - CHROMA_OFFSET;
    [
        y + 1.402 * cr,
        y - 0.344 * cb - 0.714 * cr,
        y + 1.772 * cb,
    ]
}

/// Convert an RGB image to YCbCr.
///
/// # Arguments
/// * `image` - `(H, W, 3)` RGB buffer, values 0-255
///
/// # Returns
/// `(H, W, 3)` u8 buffer holding Y, Cb, Cr
pub fn rgb_to_ycbcr<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "rgb_to_ycbcr");

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let ycc = rgb_pixel_to_ycbcr(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            for c in 0..3 {
                output[[y, x, c]] = saturate_value(ycc[c]);
            }
        }
    }
    Ok(output.into_dyn())
}

/// Convert a YCbCr image back to RGB.
pub fn ycbcr_to_rgb<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "ycbcr_to_rgb");

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let rgb = ycbcr_pixel_to_rgb(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            for c in 0..3 {
                output[[y, x, c]] = saturate_value(rgb[c]);
            }
        }
    }
    Ok(output.into_dyn())
}

/// Chroma plane selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromaComponent {
    /// Blue-difference chroma.
    Cb,
    /// Red-difference chroma.
    Cr,
}

impl fmt::Display for ChromaComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cb => "cb",
            Self::Cr => "cr",
        })
    }
}

impl FromStr for ChromaComponent {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cb" => Ok(Self::Cb),
            "cr" => Ok(Self::Cr),
            other => Err(CvError::InvalidMethod(other.to_string())),
        }
    }
}

/// Extract the Y (luma) plane of an RGB image as `(H, W)`.
pub fn extract_luma<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    extract_plane(image, 0)
}

/// Extract one chroma plane of an RGB image as `(H, W)`.
pub fn extract_chroma<T: Sample>(image: ArrayViewD<T>, component: ChromaComponent) -> CvResult<ArrayD<u8>> {
    let index = match component {
        ChromaComponent::Cb => 1,
        ChromaComponent::Cr => 2,
    };
    extract_plane(image, index)
}

fn extract_plane<T: Sample>(image: ArrayViewD<T>, index: usize) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, index, "extract_ycbcr_plane");

    let mut output = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let ycc = rgb_pixel_to_ycbcr(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            output[[y, x]] = saturate_value(ycc[index]);
        }
    }
    Ok(output.into_dyn())
}

/// Coefficients of the forward RGB→YCbCr transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YCbCrCoefficients {
    /// (R, G, B) weights of Y.
    pub y: [f64; 3],
    /// (R, G, B) weights of Cb.
    pub cb: [f64; 3],
    /// (R, G, B) weights of Cr.
    pub cr: [f64; 3],
    /// Offset added to both chroma rows.
    pub chroma_offset: f64,
}

pub fn ycbcr_coefficients() -> YCbCrCoefficients {
    YCbCrCoefficients {
        y: Y_ROW,
        cb: CB_ROW,
        cr: CR_ROW,
        chroma_offset: CHROMA_OFFSET,
    }
}
