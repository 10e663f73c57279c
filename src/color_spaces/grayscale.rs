//! Grayscale reduction.
//!
//! Collapses a 3-channel image to a single `(H, W)` channel under one of
//! seven weighting policies. Weighted policies use the ITU-R coefficients:
//!
//! | Method | Formula |
//! |--------|---------|
//! | `bt601` / `luminance` | 0.299 R + 0.587 G + 0.114 B |
//! | `bt709` | 0.2126 R + 0.7152 G + 0.0722 B |
//! | `mean` | (R + G + B) / 3 |
//! | `desaturate` | (max + min) / 2 |
//! | `channel_r/g/b` | the named channel |

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{image_statistics, rgb_view, saturate_to_byte, saturate_value, validate_image, ImageStatistics, Sample};
use crate::error::{CvError, CvResult};

/// ITU-R BT.601 luminance coefficients
const BT601: (f64, f64, f64) = (0.299, 0.587, 0.114);
/// ITU-R BT.709 luminance coefficients
const BT709: (f64, f64, f64) = (0.2126, 0.7152, 0.0722);

/// RGB to grayscale reduction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleMethod {
    /// ITU-R BT.601 luminance, also accepted as `luminance`.
    #[default]
    #[serde(alias = "luminance")]
    Bt601,
    /// ITU-R BT.709 (HDTV) luminance.
    Bt709,
    Mean,
    /// Midpoint of the brightest and darkest channel.
    Desaturate,
    ChannelR,
    ChannelG,
    ChannelB,
}

impl GrayscaleMethod {
    pub const ALL: [GrayscaleMethod; 7] = [
        Self::Bt601,
        Self::Bt709,
        Self::Mean,
        Self::Desaturate,
        Self::ChannelR,
        Self::ChannelG,
        Self::ChannelB,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bt601 => "bt601",
            Self::Bt709 => "bt709",
            Self::Mean => "mean",
            Self::Desaturate => "desaturate",
            Self::ChannelR => "channel_r",
            Self::ChannelG => "channel_g",
            Self::ChannelB => "channel_b",
        }
    }

    /// Reduce a single pixel.
    #[inline]
    pub fn reduce(self, r: f64, g: f64, b: f64) -> f64 {
        match self {
            Self::Bt601 => BT601.0 * r + BT601.1 * g + BT601.2 * b,
            Self::Bt709 => BT709.0 * r + BT709.1 * g + BT709.2 * b,
            Self::Mean => (r + g + b) / 3.0,
            Self::Desaturate => (r.max(g).max(b) + r.min(g).min(b)) / 2.0,
            Self::ChannelR => r,
            Self::ChannelG => g,
            Self::ChannelB => b,
        }
    }
}

impl fmt::Display for GrayscaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrayscaleMethod {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "luminance" | "bt601" => Ok(Self::Bt601),
            "bt709" => Ok(Self::Bt709),
            "mean" => Ok(Self::Mean),
            "desaturate" => Ok(Self::Desaturate),
            "channel_r" => Ok(Self::ChannelR),
            "channel_g" => Ok(Self::ChannelG),
            "channel_b" => Ok(Self::ChannelB),
            other => Err(CvError::InvalidMethod(other.to_string())),
        }
    }
}

/// Convert an image to a single grayscale channel.
///
/// # Arguments
/// * `image` - `(H, W)` or `(H, W, 3)` buffer
/// * `method` - Reduction policy
///
/// # Returns
/// `(H, W)` u8 buffer. A 2-D input is only saturated.
pub fn to_grayscale<T: Sample>(image: ArrayViewD<T>, method: GrayscaleMethod) -> CvResult<ArrayD<u8>> {
    let dims = validate_image(&image, "image")?;
    trace!(height = dims.height, width = dims.width, %method, "to_grayscale");

    if dims.channels == 1 {
        return Ok(saturate_to_byte(image));
    }

    let input = rgb_view(image, "image")?;
    let mut output = Array2::<u8>::zeros((dims.height, dims.width));

    for y in 0..dims.height {
        for x in 0..dims.width {
            let r = input[[y, x, 0]].to_f64();
            let g = input[[y, x, 1]].to_f64();
            let b = input[[y, x, 2]].to_f64();
            output[[y, x]] = saturate_value(method.reduce(r, g, b));
        }
    }

    Ok(output.into_dyn())
}

/// Return the (R, G, B) weights of a weighted luminance standard.
///
/// Only `Bt601` and `Bt709` carry weights; other methods fail with
/// [`CvError::InvalidMethod`].
pub fn luminance_weights(method: GrayscaleMethod) -> CvResult<(f64, f64, f64)> {
    match method {
        GrayscaleMethod::Bt601 => Ok(BT601),
        GrayscaleMethod::Bt709 => Ok(BT709),
        other => Err(CvError::InvalidMethod(format!(
            "{other} has no luminance weights, use bt601 or bt709"
        ))),
    }
}

/// Per-channel statistics of an RGB image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelStatistics {
    pub r: ImageStatistics,
    pub g: ImageStatistics,
    pub b: ImageStatistics,
}

/// Compute min, max, mean and std of each RGB channel.
pub fn channel_statistics<T: Sample>(image: ArrayViewD<T>) -> CvResult<ChannelStatistics> {
    let input = rgb_view(image, "image")?;
    let channel = |c: usize| image_statistics(input.index_axis(ndarray::Axis(2), c).into_dyn());

    Ok(ChannelStatistics {
        r: channel(0)?,
        g: channel(1)?,
        b: channel(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, arr3, Array3};

    fn pixel(r: u8, g: u8, b: u8) -> ArrayD<u8> {
        arr3(&[[[r, g, b]]]).into_dyn()
    }

    #[test]
    fn test_bt601_pure_red() {
        let result = to_grayscale(pixel(255, 0, 0).view(), GrayscaleMethod::Bt601).unwrap();
        assert_eq!(result.shape(), &[1, 1]);
        assert_eq!(result[[0, 0]], 76);
    }

    #[test]
    fn test_bt709_pure_green() {
        let result = to_grayscale(pixel(0, 255, 0).view(), GrayscaleMethod::Bt709).unwrap();
        assert_eq!(result[[0, 0]], 182);
    }

    #[test]
    fn test_every_method() {
        let img = pixel(200, 100, 50);
        let expected: [(GrayscaleMethod, u8); 7] = [
            (GrayscaleMethod::Bt601, 124), // 59.8 + 58.7 + 5.7 = 124.2
            (GrayscaleMethod::Bt709, 118), // 42.52 + 71.52 + 3.61 = 117.65
            (GrayscaleMethod::Mean, 117),  // 350 / 3 = 116.67
            (GrayscaleMethod::Desaturate, 125),
            (GrayscaleMethod::ChannelR, 200),
            (GrayscaleMethod::ChannelG, 100),
            (GrayscaleMethod::ChannelB, 50),
        ];
        for (method, value) in expected {
            let result = to_grayscale(img.view(), method).unwrap();
            assert_eq!(result[[0, 0]], value, "method {method}");
        }
    }

    #[test]
    fn test_gray_input_passthrough() {
        let img = arr2(&[[0.4, 12.6], [300.0, -2.0]]).into_dyn();
        let result = to_grayscale(img.view(), GrayscaleMethod::Bt709).unwrap();
        assert_eq!(result, arr2(&[[0u8, 13], [255, 0]]).into_dyn());
    }

    #[test]
    fn test_preserves_spatial_extent() {
        let img = Array3::<f32>::from_elem((4, 7, 3), 128.0).into_dyn();
        let result = to_grayscale(img.view(), GrayscaleMethod::Mean).unwrap();
        assert_eq!(result.shape(), &[4, 7]);
        assert!(result.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("luminance".parse::<GrayscaleMethod>().unwrap(), GrayscaleMethod::Bt601);
        assert_eq!("bt601".parse::<GrayscaleMethod>().unwrap(), GrayscaleMethod::Bt601);
        for method in GrayscaleMethod::ALL {
            assert_eq!(method.as_str().parse::<GrayscaleMethod>().unwrap(), method);
        }
        assert!(matches!(
            "sepia".parse::<GrayscaleMethod>(),
            Err(CvError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance_weights(GrayscaleMethod::Bt601).unwrap(), (0.299, 0.587, 0.114));
        assert_eq!(luminance_weights(GrayscaleMethod::Bt709).unwrap(), (0.2126, 0.7152, 0.0722));
        assert!(luminance_weights(GrayscaleMethod::Mean).is_err());
    }

    #[test]
    fn test_channel_statistics() {
        let img = arr3(&[[[10u8, 20, 30], [30, 40, 50]]]).into_dyn();
        let stats = channel_statistics(img.view()).unwrap();
        assert_eq!(stats.r.min, 10.0);
        assert_eq!(stats.r.max, 30.0);
        assert_eq!(stats.g.mean, 30.0);
        assert_eq!(stats.b.std, 10.0);
    }

    #[test]
    fn test_channel_statistics_requires_rgb() {
        let img = arr2(&[[1u8, 2]]).into_dyn();
        assert!(matches!(
            channel_statistics(img.view()),
            Err(CvError::Channel { expected: 3, found: 1, .. })
        ));
    }
}
