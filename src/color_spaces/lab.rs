//! RGB ↔ CIE L*a*b* (sRGB primaries, D65 white).
//!
//! Forward path: sRGB decode → linear RGB → XYZ → white-normalize → Lab.
//! The inverse walks the same stages backwards. Stored bytes:
//! `L_byte = round(L * 255 / 100)`, `a_byte = round(a + 128)`,
//! `b_byte = round(b + 128)`.

use ndarray::{Array2, Array3, ArrayD, ArrayViewD};
use tracing::trace;

use super::srgb::{
    lab_f, lab_f_inv, linear_to_srgb, mat3_mul, srgb_to_linear, D65_WHITE, SRGB_TO_XYZ, XYZ_TO_SRGB,
};
use crate::core::{rgb_view, saturate_value, Sample};
use crate::error::CvResult;

const AB_OFFSET: f64 = 128.0;

/// Convert one RGB pixel (0-255) to float Lab: L in [0, 100], a and b
/// roughly in [-128, 127].
pub fn rgb_pixel_to_lab(r: f64, g: f64, b: f64) -> [f64; 3] {
    let linear = [
        srgb_to_linear(r / 255.0),
        srgb_to_linear(g / 255.0),
        srgb_to_linear(b / 255.0),
    ];
    let xyz = mat3_mul(&SRGB_TO_XYZ, linear);

    let fx = lab_f(xyz[0] / D65_WHITE[0]);
    let fy = lab_f(xyz[1] / D65_WHITE[1]);
    let fz = lab_f(xyz[2] / D65_WHITE[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert float Lab back to an RGB pixel on the 0-255 scale (unsaturated).
pub fn lab_pixel_to_rgb(l: f64, a: f64, b: f64) -> [f64; 3] {
    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let xyz = [
        lab_f_inv(fx) * D65_WHITE[0],
        lab_f_inv(fy) * D65_WHITE[1],
        lab_f_inv(fz) * D65_WHITE[2],
    ];
    let linear = mat3_mul(&XYZ_TO_SRGB, xyz);

    [
        linear_to_srgb(linear[0]) * 255.0,
        linear_to_srgb(linear[1]) * 255.0,
        linear_to_srgb(linear[2]) * 255.0,
    ]
}

/// Convert an RGB image to byte-encoded Lab.
///
/// # Arguments
/// * `image` - `(H, W, 3)` RGB buffer, values 0-255
///
/// # Returns
/// `(H, W, 3)` u8 buffer holding L, a, b in stored byte form
pub fn rgb_to_lab<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "rgb_to_lab");

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let [l, a, b] = rgb_pixel_to_lab(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            output[[y, x, 0]] = saturate_value(l * 255.0 / 100.0);
            output[[y, x, 1]] = saturate_value(a + AB_OFFSET);
            output[[y, x, 2]] = saturate_value(b + AB_OFFSET);
        }
    }
    Ok(output.into_dyn())
}

/// Convert a byte-encoded Lab image back to RGB.
pub fn lab_to_rgb<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "lab_to_rgb");

    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let rgb = lab_pixel_to_rgb(
                input[[y, x, 0]].to_f64() * 100.0 / 255.0,
                input[[y, x, 1]].to_f64() - AB_OFFSET,
                input[[y, x, 2]].to_f64() - AB_OFFSET,
            );
            for c in 0..3 {
                output[[y, x, c]] = saturate_value(rgb[c]);
            }
        }
    }
    Ok(output.into_dyn())
}

/// CIE76 color difference: Euclidean distance in (L, a, b).
pub fn delta_e(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
    lab1.iter()
        .zip(lab2.iter())
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f64>()
        .sqrt()
}

/// Stored lightness plane `(H, W)` of an RGB image.
pub fn extract_lightness<T: Sample>(image: ArrayViewD<T>) -> CvResult<ArrayD<u8>> {
    let input = rgb_view(image, "image")?;
    let (height, width, _) = input.dim();
    trace!(height, width, "extract_lightness");

    let mut output = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let [l, _, _] = rgb_pixel_to_lab(
                input[[y, x, 0]].to_f64(),
                input[[y, x, 1]].to_f64(),
                input[[y, x, 2]].to_f64(),
            );
            output[[y, x]] = saturate_value(l * 255.0 / 100.0);
        }
    }
    Ok(output.into_dyn())
}

pub fn d65_white_point() -> [f64; 3] {
    D65_WHITE
}

pub fn srgb_to_xyz_matrix() -> [[f64; 3]; 3] {
    SRGB_TO_XYZ
}

pub fn xyz_to_srgb_matrix() -> [[f64; 3]; 3] {
    XYZ_TO_SRGB
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr3;

    fn lab_of(r: u8, g: u8, b: u8) -> [u8; 3] {
        let img = arr3(&[[[r, g, b]]]).into_dyn();
        let lab = rgb_to_lab(img.view()).unwrap();
        [lab[[0, 0, 0]], lab[[0, 0, 1]], lab[[0, 0, 2]]]
    }

    #[test]
    fn test_white_and_black() {
        assert_eq!(lab_of(255, 255, 255), [255, 128, 128]);
        assert_eq!(lab_of(0, 0, 0), [0, 128, 128]);
    }

    #[test]
    fn test_white_float_values() {
        let [l, a, b] = rgb_pixel_to_lab(255.0, 255.0, 255.0);
        assert_abs_diff_eq!(l, 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(a, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(b, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ab_sign_conventions() {
        assert!(lab_of(255, 0, 0)[1] > 128); // red: +a
        assert!(lab_of(0, 255, 0)[1] < 128); // green: -a
        assert!(lab_of(0, 0, 255)[2] < 128); // blue: -b
        assert!(lab_of(255, 255, 0)[2] > 128); // yellow: +b
    }

    #[test]
    fn test_roundtrip_mid_colors() {
        let img = arr3(&[[[200u8, 100, 50], [50, 120, 200], [128, 128, 128], [90, 160, 70]]]).into_dyn();
        let back = lab_to_rgb(rgb_to_lab(img.view()).unwrap().view()).unwrap();
        for (o, r) in img.iter().zip(back.iter()) {
            assert!((*o as i32 - *r as i32).abs() <= 4, "{o} vs {r}");
        }
    }

    #[test]
    fn test_pixel_roundtrip_float() {
        let [l, a, b] = rgb_pixel_to_lab(30.0, 200.0, 120.0);
        let rgb = lab_pixel_to_rgb(l, a, b);
        assert_abs_diff_eq!(rgb[0], 30.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb[1], 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb[2], 120.0, epsilon = 1e-3);
    }

    #[test]
    fn test_delta_e() {
        assert_eq!(delta_e([50.0, 10.0, -10.0], [50.0, 10.0, -10.0]), 0.0);
        assert_abs_diff_eq!(delta_e([0.0, 0.0, 0.0], [3.0, 4.0, 12.0]), 13.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extract_lightness_matches_full() {
        let img = arr3(&[[[200u8, 100, 50], [10, 20, 30]]]).into_dyn();
        let full = rgb_to_lab(img.view()).unwrap();
        let l = extract_lightness(img.view()).unwrap();
        assert_eq!(l.shape(), &[1, 2]);
        assert_eq!(l[[0, 0]], full[[0, 0, 0]]);
        assert_eq!(l[[0, 1]], full[[0, 1, 0]]);
    }

    #[test]
    fn test_reference_data() {
        assert_eq!(d65_white_point(), [0.95047, 1.0, 1.08883]);
        assert_eq!(srgb_to_xyz_matrix()[1][1], 0.7151522);
        assert_eq!(xyz_to_srgb_matrix()[0][0], 3.2404542);
    }
}
