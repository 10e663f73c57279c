//! sRGB / CIE primitives shared by the Lab codec.
//!
//! One definition per mathematical primitive: the sRGB transfer curve and
//! its inverse, the CIE XYZ→Lab nonlinearity and its inverse, the D65 white
//! point, and the sRGB↔XYZ matrices.

/// CIE D65 reference white (X, Y, Z), Y normalized to 1.
pub const D65_WHITE: [f64; 3] = [0.95047, 1.00000, 1.08883];

/// Linear sRGB → XYZ (D65).
pub const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ (D65) → linear sRGB.
pub const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// (6/29)^3, where the Lab nonlinearity switches from linear to cube root.
pub const LAB_EPSILON: f64 = 0.008856;
/// Slope of the linear segment of the Lab nonlinearity.
pub const LAB_KAPPA_SLOPE: f64 = 7.787;
const LAB_OFFSET: f64 = 16.0 / 116.0;

/// Decode one sRGB component in [0, 1] to linear light.
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear-light component to sRGB.
///
/// Negative input is clamped to 0 first.
#[inline]
pub fn linear_to_srgb(c: f64) -> f64 {
    let c = c.max(0.0);
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// CIE XYZ→Lab nonlinearity applied to a white-normalized component.
#[inline]
pub fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA_SLOPE * t + LAB_OFFSET
    }
}

/// Inverse of [`lab_f`].
///
/// The branch test compares the cubed value against the threshold.
#[inline]
pub fn lab_f_inv(v: f64) -> f64 {
    let cubed = v * v * v;
    if cubed > LAB_EPSILON {
        cubed
    } else {
        (v - LAB_OFFSET) / LAB_KAPPA_SLOPE
    }
}

#[inline]
pub(crate) fn mat3_mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_transfer_roundtrip() {
        for i in 0..=255 {
            let c = i as f64 / 255.0;
            assert_abs_diff_eq!(linear_to_srgb(srgb_to_linear(c)), c, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_transfer_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert_abs_diff_eq!(srgb_to_linear(1.0), 1.0, epsilon = 1e-12);
        assert_eq!(linear_to_srgb(-0.5), 0.0);
    }

    #[test]
    fn test_lab_f_inverse() {
        for t in [0.0, 0.001, 0.008, 0.05, 0.2, 0.5, 1.0] {
            assert_abs_diff_eq!(lab_f_inv(lab_f(t)), t, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_matrices_are_inverse() {
        let white = mat3_mul(&SRGB_TO_XYZ, [1.0, 1.0, 1.0]);
        for (w, d65) in white.iter().zip(D65_WHITE) {
            assert_abs_diff_eq!(*w, d65, epsilon = 1e-6);
        }

        let back = mat3_mul(&XYZ_TO_SRGB, mat3_mul(&SRGB_TO_XYZ, [0.2, 0.5, 0.8]));
        assert_abs_diff_eq!(back[0], 0.2, epsilon = 1e-5);
        assert_abs_diff_eq!(back[1], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(back[2], 0.8, epsilon = 1e-5);
    }
}
