//! Cross-module properties that every transform must satisfy together.

use approx::assert_abs_diff_eq;
use ndarray::{s, arr3, Array1, Array2, Array3, ArrayD};

use cvlab_rust::color_spaces::{
    filter_by_color, hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab, rgb_to_ycbcr, to_grayscale, ycbcr_to_rgb,
    GrayscaleMethod, HsvColor, HsvTolerance,
};
use cvlab_rust::core::saturate_to_byte;
use cvlab_rust::point_ops::{
    adjust_brightness_contrast, background_subtract, combine, compare_metrics, gamma_correct, ArithmeticOp,
};
use cvlab_rust::CvError;

fn float_samples() -> ArrayD<f64> {
    Array1::from(vec![
        f64::NAN,
        f64::NEG_INFINITY,
        -1e9,
        -0.6,
        -0.4,
        0.0,
        0.49,
        0.5,
        1.5,
        2.5,
        127.5,
        200.25,
        254.5,
        255.0,
        255.4,
        300.0,
        f64::INFINITY,
    ])
    .into_shape_with_order((1, 17))
    .unwrap()
    .into_dyn()
}

fn gradient_rgb(size: usize) -> ArrayD<u8> {
    Array3::from_shape_fn((size, size, 3), |(y, x, c)| match c {
        0 => (x * 255 / (size - 1)) as u8,
        1 => (y * 255 / (size - 1)) as u8,
        _ => ((x + y) * 255 / (2 * (size - 1))) as u8,
    })
    .into_dyn()
}

#[test]
fn test_saturation_is_idempotent() {
    let once = saturate_to_byte(float_samples().view());
    let twice = saturate_to_byte(once.view());
    assert_eq!(once, twice);
    assert_eq!(once[[0, 0]], 0);
    assert_eq!(once[[0, 16]], 255);
}

#[test]
fn test_background_subtraction_scenario() {
    let background = Array2::<u8>::from_elem((40, 40), 100).into_dyn();
    let mut current = Array2::<u8>::from_elem((40, 40), 100);
    current.slice_mut(s![12..22, 7..17]).fill(200);
    let current = current.into_dyn();

    let result = background_subtract(current.view(), background.view(), 30.0).unwrap();
    for ((y, x), &m) in result.mask.view().into_dimensionality::<ndarray::Ix2>().unwrap().indexed_iter() {
        let inside = (12..22).contains(&y) && (7..17).contains(&x);
        assert_eq!(m, if inside { 255 } else { 0 }, "pixel ({y}, {x})");
    }
    assert_eq!(result.mask.iter().filter(|&&m| m == 255).count(), 100);
}

#[test]
fn test_shape_guard_for_every_op() {
    let a = Array2::<u8>::zeros((4, 5)).into_dyn();
    let b = Array2::<u8>::zeros((5, 4)).into_dyn();
    let rgb = Array3::<u8>::zeros((4, 5, 3)).into_dyn();
    for op in ArithmeticOp::ALL {
        assert!(
            matches!(combine(a.view(), b.view(), op, 1.0, 1.0), Err(CvError::ShapeMismatch { .. })),
            "{op} accepted mismatched shapes"
        );
        assert!(
            matches!(combine(a.view(), rgb.view(), op, 1.0, 1.0), Err(CvError::ShapeMismatch { .. })),
            "{op} accepted gray with rgb"
        );
    }
}

#[test]
fn test_grayscale_of_pure_colors() {
    let red = arr3(&[[[255u8, 0, 0]]]).into_dyn();
    let green = arr3(&[[[0u8, 255, 0]]]).into_dyn();
    assert_eq!(to_grayscale(red.view(), GrayscaleMethod::Bt601).unwrap()[[0, 0]], 76);
    assert_eq!(to_grayscale(green.view(), GrayscaleMethod::Bt709).unwrap()[[0, 0]], 182);
}

#[test]
fn test_ycbcr_round_trip_on_gradient() {
    let img = gradient_rgb(16);
    let back = ycbcr_to_rgb(rgb_to_ycbcr(img.view()).unwrap().view()).unwrap();
    for (&orig, &restored) in img.iter().zip(back.iter()) {
        assert!((orig as i32 - restored as i32).abs() <= 1, "{orig} -> {restored}");
    }
}

#[test]
fn test_ycbcr_round_trip_full_range_sweep() {
    // Every (r, g, b) on a stride-5 grid, saturated corners included
    let levels: Vec<u8> = (0..=255u8).step_by(5).collect();
    let n = levels.len();
    let img = Array3::from_shape_fn((n, n * n, 3), |(y, x, c)| match c {
        0 => levels[y],
        1 => levels[x / n],
        _ => levels[x % n],
    })
    .into_dyn();
    let back = ycbcr_to_rgb(rgb_to_ycbcr(img.view()).unwrap().view()).unwrap();
    for ((idx, &orig), &restored) in img.indexed_iter().zip(back.iter()) {
        assert!((orig as i32 - restored as i32).abs() <= 1, "{idx:?}: {orig} -> {restored}");
    }
}

#[test]
fn test_hsv_round_trip_on_primaries_and_gray() {
    let colors = arr3(&[[
        [255u8, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [255, 255, 0],
        [255, 0, 255],
        [0, 255, 255],
        [128, 128, 128],
    ]])
    .into_dyn();
    let back = hsv_to_rgb(rgb_to_hsv(colors.view()).unwrap().view()).unwrap();
    assert_eq!(back, colors);
}

#[test]
fn test_hsv_filter_picks_the_colored_pixels() {
    let img = arr3(&[[[250u8, 10, 10], [10, 250, 10]], [[128, 128, 128], [230, 20, 5]]]).into_dyn();
    let mask = filter_by_color(img.view(), HsvColor::new(0, 255, 255), HsvTolerance::default()).unwrap();
    assert_eq!(mask.shape(), &[2, 2]);
    assert_eq!(mask[[0, 0]], 255);
    assert_eq!(mask[[0, 1]], 0);
    assert_eq!(mask[[1, 0]], 0);
    assert_eq!(mask[[1, 1]], 255);
}

#[test]
fn test_lab_round_trip_stays_close() {
    // Mid-range colors; fully saturated ones lose more to byte quantization
    let img = Array3::from_shape_fn((8, 8, 3), |(y, x, c)| match c {
        0 => (48 + 20 * x) as u8,
        1 => (48 + 20 * y) as u8,
        _ => (48 + 10 * (x + y)) as u8,
    })
    .into_dyn();
    let back = lab_to_rgb(rgb_to_lab(img.view()).unwrap().view()).unwrap();
    for (&orig, &restored) in img.iter().zip(back.iter()) {
        assert!((orig as i32 - restored as i32).abs() <= 4, "{orig} -> {restored}");
    }
}

#[test]
fn test_gamma_identity_matches_saturation() {
    let img = float_samples();
    assert_eq!(gamma_correct(img.view(), 1.0, 1.0).unwrap(), saturate_to_byte(img.view()));
}

#[test]
fn test_brightness_contrast_linearity() {
    let img = float_samples();
    assert_eq!(adjust_brightness_contrast(img.view(), 0.0, 1.0).unwrap(), saturate_to_byte(img.view()));

    let flat = adjust_brightness_contrast(gradient_rgb(8).view(), 42.0, 0.0).unwrap();
    assert!(flat.iter().all(|&v| v == 42));
}

#[test]
fn test_compare_identical_images() {
    let img = gradient_rgb(10);
    let metrics = compare_metrics(img.view(), img.view()).unwrap();
    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.mse, 0.0);
    assert!(metrics.psnr.is_infinite() && metrics.psnr > 0.0);
    assert_abs_diff_eq!(metrics.correlation, 1.0, epsilon = 1e-12);
    assert_eq!(metrics.identical_fraction, 1.0);

    let uniform = Array2::<u8>::from_elem((3, 3), 9).into_dyn();
    let flat = compare_metrics(uniform.view(), uniform.view()).unwrap();
    assert_eq!(flat.correlation, 0.0);
    assert_eq!(flat.identical_fraction, 1.0);
}

#[test]
fn test_operations_leave_inputs_untouched() {
    let img = gradient_rgb(6);
    let copy = img.clone();
    let _ = rgb_to_hsv(img.view()).unwrap();
    let _ = gamma_correct(img.view(), 2.2, 1.0).unwrap();
    let _ = combine(img.view(), copy.view(), ArithmeticOp::Product, 1.0, 1.0).unwrap();
    assert_eq!(img, copy);
}
