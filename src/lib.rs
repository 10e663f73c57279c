//! cvlab Rust core
//!
//! Classic per-pixel computer-vision transforms implemented from scratch,
//! with optional Python bindings via PyO3.
//!
//! ## Image Format
//! Every transform takes an `ndarray` view with a dynamic dimension:
//! - **Grayscale**: (height, width)
//! - **RGB**: (height, width, 3), also used for YCbCr, HSV and Lab encodings
//!
//! Accepted element types are `u8`, `f32` and `f64`, all on the 0-255 scale.
//! Outputs are always fresh `u8` buffers produced by the saturating cast in
//! [`crate::core::saturate_to_byte`].
//!
//! ## Modules
//! - [`core`](crate::core): validation, saturation and statistics shared by all transforms
//! - [`color_spaces`]: grayscale, YCbCr, HSV and Lab codecs
//! - [`point_ops`]: brightness/contrast, gamma, normalization and arithmetic
//! - [`params`]: serde parameter records for the tonal operations
//! - [`error`]: the [`CvError`] taxonomy
//!
//! The crate logs through `tracing` and installs no subscriber.

pub mod color_spaces;
pub mod core;
pub mod error;
pub mod params;
pub mod point_ops;

pub use error::{CvError, CvResult};

// Python bindings (only when python feature is enabled)
//
// Every image-level operation is bound. Pixel helpers and constant tables
// (`rgb_pixel_to_*`, coefficient and matrix accessors, named HSV ranges)
// stay Rust-only. Result records come back as dicts with the same field
// names as the Rust structs.
#[cfg(feature = "python")]
mod python {
    use ndarray::ArrayD;
    use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::color_spaces::{self, ChromaComponent, GrayscaleMethod, HsvColor, HsvTolerance};
    use crate::core::{to_f64_array, ImageStatistics};
    use crate::error::CvError;
    use crate::point_ops::{self, ArithmeticOp, MotionMethod};

    impl From<CvError> for PyErr {
        fn from(err: CvError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    type PyImage<'py> = Bound<'py, PyArrayDyn<u8>>;

    /// Any accepted numpy image dtype.
    #[derive(FromPyObject)]
    pub enum ImageArg<'py> {
        U8(PyReadonlyArrayDyn<'py, u8>),
        F32(PyReadonlyArrayDyn<'py, f32>),
        F64(PyReadonlyArrayDyn<'py, f64>),
    }

    /// Run `$body` with `$view` bound to the array view of whichever dtype came in.
    macro_rules! with_view {
        ($arg:expr, |$view:ident| $body:expr) => {
            match &$arg {
                ImageArg::U8(array) => {
                    let $view = array.as_array();
                    $body
                }
                ImageArg::F32(array) => {
                    let $view = array.as_array();
                    $body
                }
                ImageArg::F64(array) => {
                    let $view = array.as_array();
                    $body
                }
            }
        };
    }

    /// Operations over several images need one element type; widen to f64.
    fn widen(arg: &ImageArg<'_>) -> ArrayD<f64> {
        with_view!(*arg, |view| to_f64_array(view))
    }

    fn statistics_dict<'py>(py: Python<'py>, stats: &ImageStatistics) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("min", stats.min)?;
        dict.set_item("max", stats.max)?;
        dict.set_item("mean", stats.mean)?;
        dict.set_item("std", stats.std)?;
        dict.set_item("median", stats.median)?;
        Ok(dict)
    }

    // ========================================================================
    // Color Spaces
    // ========================================================================

    /// Reduce an RGB image to one channel.
    ///
    /// `method` is one of "bt601", "bt709", "mean", "desaturate",
    /// "channel_r", "channel_g", "channel_b".
    #[pyfunction]
    #[pyo3(signature = (image, method = "bt601"))]
    pub fn to_grayscale<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        method: &str,
    ) -> PyResult<PyImage<'py>> {
        let method: GrayscaleMethod = method.parse()?;
        Ok(with_view!(image, |view| color_spaces::to_grayscale(view, method))?.into_pyarray(py))
    }

    /// Returns `{"r": stats, "g": stats, "b": stats}`.
    #[pyfunction]
    pub fn channel_statistics<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<Bound<'py, PyDict>> {
        let stats = with_view!(image, |view| color_spaces::channel_statistics(view))?;
        let dict = PyDict::new(py);
        dict.set_item("r", statistics_dict(py, &stats.r)?)?;
        dict.set_item("g", statistics_dict(py, &stats.g)?)?;
        dict.set_item("b", statistics_dict(py, &stats.b)?)?;
        Ok(dict)
    }

    #[pyfunction]
    pub fn rgb_to_ycbcr<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::rgb_to_ycbcr(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn ycbcr_to_rgb<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::ycbcr_to_rgb(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn extract_luma<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::extract_luma(view))?.into_pyarray(py))
    }

    /// Extract the "cb" or "cr" plane of an RGB image.
    #[pyfunction]
    pub fn extract_chroma<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        component: &str,
    ) -> PyResult<PyImage<'py>> {
        let component: ChromaComponent = component.parse()?;
        Ok(with_view!(image, |view| color_spaces::extract_chroma(view, component))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn rgb_to_hsv<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::rgb_to_hsv(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn hsv_to_rgb<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::hsv_to_rgb(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn extract_hue<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::extract_hue(view))?.into_pyarray(py))
    }

    /// Mask of pixels within `tolerance` of `target`, both given as (h, s, v) bytes.
    #[pyfunction]
    #[pyo3(signature = (image, target, tolerance = (10, 50, 50)))]
    pub fn filter_by_color<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        target: (u8, u8, u8),
        tolerance: (u8, u8, u8),
    ) -> PyResult<PyImage<'py>> {
        let target = HsvColor::new(target.0, target.1, target.2);
        let tolerance = HsvTolerance {
            h: tolerance.0,
            s: tolerance.1,
            v: tolerance.2,
        };
        Ok(with_view!(image, |view| color_spaces::filter_by_color(view, target, tolerance))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn rgb_to_lab<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::rgb_to_lab(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn lab_to_rgb<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::lab_to_rgb(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn extract_lightness<'py>(py: Python<'py>, image: ImageArg<'py>) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| color_spaces::extract_lightness(view))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn delta_e(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
        color_spaces::delta_e(lab1, lab2)
    }

    // ========================================================================
    // Tonal Operations
    // ========================================================================

    #[pyfunction]
    #[pyo3(signature = (image, brightness = 0.0, contrast = 1.0))]
    pub fn adjust_brightness_contrast<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        brightness: f64,
        contrast: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(image, |view| point_ops::adjust_brightness_contrast(view, brightness, contrast))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn remap_range<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        source: (f64, f64),
        target: (f64, f64),
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::remap_range(view, source, target))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn apply_piecewise_curve<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        points: Vec<(f64, f64)>,
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::apply_piecewise_curve(view, &points))?.into_pyarray(py))
    }

    /// Returns `original` and `transformed` statistics plus `mean_change`,
    /// `std_change` and `contrast_factor`.
    #[pyfunction]
    pub fn transform_statistics<'py>(
        py: Python<'py>,
        original: ImageArg<'py>,
        transformed: ImageArg<'py>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let stats = with_view!(original, |original| {
            with_view!(transformed, |transformed| point_ops::transform_statistics(original, transformed))
        })?;
        let dict = PyDict::new(py);
        dict.set_item("original", statistics_dict(py, &stats.original)?)?;
        dict.set_item("transformed", statistics_dict(py, &stats.transformed)?)?;
        dict.set_item("mean_change", stats.mean_change)?;
        dict.set_item("std_change", stats.std_change)?;
        dict.set_item("contrast_factor", stats.contrast_factor)?;
        Ok(dict)
    }

    #[pyfunction]
    #[pyo3(signature = (image, gamma, c = 1.0))]
    pub fn gamma_correct<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        gamma: f64,
        c: f64,
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::gamma_correct(view, gamma, c))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn invert_gamma<'py>(py: Python<'py>, image: ImageArg<'py>, original_gamma: f64) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::invert_gamma(view, original_gamma))?.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, regions = 4, base_gamma = 1.0, adaptation_factor = 0.5))]
    pub fn gamma_adaptive_by_region<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        regions: usize,
        base_gamma: f64,
        adaptation_factor: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(image, |view| {
            point_ops::gamma_adaptive_by_region(view, regions, base_gamma, adaptation_factor)
        })?;
        Ok(result.into_pyarray(py))
    }

    /// Returns `detected_gamma`, `confidence` and one `candidates` entry per
    /// tested gamma with its score components.
    #[pyfunction]
    #[pyo3(signature = (image, candidates = None))]
    pub fn detect_gamma<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        candidates: Option<Vec<f64>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let detection = with_view!(image, |view| point_ops::detect_gamma(view, candidates.as_deref()))?;
        let scores = detection
            .candidates
            .iter()
            .map(|candidate| {
                let entry = PyDict::new(py);
                entry.set_item("gamma", candidate.gamma)?;
                entry.set_item("score", candidate.score)?;
                entry.set_item("extremes", candidate.extremes)?;
                entry.set_item("uniformity", candidate.uniformity)?;
                entry.set_item("asymmetry", candidate.asymmetry)?;
                entry.set_item("mean", candidate.mean)?;
                entry.set_item("std", candidate.std)?;
                Ok(entry)
            })
            .collect::<PyResult<Vec<_>>>()?;

        let dict = PyDict::new(py);
        dict.set_item("detected_gamma", detection.detected_gamma)?;
        dict.set_item("confidence", detection.confidence)?;
        dict.set_item("candidates", scores)?;
        Ok(dict)
    }

    /// Returns `(input, output)` sample lists.
    #[pyfunction]
    #[pyo3(signature = (gamma, n_points = 256))]
    pub fn generate_gamma_curve(gamma: f64, n_points: usize) -> PyResult<(Vec<f64>, Vec<f64>)> {
        let curve = point_ops::generate_gamma_curve(gamma, n_points)?;
        Ok((curve.input, curve.output))
    }

    // ========================================================================
    // Normalization
    // ========================================================================

    #[pyfunction]
    #[pyo3(signature = (image, new_min = 0.0, new_max = 255.0))]
    pub fn normalize_min_max<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        new_min: f64,
        new_max: f64,
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::normalize_min_max(view, new_min, new_max))?.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, target_mean = 127.5, target_std = 50.0))]
    pub fn normalize_z_score<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        target_mean: f64,
        target_std: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(image, |view| point_ops::normalize_z_score(view, target_mean, target_std))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, low = 2.0, high = 98.0))]
    pub fn normalize_percentile<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        low: f64,
        high: f64,
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::normalize_percentile(view, low, high))?.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, window = 64, overlap = 0.5))]
    pub fn normalize_adaptive_local<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        window: usize,
        overlap: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(image, |view| point_ops::normalize_adaptive_local(view, window, overlap))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, window = 64))]
    pub fn equalize_histogram_local<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        window: usize,
    ) -> PyResult<PyImage<'py>> {
        Ok(with_view!(image, |view| point_ops::equalize_histogram_local(view, window))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn normalization_metrics<'py>(
        py: Python<'py>,
        original: ImageArg<'py>,
        normalized: ImageArg<'py>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let metrics = with_view!(original, |original| {
            with_view!(normalized, |normalized| point_ops::normalization_metrics(original, normalized))
        })?;
        let dict = PyDict::new(py);
        dict.set_item("original_range", metrics.original_range)?;
        dict.set_item("normalized_range", metrics.normalized_range)?;
        dict.set_item("original_range_utilization", metrics.original_range_utilization)?;
        dict.set_item("normalized_range_utilization", metrics.normalized_range_utilization)?;
        dict.set_item("original_mean", metrics.original_mean)?;
        dict.set_item("normalized_mean", metrics.normalized_mean)?;
        dict.set_item("original_std", metrics.original_std)?;
        dict.set_item("normalized_std", metrics.normalized_std)?;
        dict.set_item("original_entropy", metrics.original_entropy)?;
        dict.set_item("normalized_entropy", metrics.normalized_entropy)?;
        Ok(dict)
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Combine two equally shaped images; `op` is an operation name such as
    /// "sum" or "absolute_difference".
    #[pyfunction]
    #[pyo3(signature = (a, b, op, w1 = 1.0, w2 = 1.0))]
    pub fn combine<'py>(
        py: Python<'py>,
        a: ImageArg<'py>,
        b: ImageArg<'py>,
        op: &str,
        w1: f64,
        w2: f64,
    ) -> PyResult<PyImage<'py>> {
        let op: ArithmeticOp = op.parse()?;
        let result = with_view!(a, |a| with_view!(b, |b| point_ops::combine(a, b, op, w1, w2)))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (a, b, alpha = 0.5))]
    pub fn alpha_blend<'py>(
        py: Python<'py>,
        a: ImageArg<'py>,
        b: ImageArg<'py>,
        alpha: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(a, |a| with_view!(b, |b| point_ops::alpha_blend(a, b, alpha)))?;
        Ok(result.into_pyarray(py))
    }

    /// Returns `(difference, mask)`.
    #[pyfunction]
    #[pyo3(signature = (current, background, threshold = 30.0))]
    pub fn background_subtract<'py>(
        py: Python<'py>,
        current: ImageArg<'py>,
        background: ImageArg<'py>,
        threshold: f64,
    ) -> PyResult<(PyImage<'py>, PyImage<'py>)> {
        let result = with_view!(current, |current| {
            with_view!(background, |background| point_ops::background_subtract(current, background, threshold))
        })?;
        Ok((result.difference.into_pyarray(py), result.mask.into_pyarray(py)))
    }

    #[pyfunction]
    #[pyo3(signature = (image, flat, dark = None))]
    pub fn flat_field_correct<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        flat: ImageArg<'py>,
        dark: Option<ImageArg<'py>>,
    ) -> PyResult<PyImage<'py>> {
        let image = widen(&image);
        let flat = widen(&flat);
        let dark = dark.as_ref().map(widen);
        let result = point_ops::flat_field_correct(image.view(), flat.view(), dark.as_ref().map(|d| d.view()))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (images, weights = None))]
    pub fn fuse_exposures<'py>(
        py: Python<'py>,
        images: Vec<ImageArg<'py>>,
        weights: Option<Vec<f64>>,
    ) -> PyResult<PyImage<'py>> {
        let images: Vec<ArrayD<f64>> = images.iter().map(widen).collect();
        let views: Vec<_> = images.iter().map(|image| image.view()).collect();
        Ok(point_ops::fuse_exposures(&views, weights.as_deref())?.into_pyarray(py))
    }

    /// A uint8 mask is read as 0-255, a float mask as 0-1.
    #[pyfunction]
    #[pyo3(signature = (image, mask, background_value = 0.0))]
    pub fn apply_mask<'py>(
        py: Python<'py>,
        image: ImageArg<'py>,
        mask: ImageArg<'py>,
        background_value: f64,
    ) -> PyResult<PyImage<'py>> {
        let result = with_view!(image, |image| {
            with_view!(mask, |mask| point_ops::apply_mask(image, mask, background_value))
        })?;
        Ok(result.into_pyarray(py))
    }

    /// `method` is "consecutive_difference", "reference_difference" or
    /// "running_background".
    #[pyfunction]
    #[pyo3(signature = (frames, method = "consecutive_difference"))]
    pub fn detect_temporal_motion<'py>(
        py: Python<'py>,
        frames: Vec<ImageArg<'py>>,
        method: &str,
    ) -> PyResult<Vec<PyImage<'py>>> {
        let method: MotionMethod = method.parse()?;
        let frames: Vec<ArrayD<f64>> = frames.iter().map(widen).collect();
        let views: Vec<_> = frames.iter().map(|frame| frame.view()).collect();
        let maps = point_ops::detect_temporal_motion(&views, method)?;
        Ok(maps.into_iter().map(|map| map.into_pyarray(py)).collect())
    }

    #[pyfunction]
    pub fn compare_metrics<'py>(
        py: Python<'py>,
        a: ImageArg<'py>,
        b: ImageArg<'py>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let metrics = with_view!(a, |a| with_view!(b, |b| point_ops::compare_metrics(a, b)))?;
        let dict = PyDict::new(py);
        dict.set_item("mae", metrics.mae)?;
        dict.set_item("mse", metrics.mse)?;
        dict.set_item("psnr", metrics.psnr)?;
        dict.set_item("correlation", metrics.correlation)?;
        dict.set_item("max_abs_difference", metrics.max_abs_difference)?;
        dict.set_item("mean_difference", metrics.mean_difference)?;
        dict.set_item("identical_count", metrics.identical_count)?;
        dict.set_item("identical_fraction", metrics.identical_fraction)?;
        Ok(dict)
    }

    /// Python module definition
    #[pymodule]
    pub fn cvlab_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Color spaces
        m.add_function(wrap_pyfunction!(to_grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(channel_statistics, m)?)?;
        m.add_function(wrap_pyfunction!(rgb_to_ycbcr, m)?)?;
        m.add_function(wrap_pyfunction!(ycbcr_to_rgb, m)?)?;
        m.add_function(wrap_pyfunction!(extract_luma, m)?)?;
        m.add_function(wrap_pyfunction!(extract_chroma, m)?)?;
        m.add_function(wrap_pyfunction!(rgb_to_hsv, m)?)?;
        m.add_function(wrap_pyfunction!(hsv_to_rgb, m)?)?;
        m.add_function(wrap_pyfunction!(extract_hue, m)?)?;
        m.add_function(wrap_pyfunction!(filter_by_color, m)?)?;
        m.add_function(wrap_pyfunction!(rgb_to_lab, m)?)?;
        m.add_function(wrap_pyfunction!(lab_to_rgb, m)?)?;
        m.add_function(wrap_pyfunction!(extract_lightness, m)?)?;
        m.add_function(wrap_pyfunction!(delta_e, m)?)?;

        // Tonal operations
        m.add_function(wrap_pyfunction!(adjust_brightness_contrast, m)?)?;
        m.add_function(wrap_pyfunction!(remap_range, m)?)?;
        m.add_function(wrap_pyfunction!(apply_piecewise_curve, m)?)?;
        m.add_function(wrap_pyfunction!(transform_statistics, m)?)?;
        m.add_function(wrap_pyfunction!(gamma_correct, m)?)?;
        m.add_function(wrap_pyfunction!(invert_gamma, m)?)?;
        m.add_function(wrap_pyfunction!(gamma_adaptive_by_region, m)?)?;
        m.add_function(wrap_pyfunction!(detect_gamma, m)?)?;
        m.add_function(wrap_pyfunction!(generate_gamma_curve, m)?)?;

        // Normalization
        m.add_function(wrap_pyfunction!(normalize_min_max, m)?)?;
        m.add_function(wrap_pyfunction!(normalize_z_score, m)?)?;
        m.add_function(wrap_pyfunction!(normalize_percentile, m)?)?;
        m.add_function(wrap_pyfunction!(normalize_adaptive_local, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_histogram_local, m)?)?;
        m.add_function(wrap_pyfunction!(normalization_metrics, m)?)?;

        // Arithmetic
        m.add_function(wrap_pyfunction!(combine, m)?)?;
        m.add_function(wrap_pyfunction!(alpha_blend, m)?)?;
        m.add_function(wrap_pyfunction!(background_subtract, m)?)?;
        m.add_function(wrap_pyfunction!(flat_field_correct, m)?)?;
        m.add_function(wrap_pyfunction!(fuse_exposures, m)?)?;
        m.add_function(wrap_pyfunction!(apply_mask, m)?)?;
        m.add_function(wrap_pyfunction!(detect_temporal_motion, m)?)?;
        m.add_function(wrap_pyfunction!(compare_metrics, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::cvlab_rust;
