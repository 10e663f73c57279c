//! Error types for pixel transforms.

use thiserror::Error;

/// Error type for every public transform.
///
/// All variants are raised before any per-pixel work starts, so a failed
/// call never produces partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CvError {
    /// Buffer rank is not 2 or 3.
    #[error("{name} must have 2 or 3 dimensions, got {ndim}")]
    Shape { name: String, ndim: usize },

    /// Buffer channel count does not fit the transform.
    #[error("{name} must have {expected} channel(s), got {found}")]
    Channel {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Element type outside u8, f32 and f64.
    #[error("{name} must be u8, f32 or f64, got {found}")]
    Type { name: String, found: &'static str },

    /// Scalar parameter outside its documented bound.
    #[error("{name} = {value} is out of range: {expected}")]
    Range {
        name: String,
        value: f64,
        expected: String,
    },

    /// Two buffers that must share a shape do not.
    #[error("{left_name}.shape {left:?} != {right_name}.shape {right:?}")]
    ShapeMismatch {
        left_name: String,
        left: Vec<usize>,
        right_name: String,
        right: Vec<usize>,
    },

    /// Unrecognized conversion or detection method.
    #[error("unknown method '{0}'")]
    InvalidMethod(String),

    /// Unrecognized arithmetic operation.
    #[error("unknown operation '{0}'")]
    InvalidOperation(String),

    /// Structurally impossible parameter combination.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored hue decodes to 360 degrees or more.
    #[error("hue byte {stored} decodes to {degrees} degrees, outside [0, 360)")]
    OutOfRangeHue { stored: u8, degrees: u32 },
}

/// Result type for pixel transforms.
pub type CvResult<T> = Result<T, CvError>;
