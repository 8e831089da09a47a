//! Calibration error types.

use swath_common::SwathError;
use thiserror::Error;

/// Result type alias using CalibrationError.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Construction and contract failures.
///
/// Bad counts never produce an error; they calibrate to NaN.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Invalid coefficients for {channel}: {message}")]
    InvalidCoefficients { channel: String, message: String },

    #[error("{channel} needs {what} to calibrate")]
    MissingAncillary { channel: String, what: &'static str },

    #[error("Granule calibrator list is empty")]
    EmptyAggregation,

    #[error("Granule calibrators disagree on output: {first} vs {other}")]
    MixedQuantities { first: String, other: String },

    #[error("Granule index {index} out of range for {len} granules")]
    GranuleOutOfRange { index: usize, len: usize },

    #[error("Failed to read calibration table: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Swath(#[from] SwathError),
}

impl CalibrationError {
    pub(crate) fn invalid(channel: &str, message: impl Into<String>) -> Self {
        CalibrationError::InvalidCoefficients {
            channel: channel.to_string(),
            message: message.into(),
        }
    }

    /// True for errors raised while loading or validating coefficients.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            CalibrationError::InvalidCoefficients { .. }
            | CalibrationError::Io(_)
            | CalibrationError::Yaml(_)
            | CalibrationError::Json(_) => true,
            CalibrationError::Swath(err) => err.is_configuration_error(),
            _ => false,
        }
    }
}
