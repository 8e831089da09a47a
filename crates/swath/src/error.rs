//! Swath adapter error types.

use calibration::CalibrationError;
use navigation::NavigationError;
use swath_common::SwathError;
use thiserror::Error;

/// Result type alias using AdapterError.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid swath configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse swath configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Swath(#[from] SwathError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl AdapterError {
    /// True for errors caused by bad settings, tables or metadata.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            AdapterError::InvalidConfig(_) | AdapterError::Yaml(_) => true,
            AdapterError::Swath(e) => e.is_configuration_error(),
            AdapterError::Calibration(e) => e.is_configuration_error(),
            AdapterError::Navigation(_) => false,
        }
    }
}
