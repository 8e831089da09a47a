//! Error types shared across the swath crates.

use thiserror::Error;

/// Result type alias using SwathError.
pub type SwathResult<T> = Result<T, SwathError>;

/// Primary error type for configuration and contract failures.
///
/// Per-pixel domain failures (bad counts, points off the grid, projection
/// singularities) are never reported here; they surface as NaN in the
/// output arrays.
#[derive(Debug, Error)]
pub enum SwathError {
    // === Configuration Errors ===
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Unknown channel '{channel}' for instrument {instrument}")]
    UnknownChannel { instrument: String, channel: String },

    #[error("Missing calibration coefficients for {channel}: {message}")]
    MissingCoefficients { channel: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Contract Errors ===
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Subset is missing dimension '{0}'")]
    MissingDimension(String),

    #[error("Invalid range for dimension '{dim}': {message}")]
    InvalidRange { dim: String, message: String },

    #[error("Invalid grid shape: {0}")]
    InvalidShape(String),

    // === Reader Errors ===
    #[error("Array not found: {0}")]
    ArrayNotFound(String),

    #[error("Failed to read array '{name}': {message}")]
    ReadError { name: String, message: String },
}

impl SwathError {
    /// Shorthand for a length mismatch on a named input.
    pub fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        SwathError::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// True for errors that indicate bad metadata or tables rather than a caller defect.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SwathError::UnknownInstrument(_)
                | SwathError::UnknownChannel { .. }
                | SwathError::MissingCoefficients { .. }
                | SwathError::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for SwathError {
    fn from(err: serde_json::Error) -> Self {
        SwathError::InvalidConfig(format!("JSON error: {}", err))
    }
}
