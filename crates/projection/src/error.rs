//! Error types for projection construction and batch calls.

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Configuration and contract failures. Per-point singularities are NaN, not errors.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Coordinate arrays differ in length: x has {x_len}, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Invalid projection parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Illegal packed DMS {field} field in {value}")]
    PackedAngle { value: f64, field: &'static str },
}

impl ProjectionError {
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        ProjectionError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
