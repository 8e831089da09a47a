//! Navigation error types.

use projection::ProjectionError;
use swath_common::SwathError;
use thiserror::Error;

/// Result type alias using NavigationError.
pub type NavigationResult<T> = Result<T, NavigationError>;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Invalid navigation grid: {0}")]
    InvalidGrid(String),

    #[error("Coordinate arrays differ in length: {first} vs {second}")]
    LengthMismatch { first: usize, second: usize },

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Swath(#[from] SwathError),
}

impl NavigationError {
    pub(crate) fn check_pair(first: usize, second: usize) -> NavigationResult<()> {
        if first != second {
            return Err(NavigationError::LengthMismatch { first, second });
        }
        Ok(())
    }
}
