//! Linear sample domains for dense pixel grids.
//!
//! A `Linear1D` describes `len` evenly spaced samples from `first` to `last`
//! (inclusive). Pixel coordinates are mapped to fractional grid indices and
//! back; the 2-D form is the tensor product of two axes, x varying fastest.

use crate::error::{SwathError, SwathResult};
use crate::subset::DimRange;
use serde::{Deserialize, Serialize};

/// Evenly spaced 1-D sample domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linear1D {
    pub first: f64,
    pub last: f64,
    pub len: usize,
}

impl Linear1D {
    pub fn new(first: f64, last: f64, len: usize) -> Self {
        Self { first, last, len }
    }

    /// Index axis `0..len` with unit spacing.
    pub fn indices(len: usize) -> Self {
        Self::new(0.0, len.saturating_sub(1) as f64, len)
    }

    /// Domain selected by a subset range.
    pub fn from_range(range: &DimRange) -> Self {
        let len = range.count();
        let last = range.start + len.saturating_sub(1) as f64 * range.stride;
        Self::new(range.start, last, len)
    }

    /// Spacing between consecutive samples (zero for a single sample).
    #[inline]
    pub fn step(&self) -> f64 {
        if self.len > 1 {
            (self.last - self.first) / (self.len - 1) as f64
        } else {
            0.0
        }
    }

    /// Convert a value to a fractional grid index.
    #[inline]
    pub fn value_to_grid(&self, value: f64) -> f64 {
        let step = self.step();
        if step == 0.0 {
            return 0.0;
        }
        (value - self.first) / step
    }

    /// Convert a fractional grid index to a value.
    #[inline]
    pub fn grid_to_value(&self, grid: f64) -> f64 {
        self.first + grid * self.step()
    }

    pub fn low(&self) -> f64 {
        self.first.min(self.last)
    }

    pub fn high(&self) -> f64 {
        self.first.max(self.last)
    }
}

/// Tensor-product 2-D sample domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linear2D {
    pub x: Linear1D,
    pub y: Linear1D,
}

impl Linear2D {
    pub fn new(x: Linear1D, y: Linear1D) -> Self {
        Self { x, y }
    }

    /// Index domain `0..width` × `0..height`.
    pub fn indices(width: usize, height: usize) -> Self {
        Self::new(Linear1D::indices(width), Linear1D::indices(height))
    }

    /// Domain selected by two subset ranges (x = cross-track, y = along-track).
    pub fn from_ranges(x: &DimRange, y: &DimRange) -> Self {
        Self::new(Linear1D::from_range(x), Linear1D::from_range(y))
    }

    pub fn lengths(&self) -> (usize, usize) {
        (self.x.len, self.y.len)
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.x.len * self.y.len
    }

    pub fn is_empty(&self) -> bool {
        self.x.len == 0 || self.y.len == 0
    }

    #[inline]
    pub fn value_to_grid(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.value_to_grid(x), self.y.value_to_grid(y))
    }

    #[inline]
    pub fn grid_to_value(&self, gx: f64, gy: f64) -> (f64, f64) {
        (self.x.grid_to_value(gx), self.y.grid_to_value(gy))
    }

    /// Sample values for every point in row-major order.
    pub fn samples(&self) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::with_capacity(self.len());
        let mut ys = Vec::with_capacity(self.len());
        for j in 0..self.y.len {
            let y = self.y.grid_to_value(j as f64);
            for i in 0..self.x.len {
                xs.push(self.x.grid_to_value(i as f64));
                ys.push(y);
            }
        }
        (xs, ys)
    }

    /// Validate that a flat array matches this domain's sample count.
    pub fn check_len(&self, what: &str, actual: usize) -> SwathResult<()> {
        if actual != self.len() {
            return Err(SwathError::length_mismatch(what, self.len(), actual));
        }
        Ok(())
    }
}
