//! Test support for the swath crates.
//!
//! - [`generators`]: synthetic lon/lat grids (regular, sheared, dateline,
//!   with missing scan lines), count ramps and radiance fields
//! - [`fixtures`]: calibration tables, EPS metadata readers and a small swath
//!   reader, plus temporary-file helpers
//! - `assert_approx_eq!` / `assert_coords_approx_eq!` for float comparisons
//!   that treat two NaNs as equal
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, create_lonlat_grid};
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// `true` when `left` and `right` agree within `epsilon`, or are both NaN.
#[doc(hidden)]
pub fn approx_eq(left: f64, right: f64, epsilon: f64) -> bool {
    (left.is_nan() && right.is_nan()) || (left - right).abs() <= epsilon
}

/// Assert two floats agree within an absolute tolerance.
///
/// Both sides are widened to f64. Two NaNs compare equal, so geolocation
/// and calibration outputs can be checked without special-casing fill.
///
/// ```ignore
/// assert_approx_eq!(301.4681, bt, 1e-4);
/// assert_approx_eq!(f64::NAN, lon, 0.0);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        if !$crate::approx_eq(left, right, epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > `{:?}`",
                left,
                right,
                (left - right).abs(),
                epsilon
            );
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        if !$crate::approx_eq(left, right, epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`: {}\n  left: `{:?}`\n right: `{:?}`",
                format_args!($($arg)+),
                left,
                right
            );
        }
    }};
}

/// Assert two coordinate pairs agree component-wise.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (l, r) = ($left, $right);
        $crate::assert_approx_eq!(l.0, r.0, $epsilon, "first coordinate of {:?} vs {:?}", l, r);
        $crate::assert_approx_eq!(l.1, r.1, $epsilon, "second coordinate of {:?} vs {:?}", l, r);
    }};
}
