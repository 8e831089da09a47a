//! Swath geolocation.
//!
//! Converts between image pixel coordinates and earth coordinates for
//! instrument swaths whose geolocation is stored as sample grids rather than
//! as projection parameters:
//!
//! - [`IrregularGridGeolocation`]: reduced-resolution lon/lat grid, bilinear
//!   forward interpolation with dateline and missing-line handling, inverse
//!   search in a local equal-area projection.
//! - [`RawGridNavigation`]: full-resolution lat/lon lookup grid with integer
//!   image scale factors, inverse search directly on the lat/lon mesh.
//!
//! Both inverse paths use [`CellSearch`], which takes its locality hint as an
//! explicit in/out argument.

pub mod cell_search;
pub mod error;
pub mod interpolation;
pub mod irregular;
pub mod raw_grid;

pub use cell_search::{CellSearch, SearchHint};
pub use error::{NavigationError, NavigationResult};
pub use irregular::IrregularGridGeolocation;
pub use raw_grid::{LatLonBounds, RawGridNavigation};

use rayon::prelude::*;
use swath_common::Linear2D;

/// Pixel ↔ earth mapping for one swath.
///
/// Earth coordinates are (longitude, latitude) in degrees. Points that
/// cannot be mapped come back as (NaN, NaN); only mismatched batch inputs
/// are errors.
pub trait Navigation: Send + Sync {
    /// Pixel domain the navigation is defined over.
    fn domain(&self) -> Linear2D;

    /// Pixel (x, y) to (lon, lat).
    fn to_reference(&self, x: f64, y: f64) -> (f64, f64);

    /// (lon, lat) to pixel (x, y), seeded and updated by `hint`.
    fn from_reference(&self, lon: f64, lat: f64, hint: &mut SearchHint) -> (f64, f64);

    /// Batch forward mapping, evaluated in parallel.
    fn to_reference_many(&self, x: &[f64], y: &[f64]) -> NavigationResult<(Vec<f64>, Vec<f64>)> {
        NavigationError::check_pair(x.len(), y.len())?;
        Ok(x.par_iter()
            .zip(y.par_iter())
            .map(|(&x, &y)| self.to_reference(x, y))
            .unzip())
    }

    /// Batch inverse mapping. Each point seeds the search for the next one.
    fn from_reference_many(
        &self,
        lon: &[f64],
        lat: &[f64],
    ) -> NavigationResult<(Vec<f64>, Vec<f64>)> {
        NavigationError::check_pair(lon.len(), lat.len())?;
        let mut hint = SearchHint::UNKNOWN;
        Ok(lon
            .iter()
            .zip(lat)
            .map(|(&lon, &lat)| self.from_reference(lon, lat, &mut hint))
            .unzip())
    }

    /// Earth coordinates of every pixel of the domain, row-major.
    fn earth_locations(&self) -> (Vec<f64>, Vec<f64>) {
        let (x, y) = self.domain().samples();
        x.par_iter()
            .zip(y.par_iter())
            .map(|(&x, &y)| self.to_reference(x, y))
            .unzip()
    }
}
