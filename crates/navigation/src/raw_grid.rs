//! Navigation from a full-resolution latitude/longitude lookup grid.
//!
//! Some geostationary imagers ship a lat/lon value for every pixel of a
//! reduced "navigation disk" instead of projection parameters. The image can
//! be an integer multiple of that disk in each direction. Forward lookup is a
//! nearest-sample read; inverse lookup walks the lat/lon mesh directly.

use crate::cell_search::{CellSearch, SearchHint};
use crate::error::{NavigationError, NavigationResult};
use crate::Navigation;
use swath_common::Linear2D;
use tracing::debug;

/// Geographic bounds of the valid samples, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl LatLonBounds {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGridNavigation {
    scans: usize,
    pixels: usize,
    height_scale: usize,
    width_scale: usize,
    bounds: LatLonBounds,
    /// Mesh with latitude as the first component and longitude as the second
    mesh: CellSearch,
}

impl RawGridNavigation {
    /// Build from a `pixels` x `scans` lookup grid.
    ///
    /// Latitudes at or above 90 and longitudes at or above 180 are fill and
    /// become NaN.
    pub fn new(
        mut lat: Vec<f64>,
        mut lon: Vec<f64>,
        scans: usize,
        pixels: usize,
        height_scale: usize,
        width_scale: usize,
    ) -> NavigationResult<Self> {
        NavigationError::check_pair(lat.len(), lon.len())?;
        if height_scale == 0 || width_scale == 0 {
            return Err(NavigationError::InvalidGrid(
                "scale factors must be at least 1".to_string(),
            ));
        }

        let mut bounds = LatLonBounds {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lon: f64::MAX,
            max_lon: f64::MIN,
        };
        for v in lat.iter_mut() {
            if *v < 90.0 {
                bounds.min_lat = bounds.min_lat.min(*v);
                bounds.max_lat = bounds.max_lat.max(*v);
            } else {
                *v = f64::NAN;
            }
        }
        for v in lon.iter_mut() {
            if *v < 180.0 {
                bounds.min_lon = bounds.min_lon.min(*v);
                bounds.max_lon = bounds.max_lon.max(*v);
            } else {
                *v = f64::NAN;
            }
        }
        if bounds.min_lat > bounds.max_lat || bounds.min_lon > bounds.max_lon {
            return Err(NavigationError::InvalidGrid(
                "lookup grid has no valid samples".to_string(),
            ));
        }

        let mesh = CellSearch::new(lat, lon, pixels, scans)?;
        debug!(
            scans,
            pixels,
            height_scale,
            width_scale,
            ?bounds,
            "Built raw grid navigation"
        );

        Ok(Self {
            scans,
            pixels,
            height_scale,
            width_scale,
            bounds,
            mesh,
        })
    }

    pub fn bounds(&self) -> LatLonBounds {
        self.bounds
    }

    /// Image dimensions (pixels, scans) after scaling.
    pub fn image_dimensions(&self) -> (usize, usize) {
        (self.pixels * self.width_scale, self.scans * self.height_scale)
    }
}

impl Navigation for RawGridNavigation {
    fn domain(&self) -> Linear2D {
        let (w, h) = self.image_dimensions();
        Linear2D::indices(w, h)
    }

    fn to_reference(&self, x: f64, y: f64) -> (f64, f64) {
        if x.is_nan() || y.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        let (w, h) = self.image_dimensions();
        let x = x.clamp(0.0, (w - 1) as f64);
        let y = y.clamp(0.0, (h - 1) as f64);
        let row = y as usize / self.height_scale;
        let col = x as usize / self.width_scale;
        let (lat, lon) = self.mesh.sample(col, row);
        if !(-90.0..=90.0).contains(&lat) || lon.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        (lon, lat)
    }

    fn from_reference(&self, lon: f64, lat: f64, hint: &mut SearchHint) -> (f64, f64) {
        if lon.is_nan() || lat.is_nan() {
            hint.reset();
            return (f64::NAN, f64::NAN);
        }
        let lon = if lon > 180.0 { lon - 360.0 } else { lon };
        if !self.bounds.contains(lon, lat) {
            hint.reset();
            return (f64::NAN, f64::NAN);
        }
        let (gx, gy) = self.mesh.locate(lat, lon, hint);
        if gx.is_nan() || gy.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        (
            gx * self.width_scale as f64,
            gy * self.height_scale as f64,
        )
    }
}
