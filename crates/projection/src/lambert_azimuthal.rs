//! Lambert Azimuthal Equal-Area projection on a sphere.
//!
//! Planar coordinates are meters from the projection center (plus any false
//! easting/northing). Geographic coordinates are degrees at the public
//! boundary and radians internally.

use crate::error::{ProjectionError, ProjectionResult};
use crate::gctp::{adjust_lon, asinz, EPSLN};
use crate::MapProjection;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Default earth radius for locally-fit projections (meters).
pub const DEFAULT_RADIUS: f64 = 6367470.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct LaeaParams {
    radius: f64,
    lon_center: f64,
    lat_center: f64,
    false_easting: f64,
    false_northing: f64,
}

/// Spherical Lambert Azimuthal Equal-Area projection.
///
/// Two instances are equal when their radius, center and offsets are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LaeaParams", into = "LaeaParams")]
pub struct LambertAzimuthalEqualArea {
    /// Sphere radius (meters)
    radius: f64,
    /// Center longitude (radians)
    lon_center: f64,
    /// Center latitude (radians)
    lat_center: f64,
    false_easting: f64,
    false_northing: f64,
    sin_lat_o: f64,
    cos_lat_o: f64,
}

impl LambertAzimuthalEqualArea {
    /// Projection centered at `(lon_deg, lat_deg)` on the default sphere.
    pub fn centered(lon_deg: f64, lat_deg: f64) -> Self {
        Self::from_params(LaeaParams {
            radius: DEFAULT_RADIUS,
            lon_center: lon_deg.to_radians(),
            lat_center: lat_deg.to_radians(),
            false_easting: 0.0,
            false_northing: 0.0,
        })
    }

    /// Fully parameterized projection.
    ///
    /// # Arguments
    /// * `radius` - Sphere radius (meters), must be positive
    /// * `lon_center_deg` - Center longitude (degrees)
    /// * `lat_center_deg` - Center latitude (degrees), within [-90, 90]
    /// * `false_easting` - Added to projected x (meters)
    /// * `false_northing` - Added to projected y (meters)
    pub fn new(
        radius: f64,
        lon_center_deg: f64,
        lat_center_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> ProjectionResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ProjectionError::invalid(
                "radius",
                format!("must be positive, got {}", radius),
            ));
        }
        if !lon_center_deg.is_finite() {
            return Err(ProjectionError::invalid(
                "lon_center",
                format!("must be finite, got {}", lon_center_deg),
            ));
        }
        if !(-90.0..=90.0).contains(&lat_center_deg) {
            return Err(ProjectionError::invalid(
                "lat_center",
                format!("must be within [-90, 90], got {}", lat_center_deg),
            ));
        }
        Ok(Self::from_params(LaeaParams {
            radius,
            lon_center: lon_center_deg.to_radians(),
            lat_center: lat_center_deg.to_radians(),
            false_easting,
            false_northing,
        }))
    }

    fn from_params(p: LaeaParams) -> Self {
        Self {
            radius: p.radius,
            lon_center: p.lon_center,
            lat_center: p.lat_center,
            false_easting: p.false_easting,
            false_northing: p.false_northing,
            sin_lat_o: p.lat_center.sin(),
            cos_lat_o: p.lat_center.cos(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Projection center as (lon, lat) in degrees.
    pub fn center(&self) -> (f64, f64) {
        (self.lon_center.to_degrees(), self.lat_center.to_degrees())
    }

    /// Planar (x, y) in meters to (lon, lat) in radians.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = x.hypot(y);
        let z = 2.0 * asinz(rh / (2.0 * self.radius));
        let (sin_z, cos_z) = z.sin_cos();

        let mut lon = self.lon_center;
        let lat;
        if rh.abs() > EPSLN {
            lat = asinz(self.sin_lat_o * cos_z + self.cos_lat_o * sin_z * y / rh);
            if (self.lat_center.abs() - FRAC_PI_2).abs() > EPSLN {
                let temp = cos_z - self.sin_lat_o * lat.sin();
                if temp != 0.0 {
                    lon = adjust_lon(
                        self.lon_center + (x * sin_z * self.cos_lat_o).atan2(temp * rh),
                    );
                }
            } else if self.lat_center < 0.0 {
                lon = adjust_lon(self.lon_center - (-x).atan2(y));
            } else {
                lon = adjust_lon(self.lon_center + x.atan2(-y));
            }
        } else {
            lat = self.lat_center;
        }
        (lon, lat)
    }

    /// (lon, lat) in radians to planar (x, y) in meters.
    ///
    /// The antipode of the center maps to a circle rather than a point, so
    /// it comes back as (NaN, NaN).
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let delta_lon = adjust_lon(lon - self.lon_center);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_dlon, cos_dlon) = delta_lon.sin_cos();

        let g = self.sin_lat_o * sin_lat + self.cos_lat_o * cos_lat * cos_dlon;
        if 1.0 + g <= EPSLN {
            return (f64::NAN, f64::NAN);
        }
        let ksp = self.radius * (2.0 / (1.0 + g)).sqrt();
        let x = ksp * cos_lat * sin_dlon + self.false_easting;
        let y = ksp * (self.cos_lat_o * sin_lat - self.sin_lat_o * cos_lat * cos_dlon)
            + self.false_northing;
        (x, y)
    }

    fn params(&self) -> LaeaParams {
        LaeaParams {
            radius: self.radius,
            lon_center: self.lon_center,
            lat_center: self.lat_center,
            false_easting: self.false_easting,
            false_northing: self.false_northing,
        }
    }
}

impl PartialEq for LambertAzimuthalEqualArea {
    fn eq(&self, other: &Self) -> bool {
        self.params() == other.params()
    }
}

impl From<LaeaParams> for LambertAzimuthalEqualArea {
    fn from(p: LaeaParams) -> Self {
        Self::from_params(p)
    }
}

impl From<LambertAzimuthalEqualArea> for LaeaParams {
    fn from(p: LambertAzimuthalEqualArea) -> Self {
        p.params()
    }
}

impl MapProjection for LambertAzimuthalEqualArea {
    fn to_earth(&self, x: f64, y: f64) -> (f64, f64) {
        let (lon, lat) = self.inverse(x, y);
        (lon.to_degrees(), lat.to_degrees())
    }

    fn from_earth(&self, lon: f64, lat: f64) -> (f64, f64) {
        self.forward(lon.to_radians(), lat.to_radians())
    }
}
