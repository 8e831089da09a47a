//! Geostationary satellite projection.
//!
//! The satellite views Earth from a fixed position above the equator and
//! coordinates are scan angles in radians from nadir. Two scan geometries
//! are supported: GOES (sweep around the x axis, e.g. GOES-R ABI) and GEOS
//! (sweep around the y axis, e.g. Meteosat SEVIRI, CGMS normalized
//! geostationary projection).
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 4,
//! CGMS 03 section 4.4.3.2.

use crate::error::{ProjectionError, ProjectionResult};
use crate::MapProjection;
use serde::{Deserialize, Serialize};

/// Orbit radius used for GOES-R (km from Earth center).
pub const H_GOESR: f64 = 42164.16;
/// Orbit radius used for Meteosat Second Generation (km from Earth center).
pub const H_MSG: f64 = 42164.0;

/// Scan geometry of the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanGeometry {
    /// Sweep around the x axis (GOES-R ABI)
    Goes,
    /// Sweep around the y axis (Meteosat, Himawari)
    Geos,
}

/// Earth figure for the geostationary transform, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geoid {
    pub r_eq: f64,
    pub r_pol: f64,
    pub flattening: f64,
}

impl Geoid {
    pub const WGS84: Geoid = Geoid {
        r_eq: 6378.1370,
        r_pol: 6356.7523,
        flattening: 1.0 / 298.257223563,
    };

    pub const GRS80: Geoid = Geoid {
        r_eq: 6378.1370,
        r_pol: 6356.7523,
        flattening: 1.0 / 298.257222101,
    };
}

/// Geostationary projection parameters.
///
/// Scan angles relate to grid indices linearly: `x = x_origin + i * dx`,
/// `y = y_origin + j * dy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geostationary {
    pub scan_geometry: ScanGeometry,
    /// Satellite distance from Earth center (km)
    pub h: f64,
    /// Equatorial radius (km)
    pub r_eq: f64,
    /// Polar radius (km)
    pub r_pol: f64,
    /// Longitude of satellite nadir point (radians)
    pub sub_lon: f64,
    /// X coordinate of first grid point (radians)
    pub x_origin: f64,
    /// Y coordinate of first grid point (radians)
    pub y_origin: f64,
    /// Grid spacing in X direction (radians)
    pub dx: f64,
    /// Grid spacing in Y direction (radians)
    pub dy: f64,
    /// Number of grid points in X direction
    pub nx: usize,
    /// Number of grid points in Y direction
    pub ny: usize,
    fp: f64,
    d: f64,
}

impl Geostationary {
    /// Transform for a satellite at `sub_lon_deg` using the geoid and orbit
    /// radius conventional for the scan geometry (GRS80 for GOES, WGS84 for GEOS).
    ///
    /// The grid defaults to the identity mapping (one grid unit per radian).
    pub fn new(sub_lon_deg: f64, scan_geometry: ScanGeometry) -> Self {
        let geoid = match scan_geometry {
            ScanGeometry::Goes => Geoid::GRS80,
            ScanGeometry::Geos => Geoid::WGS84,
        };
        Self::with_geoid(sub_lon_deg, scan_geometry, geoid)
    }

    /// Transform with an explicit geoid.
    pub fn with_geoid(sub_lon_deg: f64, scan_geometry: ScanGeometry, geoid: Geoid) -> Self {
        let h = match scan_geometry {
            ScanGeometry::Goes => H_GOESR,
            ScanGeometry::Geos => H_MSG,
        };
        Self::build(scan_geometry, h, geoid, sub_lon_deg)
    }

    fn build(scan_geometry: ScanGeometry, h: f64, geoid: Geoid, sub_lon_deg: f64) -> Self {
        let f = geoid.flattening;
        Self {
            scan_geometry,
            h,
            r_eq: geoid.r_eq,
            r_pol: geoid.r_pol,
            sub_lon: sub_lon_deg.to_radians(),
            x_origin: 0.0,
            y_origin: 0.0,
            dx: 1.0,
            dy: 1.0,
            nx: 0,
            ny: 0,
            fp: 1.0 / ((1.0 - f) * (1.0 - f)),
            d: h * h - geoid.r_eq * geoid.r_eq,
        }
    }

    /// Attach a scan-angle grid.
    pub fn with_grid(
        mut self,
        x_origin: f64,
        y_origin: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> ProjectionResult<Self> {
        if dx == 0.0 || dy == 0.0 || !dx.is_finite() || !dy.is_finite() {
            return Err(ProjectionError::invalid(
                "grid spacing",
                format!("dx and dy must be finite and non-zero, got {} and {}", dx, dy),
            ));
        }
        self.x_origin = x_origin;
        self.y_origin = y_origin;
        self.dx = dx;
        self.dy = dy;
        self.nx = nx;
        self.ny = ny;
        Ok(self)
    }

    /// Create a projection from GOES-R fixed-grid metadata.
    ///
    /// # Arguments
    /// * `perspective_point_height` - Satellite altitude above Earth surface (meters)
    /// * `semi_major_axis` - Earth equatorial radius (meters)
    /// * `semi_minor_axis` - Earth polar radius (meters)
    /// * `longitude_origin_deg` - Satellite longitude (degrees, negative for west)
    /// * `x_origin`, `y_origin` - Scan angles of the first grid point (radians)
    /// * `dx`, `dy` - Grid spacing (radians)
    /// * `nx`, `ny` - Grid dimensions
    #[allow(clippy::too_many_arguments)]
    pub fn from_goes(
        perspective_point_height: f64,
        semi_major_axis: f64,
        semi_minor_axis: f64,
        longitude_origin_deg: f64,
        x_origin: f64,
        y_origin: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> ProjectionResult<Self> {
        if !(semi_major_axis > 0.0 && semi_minor_axis > 0.0 && perspective_point_height > 0.0) {
            return Err(ProjectionError::invalid(
                "geoid",
                "axes and perspective height must be positive",
            ));
        }
        let geoid = Geoid {
            r_eq: semi_major_axis / 1000.0,
            r_pol: semi_minor_axis / 1000.0,
            flattening: (semi_major_axis - semi_minor_axis) / semi_major_axis,
        };
        let h = (perspective_point_height + semi_major_axis) / 1000.0;
        Self::build(ScanGeometry::Goes, h, geoid, longitude_origin_deg)
            .with_grid(x_origin, y_origin, dx, dy, nx, ny)
    }

    /// GOES-16 (GOES-East at 75°W) CONUS sector.
    ///
    /// - X: from -0.10136 to 0.03864 radians (west to east)
    /// - Y: from 0.12824 to 0.04424 radians (north to south)
    /// - Resolution: 0.000028 rad per pixel (1km at nadir)
    /// - Grid: 5000 x 3000 pixels
    pub fn goes16_conus() -> Self {
        Self::new(-75.0, ScanGeometry::Goes).with_conus_grid()
    }

    fn with_conus_grid(mut self) -> Self {
        self.x_origin = -0.101360;
        self.y_origin = 0.128226;
        self.dx = 0.000028;
        self.dy = -0.000028;
        self.nx = 5000;
        self.ny = 3000;
        self
    }

    /// Convert grid indices (i, j) to scan angles (x, y) in radians.
    #[inline]
    pub fn grid_to_scan(&self, i: f64, j: f64) -> (f64, f64) {
        (self.x_origin + i * self.dx, self.y_origin + j * self.dy)
    }

    /// Convert scan angles (x, y) to grid indices (i, j).
    #[inline]
    pub fn scan_to_grid(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.x_origin) / self.dx, (y - self.y_origin) / self.dy)
    }

    /// Rotate GOES (x-sweep) scan angles into GEOS (y-sweep) angles.
    pub fn goes_to_geos(lambda_goes: f64, theta_goes: f64) -> (f64, f64) {
        let theta_geos = (theta_goes.sin() * lambda_goes.cos()).asin();
        let lambda_geos = (lambda_goes.tan() / theta_goes.cos()).atan();
        (lambda_geos, theta_geos)
    }

    /// Convert scan angles (radians) to geographic (lon, lat) degrees.
    ///
    /// Returns None if the line of sight misses the Earth.
    pub fn scan_to_geo(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (x, y) = match self.scan_geometry {
            ScanGeometry::Goes => Self::goes_to_geos(x, y),
            ScanGeometry::Geos => (x, y),
        };
        let (sin_x, cos_x) = x.sin_cos();
        let (sin_y, cos_y) = y.sin_cos();

        let c1 = (self.h * cos_x * cos_y).powi(2);
        let denom = cos_y * cos_y + self.fp * sin_y * sin_y;
        let c2 = denom * self.d;
        if c1 < c2 || c1.is_nan() || c2.is_nan() {
            return None;
        }

        let s_n = (self.h * cos_x * cos_y - (c1 - c2).sqrt()) / denom;
        let s_1 = self.h - s_n * cos_x * cos_y;
        let s_2 = s_n * sin_x * cos_y;
        let s_3 = -s_n * sin_y;
        let s_xy = s_1.hypot(s_2);

        let mut lon = ((s_2 / s_1).atan() + self.sub_lon).to_degrees();
        let lat = (-self.fp * (s_3 / s_xy)).atan().to_degrees();
        if lon < -180.0 {
            lon += 360.0;
        }
        if lon > 180.0 {
            lon -= 360.0;
        }
        Some((lon, lat))
    }

    /// Convert geographic (lon, lat) degrees to scan angles (radians).
    ///
    /// Returns None if the point is on the far side of the Earth.
    pub fn geo_to_scan(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.sub_lon;

        let req2 = self.r_eq * self.r_eq;
        let rpol2 = self.r_pol * self.r_pol;

        // Geocentric latitude and distance from Earth center to the surface point
        let gc_lat = ((rpol2 / req2) * lat.tan()).atan();
        let cos_gc = gc_lat.cos();
        let r_earth = self.r_pol / (1.0 - ((req2 - rpol2) / req2) * cos_gc * cos_gc).sqrt();

        let r_1 = self.h - r_earth * cos_gc * dlon.cos();
        let r_2 = -r_earth * cos_gc * dlon.sin();
        let r_3 = r_earth * gc_lat.sin();

        // Two intersections with the geoid; only the near one is visible.
        if r_1 > self.h || r_1.is_nan() {
            return None;
        }

        let r = (r_1 * r_1 + r_2 * r_2 + r_3 * r_3).sqrt();
        let scan = match self.scan_geometry {
            ScanGeometry::Geos => ((-r_2 / r_1).atan(), (r_3 / r).asin()),
            ScanGeometry::Goes => ((-r_2 / r).asin(), (r_3 / r_1).atan()),
        };
        Some(scan)
    }

    /// Convert geographic (lon, lat) degrees to grid indices (i, j).
    pub fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let (x, y) = self.geo_to_scan(lon_deg, lat_deg)?;
        Some(self.scan_to_grid(x, y))
    }

    /// Convert grid indices (i, j) to geographic (lon, lat) degrees.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> Option<(f64, f64)> {
        let (x, y) = self.grid_to_scan(i, j);
        self.scan_to_geo(x, y)
    }

    /// Geographic bounding box of the grid as (min_lon, min_lat, max_lon, max_lat).
    ///
    /// Samples the grid edges, since the projected edges are curved.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        let last_i = self.nx.saturating_sub(1) as f64;
        let last_j = self.ny.saturating_sub(1) as f64;
        let samples = 50;
        for t in 0..=samples {
            let frac = t as f64 / samples as f64;
            let edges = [
                (frac * last_i, 0.0),
                (frac * last_i, last_j),
                (0.0, frac * last_j),
                (last_i, frac * last_j),
            ];
            for (i, j) in edges {
                if let Some((lon, lat)) = self.grid_to_geo(i, j) {
                    min_lat = min_lat.min(lat);
                    max_lat = max_lat.max(lat);
                    min_lon = min_lon.min(lon);
                    max_lon = max_lon.max(lon);
                }
            }
        }

        (min_lon, min_lat, max_lon, max_lat)
    }

    /// Check if a geographic point is visible and inside the grid.
    pub fn contains(&self, lon_deg: f64, lat_deg: f64) -> bool {
        match self.geo_to_grid(lon_deg, lat_deg) {
            Some((i, j)) => i >= 0.0 && i < self.nx as f64 && j >= 0.0 && j < self.ny as f64,
            None => false,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

/// Planar coordinates are scan angles in radians.
impl MapProjection for Geostationary {
    fn to_earth(&self, x: f64, y: f64) -> (f64, f64) {
        self.scan_to_geo(x, y).unwrap_or((f64::NAN, f64::NAN))
    }

    fn from_earth(&self, lon: f64, lat: f64) -> (f64, f64) {
        self.geo_to_scan(lon, lat).unwrap_or((f64::NAN, f64::NAN))
    }
}
