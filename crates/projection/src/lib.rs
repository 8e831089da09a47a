//! Map projections for swath geolocation.
//!
//! Implements the projection math from scratch: ellipsoid lookup, the GCTP
//! helper functions, Lambert Azimuthal Equal-Area and the geostationary
//! satellite view.

pub mod ellipsoid;
pub mod error;
pub mod gctp;
pub mod geostationary;
pub mod lambert_azimuthal;

pub use ellipsoid::Ellipsoid;
pub use error::{ProjectionError, ProjectionResult};
pub use geostationary::{Geoid, Geostationary, ScanGeometry};
pub use lambert_azimuthal::LambertAzimuthalEqualArea;

/// A projection between planar coordinates and geographic (lon, lat) degrees.
///
/// Scalar forms never fail: singular or invisible points come back as NaN.
/// Batch forms only fail when the input arrays differ in length.
pub trait MapProjection: Send + Sync {
    /// Planar (x, y) to geographic (lon, lat) in degrees.
    fn to_earth(&self, x: f64, y: f64) -> (f64, f64);

    /// Geographic (lon, lat) in degrees to planar (x, y).
    fn from_earth(&self, lon: f64, lat: f64) -> (f64, f64);

    fn to_earth_many(&self, x: &[f64], y: &[f64]) -> ProjectionResult<(Vec<f64>, Vec<f64>)> {
        check_lengths(x, y)?;
        Ok(x.iter()
            .zip(y)
            .map(|(&x, &y)| self.to_earth(x, y))
            .unzip())
    }

    fn from_earth_many(&self, lon: &[f64], lat: &[f64]) -> ProjectionResult<(Vec<f64>, Vec<f64>)> {
        check_lengths(lon, lat)?;
        Ok(lon
            .iter()
            .zip(lat)
            .map(|(&lon, &lat)| self.from_earth(lon, lat))
            .unzip())
    }
}

fn check_lengths(a: &[f64], b: &[f64]) -> ProjectionResult<()> {
    if a.len() != b.len() {
        return Err(ProjectionError::LengthMismatch {
            x_len: a.len(),
            y_len: b.len(),
        });
    }
    Ok(())
}
