//! Reference ellipsoid lookup by spheroid code.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of entries in the spheroid table.
pub const SPHEROID_COUNT: usize = 20;

/// Radius of the reference sphere (code 19), meters.
pub const SPHERE_RADIUS: f64 = 6370997.0;

const MAJOR: [f64; SPHEROID_COUNT] = [
    6378206.4,
    6378249.145,
    6377397.155,
    6378157.5,
    6378388.0,
    6378135.0,
    6377276.3452,
    6378145.0,
    6378137.0,
    6377563.396,
    6377304.063,
    6377340.189,
    6378137.0,
    6378155.0,
    6378160.0,
    6378245.0,
    6378270.0,
    6378166.0,
    6378150.0,
    6370997.0,
];

const MINOR: [f64; SPHEROID_COUNT] = [
    6356583.8,
    6356514.86955,
    6356078.96284,
    6356772.2,
    6356911.94613,
    6356750.519915,
    6356075.4133,
    6356759.769356,
    6356752.31414,
    6356256.91,
    6356103.039,
    6356034.448,
    6356752.314245,
    6356773.3205,
    6356774.719,
    6356863.0188,
    6356794.343479,
    6356784.283666,
    6356768.337303,
    6370997.0,
];

const NAMES: [&str; SPHEROID_COUNT] = [
    "Clarke 1866",
    "Clarke 1880",
    "Bessel",
    "International 1967",
    "International 1909",
    "WGS 72",
    "Everest",
    "WGS 66",
    "GRS 1980",
    "Airy",
    "Modified Everest",
    "Modified Airy",
    "WGS 84",
    "Southeast Asia",
    "Australian National",
    "Krassovsky",
    "Hough",
    "Mercury 1960",
    "Modified Mercury 1968",
    "Sphere",
];

/// Semi-major and semi-minor axes plus the sphere radius used by
/// spherical-earth projection formulas. All values in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub semi_major: f64,
    pub semi_minor: f64,
    pub radius: f64,
}

impl Ellipsoid {
    pub const CLARKE_1866: Ellipsoid = Ellipsoid {
        semi_major: MAJOR[0],
        semi_minor: MINOR[0],
        radius: SPHERE_RADIUS,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major: MAJOR[8],
        semi_minor: MINOR[8],
        radius: SPHERE_RADIUS,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: MAJOR[12],
        semi_minor: MINOR[12],
        radius: SPHERE_RADIUS,
    };

    pub const SPHERE: Ellipsoid = Ellipsoid {
        semi_major: SPHERE_RADIUS,
        semi_minor: SPHERE_RADIUS,
        radius: SPHERE_RADIUS,
    };

    /// Select an ellipsoid by spheroid code.
    ///
    /// A non-negative code picks a table entry; codes past the end of the
    /// table fall back to Clarke 1866. A negative code derives the ellipsoid
    /// from `params` instead (see [`Ellipsoid::from_parameters`]).
    pub fn select(code: i64, params: [f64; 2]) -> Self {
        if code < 0 {
            return Self::from_parameters(params[0], params[1]);
        }
        Self::from_code(code as usize)
    }

    /// Table entry for a spheroid code, with the Clarke 1866 fallback.
    pub fn from_code(code: usize) -> Self {
        let idx = if code >= SPHEROID_COUNT {
            warn!(code, "Invalid spheroid code, using Clarke 1866");
            0
        } else {
            code
        };
        Self {
            semi_major: MAJOR[idx],
            semi_minor: MINOR[idx],
            radius: SPHERE_RADIUS,
        }
    }

    /// Derive an ellipsoid from explicit parameters.
    ///
    /// * `major > 0, p1 > 1`: p1 is the semi-minor axis.
    /// * `major > 0, 0 < p1 <= 1`: p1 is the eccentricity squared.
    /// * `major > 0, p1 == 0`: a sphere of radius `major`.
    /// * `major == 0, p1 > 0`: Clarke 1866.
    /// * both zero: the reference sphere.
    pub fn from_parameters(major: f64, p1: f64) -> Self {
        let major = major.abs();
        let p1 = p1.abs();

        if major > 0.0 {
            let minor = if p1 > 1.0 {
                p1
            } else if p1 > 0.0 {
                (1.0 - p1).sqrt() * major
            } else {
                major
            };
            Self {
                semi_major: major,
                semi_minor: minor,
                radius: major,
            }
        } else if p1 > 0.0 {
            Self {
                semi_major: MAJOR[0],
                semi_minor: MINOR[0],
                radius: MAJOR[0],
            }
        } else {
            Self {
                semi_major: MAJOR[SPHEROID_COUNT - 1],
                semi_minor: SPHERE_RADIUS,
                radius: MAJOR[SPHEROID_COUNT - 1],
            }
        }
    }

    /// Conventional name of a table entry.
    pub fn name(code: usize) -> Option<&'static str> {
        NAMES.get(code).copied()
    }

    pub fn flattening(&self) -> f64 {
        (self.semi_major - self.semi_minor) / self.semi_major
    }

    pub fn eccentricity_squared(&self) -> f64 {
        1.0 - (self.semi_minor * self.semi_minor) / (self.semi_major * self.semi_major)
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_squared().sqrt()
    }

    pub fn is_sphere(&self) -> bool {
        self.semi_major == self.semi_minor
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::CLARKE_1866
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        let e = Ellipsoid::from_code(12);
        assert_eq!(e.semi_major, 6378137.0);
        assert_eq!(e.semi_minor, 6356752.314245);
        assert_eq!(e.radius, SPHERE_RADIUS);
        assert_eq!(Ellipsoid::name(12), Some("WGS 84"));
    }

    #[test]
    fn test_out_of_range_code_falls_back() {
        assert_eq!(Ellipsoid::select(20, [0.0, 0.0]), Ellipsoid::CLARKE_1866);
        assert_eq!(Ellipsoid::select(1000, [0.0, 0.0]), Ellipsoid::CLARKE_1866);
    }

    #[test]
    fn test_explicit_minor_axis() {
        let e = Ellipsoid::select(-1, [6378137.0, 6356752.0]);
        assert_eq!(e.semi_major, 6378137.0);
        assert_eq!(e.semi_minor, 6356752.0);
        assert_eq!(e.radius, 6378137.0);
    }

    #[test]
    fn test_explicit_eccentricity_squared() {
        let e2 = 0.00669438;
        let e = Ellipsoid::select(-1, [6378137.0, e2]);
        assert!((e.eccentricity_squared() - e2).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_sphere() {
        let e = Ellipsoid::select(-1, [6371000.0, 0.0]);
        assert!(e.is_sphere());
        assert_eq!(e.radius, 6371000.0);
    }

    #[test]
    fn test_degenerate_parameters() {
        let clarke = Ellipsoid::select(-1, [0.0, 0.5]);
        assert_eq!(clarke.semi_major, 6378206.4);
        assert_eq!(clarke.radius, 6378206.4);

        let sphere = Ellipsoid::select(-1, [0.0, 0.0]);
        assert_eq!(sphere, Ellipsoid::SPHERE);
    }

    #[test]
    fn test_flattening() {
        let f = Ellipsoid::WGS84.flattening();
        assert!((1.0 / f - 298.257223563).abs() < 1e-3, "1/f = {}", 1.0 / f);
    }
}
