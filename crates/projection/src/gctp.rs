//! Projection math helpers in the style of the USGS General Cartographic
//! Transformation Package.
//!
//! All angles are radians unless a function says otherwise. These functions
//! are pure and never fail with an error on per-point input; a value that
//! cannot be computed comes back as NaN.

use crate::error::{ProjectionError, ProjectionResult};
use std::f64::consts::{FRAC_PI_2, PI};

pub const TWO_PI: f64 = 2.0 * PI;
pub const EPSLN: f64 = 1.0e-10;

/// Largest value of a 32-bit signed integer, used as a step bound when
/// reducing very large angles.
pub const MAXLONG: f64 = 2147483647.0;
/// Step bound for reducing angles beyond `MAXLONG` turns.
pub const DBLLONG: f64 = 4.61168601e18;
/// Maximum number of reduction passes in `adjust_lon`.
const MAX_VAL: u32 = 4;

/// Sign of `x`, with zero counted as positive.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Reduce a longitude in radians to [-π, π].
///
/// Each pass removes whole turns with the coarsest step that still fits in an
/// integer count. The loop gives up after a handful of passes; the last pass
/// is a single signed turn, so the result may still lie outside [-π, π] for
/// pathological input.
pub fn adjust_lon(mut x: f64) -> f64 {
    let mut count = 0;
    loop {
        if x.abs() <= PI || x.is_nan() {
            break;
        }
        if ((x / PI).abs() as i64) < 2 {
            x -= sign(x) * TWO_PI;
        } else if ((x / TWO_PI).abs() as i64 as f64) < MAXLONG {
            x -= ((x / TWO_PI) as i64 as f64) * TWO_PI;
        } else if (((x / (MAXLONG * TWO_PI)).abs()) as i64 as f64) < MAXLONG {
            x -= ((x / (MAXLONG * TWO_PI)) as i64 as f64) * (TWO_PI * MAXLONG);
        } else if (((x / (DBLLONG * TWO_PI)).abs()) as i64 as f64) < MAXLONG {
            x -= ((x / (DBLLONG * TWO_PI)) as i64 as f64) * (TWO_PI * DBLLONG);
        } else {
            x -= sign(x) * TWO_PI;
        }
        count += 1;
        if count > MAX_VAL {
            break;
        }
    }
    x
}

/// Arcsine with the argument clamped to [-1, 1] to absorb roundoff.
#[inline]
pub fn asinz(con: f64) -> f64 {
    con.clamp(-1.0, 1.0).asin()
}

/// Eccentricity constant `e4` used by the polar stereographic family.
pub fn e4fn(x: f64) -> f64 {
    let con = 1.0 + x;
    let com = 1.0 - x;
    (con.powf(con) * com.powf(com)).sqrt()
}

/// Radius of the parallel at latitude phi divided by the semi-major axis.
pub fn msfnz(eccent: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = eccent * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// Isometric latitude factor `t` for the conformal projections.
pub fn tsfnz(eccent: f64, phi: f64, sinphi: f64) -> f64 {
    let con = eccent * sinphi;
    let com = 0.5 * eccent;
    let con = ((1.0 - con) / (1.0 + con)).powf(com);
    (0.5 * (FRAC_PI_2 - phi)).tan() / con
}

/// Latitude from the isometric latitude factor `ts`.
///
/// Fixed-point iteration, at most 16 passes with an absolute tolerance of
/// 1e-10. Returns NaN when the iteration does not settle.
pub fn phi2z(eccent: f64, ts: f64) -> f64 {
    let eccnth = 0.5 * eccent;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..=15 {
        let con = eccent * phi.sin();
        let dphi =
            FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= EPSLN {
            return phi;
        }
    }
    f64::NAN
}

/// Convert a packed DMS angle (`deg * 1e6 + min * 1e3 + sec`) to decimal degrees.
///
/// ```
/// let deg = projection::gctp::packed_dms_to_degrees(120025045.25).unwrap();
/// assert!((deg - (120.0 + 25.0 / 60.0 + 45.25 / 3600.0)).abs() < 1e-9);
/// ```
pub fn packed_dms_to_degrees(ang: f64) -> ProjectionResult<f64> {
    let fac = sign(ang);
    let mut sec = ang.abs();

    let deg = (sec / 1_000_000.0).trunc();
    if deg > 360.0 {
        return Err(ProjectionError::PackedAngle {
            value: ang,
            field: "degrees",
        });
    }
    sec -= deg * 1_000_000.0;

    let min = (sec / 1000.0).trunc();
    if min > 60.0 {
        return Err(ProjectionError::PackedAngle {
            value: ang,
            field: "minutes",
        });
    }
    sec -= min * 1000.0;

    if sec > 60.0 {
        return Err(ProjectionError::PackedAngle {
            value: ang,
            field: "seconds",
        });
    }

    Ok(fac * (deg * 3600.0 + min * 60.0 + sec) / 3600.0)
}
