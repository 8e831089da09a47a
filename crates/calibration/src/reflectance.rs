//! Reflectance from raw counts.

use std::f64::consts::PI;

/// Default factor applied to polynomial reflectances (percent to fraction).
pub const POLYNOMIAL_FACTOR: f64 = 0.01;

/// `factor · (k0 + k1·count + k2·count²)`.
#[inline]
pub fn polynomial_reflectance(count: f64, k: [f64; 3], factor: f64) -> f64 {
    factor * (k[0] + count * (k[1] + count * k[2]))
}

/// `π · (count / scale) / irradiance`, NaN when negative.
///
/// Used by channels that store scaled radiance and publish the solar
/// irradiance of the band separately.
#[inline]
pub fn irradiance_reflectance(count: f64, scale: f64, irradiance: f64) -> f64 {
    let r = PI * (count / scale) / irradiance;
    if r < 0.0 {
        f64::NAN
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial() {
        let r = polynomial_reflectance(100.0, [1.0, 0.5, 0.001], POLYNOMIAL_FACTOR);
        // 1 + 50 + 10 = 61 percent
        assert!((r - 0.61).abs() < 1e-12, "r = {}", r);
    }

    #[test]
    fn test_irradiance_reflectance() {
        // 50 / 100 = 0.5 scaled radiance, irradiance π/2 -> reflectance 1.0
        let r = irradiance_reflectance(50.0, 100.0, PI / 2.0);
        assert!((r - 1.0).abs() < 1e-12, "r = {}", r);
        assert!(irradiance_reflectance(-5.0, 100.0, 139.8).is_nan());
    }
}
