//! Planck function and its inverse in wavenumber space.
//!
//! Radiance is in mW/(m²·sr·cm⁻¹), wavenumber in cm⁻¹ and temperature in K.
//! The radiation constants are carried per calibration family because the
//! products round them differently and results must reproduce each family.

use serde::{Deserialize, Serialize};

/// First and second radiation constants used by a calibration family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanckConstants {
    /// mW/(m²·sr·cm⁻⁴)
    pub c1: f64,
    /// K·cm
    pub c2: f64,
}

impl PlanckConstants {
    /// Constants used by the EPS level 1b instruments (AVHRR/3, HIRS/4, AMSU-A).
    pub const EPS: PlanckConstants = PlanckConstants {
        c1: 1.191062e-5,
        c2: 1.4387863,
    };

    /// Constants used for hyperspectral sounder radiances.
    pub const SOUNDER: PlanckConstants = PlanckConstants {
        c1: 1.191066e-5,
        c2: 1.438833,
    };
}

impl Default for PlanckConstants {
    fn default() -> Self {
        Self::EPS
    }
}

/// Brightness temperature for a radiance at a wavenumber.
///
/// Non-positive or NaN radiance gives NaN.
///
/// # Example
///
/// ```
/// use calibration::planck::{brightness_temperature, PlanckConstants};
///
/// let bt = brightness_temperature(120.0, 900.0, PlanckConstants::EPS);
/// assert!((bt - 301.4681551073656).abs() < 1e-9);
/// ```
#[inline]
pub fn brightness_temperature(radiance: f64, wavenumber: f64, constants: PlanckConstants) -> f64 {
    if !(radiance > 0.0) {
        return f64::NAN;
    }
    let nu3 = wavenumber * wavenumber * wavenumber;
    constants.c2 * wavenumber / (1.0 + constants.c1 * nu3 / radiance).ln()
}

/// Radiance emitted by a blackbody at `temperature`.
///
/// Non-positive or NaN temperature gives NaN.
#[inline]
pub fn radiance(temperature: f64, wavenumber: f64, constants: PlanckConstants) -> f64 {
    if !(temperature > 0.0) {
        return f64::NAN;
    }
    let nu3 = wavenumber * wavenumber * wavenumber;
    constants.c1 * nu3 / ((constants.c2 * wavenumber / temperature).exp() - 1.0)
}

/// Central wavenumber (cm⁻¹) of a microwave channel given in GHz.
pub fn frequency_to_wavenumber(frequency_ghz: f64) -> f64 {
    1.0 / ((3.0e8 / (frequency_ghz * 1.0e9)) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_brightness_temperature() {
        let bt = brightness_temperature(120.0, 900.0, PlanckConstants::EPS);
        assert!(
            (bt - 301.4681551073656).abs() < 1e-9,
            "BT drifted: {}",
            bt
        );
    }

    #[test]
    fn test_forward_inverts_inverse() {
        for &nu in &[700.0, 900.0, 1200.0, 2500.0] {
            for &t in &[180.0, 230.0, 290.0, 330.0] {
                let r = radiance(t, nu, PlanckConstants::SOUNDER);
                let back = brightness_temperature(r, nu, PlanckConstants::SOUNDER);
                assert!((back - t).abs() < 1e-9, "nu {} t {} -> {}", nu, t, back);
            }
        }
    }

    #[test]
    fn test_monotonic_in_radiance() {
        let mut previous = f64::NEG_INFINITY;
        for k in 1..2000 {
            let r = k as f64 * 0.1;
            let bt = brightness_temperature(r, 900.0, PlanckConstants::EPS);
            assert!(bt > previous, "not increasing at R = {}", r);
            previous = bt;
        }
    }

    #[test]
    fn test_invalid_radiance_is_nan() {
        assert!(brightness_temperature(0.0, 900.0, PlanckConstants::EPS).is_nan());
        assert!(brightness_temperature(-3.0, 900.0, PlanckConstants::EPS).is_nan());
        assert!(brightness_temperature(f64::NAN, 900.0, PlanckConstants::EPS).is_nan());
        assert!(radiance(-1.0, 900.0, PlanckConstants::EPS).is_nan());
    }

    #[test]
    fn test_microwave_wavenumber() {
        let nu = frequency_to_wavenumber(23.8);
        assert!((nu - 0.793_333_333_333).abs() < 1e-9, "nu {}", nu);
    }
}
