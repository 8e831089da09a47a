//! Corrections applied after the base calibration.

use crate::error::{CalibrationError, CalibrationResult};
use serde::{Deserialize, Serialize};

/// Solar zenith angle (degrees) at and above which reflectances are left as is.
pub const SOLAR_ZENITH_LIMIT: f64 = 89.0;

/// Linear adjustment of a brightness temperature.
///
/// Families disagree on the form, so both are kept:
/// `GainOffset` gives `a + b·BT`, `BandCorrection` gives `(BT − beta) / alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearCorrection {
    #[default]
    None,
    GainOffset { a: f64, b: f64 },
    BandCorrection { alpha: f64, beta: f64 },
}

impl LinearCorrection {
    #[inline]
    pub fn apply(&self, bt: f64) -> f64 {
        match *self {
            LinearCorrection::None => bt,
            LinearCorrection::GainOffset { a, b } => a + b * bt,
            LinearCorrection::BandCorrection { alpha, beta } => (bt - beta) / alpha,
        }
    }

    pub(crate) fn validate(&self, channel: &str) -> CalibrationResult<()> {
        match *self {
            LinearCorrection::None => Ok(()),
            LinearCorrection::GainOffset { a, b } if a.is_finite() && b.is_finite() => Ok(()),
            LinearCorrection::BandCorrection { alpha, beta }
                if alpha.is_finite() && alpha != 0.0 && beta.is_finite() =>
            {
                Ok(())
            }
            _ => Err(CalibrationError::invalid(
                channel,
                format!("unusable linear correction {:?}", self),
            )),
        }
    }
}

/// Normalize a reflectance by the cosine of the solar zenith angle.
///
/// Angles at or beyond [`SOLAR_ZENITH_LIMIT`] (and NaN angles) leave the
/// reflectance unchanged.
#[inline]
pub fn solar_zenith_normalize(reflectance: f64, zenith_deg: f64) -> f64 {
    if zenith_deg < SOLAR_ZENITH_LIMIT {
        reflectance / zenith_deg.to_radians().cos()
    } else {
        reflectance
    }
}

/// Empirical per-scan-position offsets subtracted from every scan line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LimbCorrection {
    offsets: Vec<f64>,
}

impl LimbCorrection {
    pub fn new(offsets: Vec<f64>) -> Self {
        Self { offsets }
    }

    /// Number of scan positions the table covers.
    pub fn width(&self) -> usize {
        self.offsets.len()
    }

    pub fn offset(&self, position: usize) -> Option<f64> {
        self.offsets.get(position).copied()
    }

    /// Subtract the offsets from row-major `values` whose rows are `width` long.
    pub fn apply(&self, channel: &str, values: &mut [f64], width: usize) -> CalibrationResult<()> {
        if width != self.offsets.len() {
            return Err(CalibrationError::invalid(
                channel,
                format!(
                    "limb correction covers {} scan positions, swath has {}",
                    self.offsets.len(),
                    width
                ),
            ));
        }
        for row in values.chunks_mut(width) {
            for (v, offset) in row.iter_mut().zip(&self.offsets) {
                *v -= offset;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_forms() {
        let gain = LinearCorrection::GainOffset { a: 0.5, b: 0.99 };
        assert!((gain.apply(250.0) - 248.0).abs() < 1e-12);

        let band = LinearCorrection::BandCorrection {
            alpha: 1.002,
            beta: 0.4,
        };
        assert!((band.apply(250.4) - 250.0 / 1.002).abs() < 1e-12);

        assert_eq!(LinearCorrection::None.apply(273.15), 273.15);
    }

    #[test]
    fn test_zero_alpha_rejected() {
        let band = LinearCorrection::BandCorrection {
            alpha: 0.0,
            beta: 1.0,
        };
        assert!(band.validate("CH4").is_err());
    }

    #[test]
    fn test_solar_zenith_threshold() {
        let r = solar_zenith_normalize(0.25, 60.0);
        assert!((r - 0.5).abs() < 1e-12, "r = {}", r);
        assert_eq!(solar_zenith_normalize(0.25, 89.0), 0.25);
        assert_eq!(solar_zenith_normalize(0.25, 95.0), 0.25);
        assert_eq!(solar_zenith_normalize(0.25, f64::NAN), 0.25);
    }

    #[test]
    fn test_limb_subtracts_per_column() {
        let limb = LimbCorrection::new(vec![1.0, 0.0, 2.0]);
        let mut values = vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0];
        limb.apply("CH1", &mut values, 3).unwrap();
        assert_eq!(values, vec![9.0, 10.0, 8.0, 19.0, 20.0, 18.0]);
    }

    #[test]
    fn test_limb_width_mismatch() {
        let limb = LimbCorrection::new(vec![1.0, 0.0]);
        let mut values = vec![0.0; 6];
        assert!(limb.apply("CH1", &mut values, 3).is_err());
    }

    #[test]
    fn test_correction_yaml_shape() {
        let c: LinearCorrection = serde_yaml::from_str("kind: gain_offset\na: 1.5\nb: 0.5\n").unwrap();
        assert_eq!(c, LinearCorrection::GainOffset { a: 1.5, b: 0.5 });
    }
}
