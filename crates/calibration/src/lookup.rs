//! Radiance ↔ brightness temperature lookup tables.
//!
//! A table pairs two monotonic axes. Conversion picks the entry whose key is
//! nearest to the query and returns its partner; queries outside the span of
//! the key axis give NaN. Evenly spaced axes are indexed directly, other axes
//! by binary search.

use crate::error::{CalibrationError, CalibrationResult};
use crate::planck::{self, PlanckConstants};
use serde::{Deserialize, Serialize};

/// Relative spacing tolerance for treating an axis as evenly spaced.
const LINEAR_TOLERANCE: f64 = 1e-9;

/// How queries against one axis are resolved to an index.
#[derive(Debug, Clone, PartialEq)]
enum Axis {
    Linear { first: f64, step: f64, len: usize },
    Irregular { values: Vec<f64>, ascending: bool },
}

impl Axis {
    fn new(values: &[f64]) -> Self {
        let len = values.len();
        let first = values[0];
        let step = (values[len - 1] - first) / (len - 1) as f64;
        let even = values.windows(2).all(|w| {
            ((w[1] - w[0]) - step).abs() <= LINEAR_TOLERANCE * step.abs().max(1.0)
        });
        if even && step != 0.0 {
            Axis::Linear { first, step, len }
        } else {
            Axis::Irregular {
                values: values.to_vec(),
                ascending: values[len - 1] > first,
            }
        }
    }

    /// Nearest index, or None when `value` is outside the axis span.
    fn nearest(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        match self {
            Axis::Linear { first, step, len } => {
                let g = (value - first) / step;
                let last = (*len - 1) as f64;
                if g < 0.0 || g > last {
                    return None;
                }
                Some((g + 0.5).floor().min(last) as usize)
            }
            Axis::Irregular { values, ascending } => {
                let (lo, hi) = if *ascending {
                    (values[0], values[values.len() - 1])
                } else {
                    (values[values.len() - 1], values[0])
                };
                if value < lo || value > hi {
                    return None;
                }
                let after = if *ascending {
                    values.partition_point(|&v| v < value)
                } else {
                    values.partition_point(|&v| v > value)
                };
                if after == 0 {
                    return Some(0);
                }
                if after == values.len() {
                    return Some(values.len() - 1);
                }
                let below = after - 1;
                if (value - values[below]).abs() <= (values[after] - value).abs() {
                    Some(below)
                } else {
                    Some(after)
                }
            }
        }
    }
}

/// Paired radiance and brightness temperature axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableData", into = "TableData")]
pub struct LookupTable {
    radiance: Vec<f64>,
    temperature: Vec<f64>,
    radiance_axis: Axis,
    temperature_axis: Axis,
}

#[derive(Serialize, Deserialize)]
struct TableData {
    radiance: Vec<f64>,
    temperature: Vec<f64>,
}

impl TryFrom<TableData> for LookupTable {
    type Error = CalibrationError;

    fn try_from(data: TableData) -> CalibrationResult<Self> {
        LookupTable::new(data.radiance, data.temperature)
    }
}

impl From<LookupTable> for TableData {
    fn from(table: LookupTable) -> Self {
        TableData {
            radiance: table.radiance,
            temperature: table.temperature,
        }
    }
}

impl LookupTable {
    /// Build a table from two strictly monotonic axes of equal length.
    pub fn new(radiance: Vec<f64>, temperature: Vec<f64>) -> CalibrationResult<Self> {
        if radiance.len() != temperature.len() {
            return Err(CalibrationError::invalid(
                "lookup table",
                format!(
                    "{} radiances but {} temperatures",
                    radiance.len(),
                    temperature.len()
                ),
            ));
        }
        if radiance.len() < 2 {
            return Err(CalibrationError::invalid(
                "lookup table",
                "needs at least two entries",
            ));
        }
        for (name, axis) in [("radiance", &radiance), ("temperature", &temperature)] {
            if !strictly_monotonic(axis) {
                return Err(CalibrationError::invalid(
                    "lookup table",
                    format!("{} axis is not strictly monotonic", name),
                ));
            }
        }
        let radiance_axis = Axis::new(&radiance);
        let temperature_axis = Axis::new(&temperature);
        Ok(Self {
            radiance,
            temperature,
            radiance_axis,
            temperature_axis,
        })
    }

    /// Tabulate the Planck function from `t_min` to `t_max` in `step` kelvin.
    pub fn from_planck(
        wavenumber: f64,
        constants: PlanckConstants,
        t_min: f64,
        t_max: f64,
        step: f64,
    ) -> CalibrationResult<Self> {
        if !(t_min > 0.0 && t_max > t_min && step > 0.0) {
            return Err(CalibrationError::invalid(
                "lookup table",
                format!("bad temperature range {}..{} by {}", t_min, t_max, step),
            ));
        }
        let n = ((t_max - t_min) / step).round() as usize + 1;
        let temperature: Vec<f64> = (0..n).map(|i| t_min + i as f64 * step).collect();
        let radiance = temperature
            .iter()
            .map(|&t| planck::radiance(t, wavenumber, constants))
            .collect();
        Self::new(radiance, temperature)
    }

    pub fn len(&self) -> usize {
        self.radiance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radiance.is_empty()
    }

    /// Brightness temperature paired with the radiance nearest to `radiance`.
    pub fn radiance_to_temperature(&self, radiance: f64) -> f64 {
        self.radiance_axis
            .nearest(radiance)
            .map_or(f64::NAN, |i| self.temperature[i])
    }

    /// Radiance paired with the temperature nearest to `temperature`.
    pub fn temperature_to_radiance(&self, temperature: f64) -> f64 {
        self.temperature_axis
            .nearest(temperature)
            .map_or(f64::NAN, |i| self.radiance[i])
    }
}

fn strictly_monotonic(values: &[f64]) -> bool {
    if values.iter().any(|v| !v.is_finite()) {
        return false;
    }
    values.windows(2).all(|w| w[1] > w[0]) || values.windows(2).all(|w| w[1] < w[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn irregular() -> LookupTable {
        LookupTable::new(
            vec![1.0, 2.0, 4.0, 8.0, 16.0],
            vec![200.0, 220.0, 240.0, 260.0, 280.0],
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_irregular() {
        let table = irregular();
        assert_eq!(table.radiance_to_temperature(2.9), 220.0);
        assert_eq!(table.radiance_to_temperature(3.1), 240.0);
        assert_eq!(table.radiance_to_temperature(16.0), 280.0);
        // Temperature axis is evenly spaced
        assert_eq!(table.temperature_to_radiance(249.0), 4.0);
        assert_eq!(table.temperature_to_radiance(251.0), 8.0);
    }

    #[test]
    fn test_out_of_range_is_nan() {
        let table = irregular();
        assert!(table.radiance_to_temperature(0.5).is_nan());
        assert!(table.radiance_to_temperature(16.5).is_nan());
        assert!(table.temperature_to_radiance(199.0).is_nan());
        assert!(table.radiance_to_temperature(f64::NAN).is_nan());
    }

    #[test]
    fn test_descending_axis() {
        let table = LookupTable::new(vec![5.0, 4.0, 2.0], vec![300.0, 290.0, 280.0]).unwrap();
        assert_eq!(table.radiance_to_temperature(3.2), 290.0);
        assert_eq!(table.radiance_to_temperature(2.9), 280.0);
    }

    #[test]
    fn test_rejects_non_monotonic() {
        assert!(LookupTable::new(vec![1.0, 3.0, 2.0], vec![1.0, 2.0, 3.0]).is_err());
        assert!(LookupTable::new(vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(LookupTable::new(vec![1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_planck_table_agrees_with_formula() {
        let table = LookupTable::from_planck(900.0, PlanckConstants::EPS, 180.0, 330.0, 0.1).unwrap();
        assert_eq!(table.len(), 1501);
        let r = planck::radiance(271.3, 900.0, PlanckConstants::EPS);
        let t = table.radiance_to_temperature(r);
        assert!((t - 271.3).abs() < 0.051, "t = {}", t);
    }

    #[test]
    fn test_serde_validates() {
        let bad = r#"{"radiance": [1.0, 1.0], "temperature": [1.0, 2.0]}"#;
        assert!(serde_json::from_str::<LookupTable>(bad).is_err());
        let good = r#"{"radiance": [1.0, 2.0], "temperature": [100.0, 200.0]}"#;
        let table: LookupTable = serde_json::from_str(good).unwrap();
        assert_eq!(table.radiance_to_temperature(1.4), 100.0);
    }
}
