//! Per-channel calibration coefficients.
//!
//! Coefficients are plain data keyed by instrument and channel. A table can
//! be written by hand in YAML or JSON, or built from the metadata of a level
//! 1b product (see [`crate::eps`]). Tables are validated when loaded so that a
//! calibrator can never be built from unusable numbers.
//!
//! ```yaml
//! instruments:
//!   AVHRR:
//!     CH4:
//!       family: inverse_planck
//!       wavenumber: 927.0
//!       scale: 100.0
//!       correction: { kind: gain_offset, a: 0.3, b: 0.999 }
//! ```

use crate::corrections::{LimbCorrection, LinearCorrection};
use crate::error::{CalibrationError, CalibrationResult};
use crate::lookup::LookupTable;
use crate::planck::PlanckConstants;
use crate::reflectance::POLYNOMIAL_FACTOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use swath_common::SwathError;
use tracing::{debug, info};

/// Physical quantity a calibrator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    BrightnessTemperature,
    Reflectance,
}

impl Quantity {
    pub fn units(&self) -> &'static str {
        match self {
            Quantity::BrightnessTemperature => "K",
            Quantity::Reflectance => "1",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::BrightnessTemperature => write!(f, "brightness_temperature"),
            Quantity::Reflectance => write!(f, "reflectance"),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_polynomial_factor() -> f64 {
    POLYNOMIAL_FACTOR
}

/// The algorithm that turns a count into a physical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CalibrationFamily {
    /// Radiance `count / scale` inverted through the Planck function at
    /// `wavenumber`, then linearly corrected.
    InversePlanck {
        wavenumber: f64,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        constants: PlanckConstants,
        #[serde(default)]
        correction: LinearCorrection,
    },
    /// `factor · (k0 + k1·count + k2·count²)`.
    PolynomialReflectance {
        coefficients: [f64; 3],
        #[serde(default = "default_polynomial_factor")]
        factor: f64,
    },
    /// `π · (count / scale) / irradiance`.
    SolarIrradiance { irradiance: f64, scale: f64 },
    /// Radiance `count / scale` converted through a radiance → BT table.
    Lookup {
        #[serde(default = "default_scale")]
        scale: f64,
        table: LookupTable,
    },
}

impl CalibrationFamily {
    pub fn quantity(&self) -> Quantity {
        match self {
            CalibrationFamily::InversePlanck { .. } | CalibrationFamily::Lookup { .. } => {
                Quantity::BrightnessTemperature
            }
            CalibrationFamily::PolynomialReflectance { .. }
            | CalibrationFamily::SolarIrradiance { .. } => Quantity::Reflectance,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CalibrationFamily::InversePlanck { .. } => "inverse_planck",
            CalibrationFamily::PolynomialReflectance { .. } => "polynomial_reflectance",
            CalibrationFamily::SolarIrradiance { .. } => "solar_irradiance",
            CalibrationFamily::Lookup { .. } => "lookup",
        }
    }
}

/// Everything needed to calibrate one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCoefficients {
    #[serde(flatten)]
    pub family: CalibrationFamily,

    /// Raw count marking a missing sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<f64>,

    /// Divide reflectances by cos(solar zenith).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub solar_zenith_correction: bool,

    /// Offsets subtracted per scan position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limb_correction: Option<LimbCorrection>,
}

impl ChannelCoefficients {
    pub fn new(family: CalibrationFamily) -> Self {
        Self {
            family,
            fill_value: None,
            solar_zenith_correction: false,
            limb_correction: None,
        }
    }

    pub fn with_fill_value(mut self, fill: f64) -> Self {
        self.fill_value = Some(fill);
        self
    }

    pub fn with_solar_zenith_correction(mut self) -> Self {
        self.solar_zenith_correction = true;
        self
    }

    pub fn with_limb_correction(mut self, limb: LimbCorrection) -> Self {
        self.limb_correction = Some(limb);
        self
    }

    pub fn quantity(&self) -> Quantity {
        self.family.quantity()
    }

    /// Central wavenumber (cm⁻¹) for emissive channels.
    pub fn wavenumber(&self) -> Option<f64> {
        match &self.family {
            CalibrationFamily::InversePlanck { wavenumber, .. } => Some(*wavenumber),
            _ => None,
        }
    }

    /// Reject coefficients that would silently produce garbage.
    pub fn validate(&self, channel: &str) -> CalibrationResult<()> {
        let nonzero = |name: &str, v: f64| {
            if v.is_finite() && v != 0.0 {
                Ok(())
            } else {
                Err(CalibrationError::invalid(
                    channel,
                    format!("{} must be finite and non-zero, got {}", name, v),
                ))
            }
        };
        match &self.family {
            CalibrationFamily::InversePlanck {
                wavenumber,
                scale,
                constants,
                correction,
            } => {
                if !(*wavenumber > 0.0) || !wavenumber.is_finite() {
                    return Err(CalibrationError::invalid(
                        channel,
                        format!("wavenumber must be positive, got {}", wavenumber),
                    ));
                }
                nonzero("scale", *scale)?;
                nonzero("c1", constants.c1)?;
                nonzero("c2", constants.c2)?;
                correction.validate(channel)?;
            }
            CalibrationFamily::PolynomialReflectance {
                coefficients,
                factor,
            } => {
                if coefficients.iter().any(|k| !k.is_finite()) {
                    return Err(CalibrationError::invalid(
                        channel,
                        format!("non-finite polynomial coefficients {:?}", coefficients),
                    ));
                }
                nonzero("factor", *factor)?;
            }
            CalibrationFamily::SolarIrradiance { irradiance, scale } => {
                nonzero("irradiance", *irradiance)?;
                nonzero("scale", *scale)?;
            }
            CalibrationFamily::Lookup { scale, .. } => nonzero("scale", *scale)?,
        }
        if self.limb_correction.as_ref().is_some_and(|l| l.width() == 0) {
            return Err(CalibrationError::invalid(channel, "limb correction is empty"));
        }
        Ok(())
    }
}

/// Channels of one instrument.
pub type ChannelTable = BTreeMap<String, ChannelCoefficients>;

/// Coefficients for every known instrument × channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    #[serde(default)]
    instruments: BTreeMap<String, ChannelTable>,
}

impl CalibrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML table.
    pub fn from_yaml_str(yaml: &str) -> CalibrationResult<Self> {
        let table: CalibrationTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Parse and validate a JSON table.
    pub fn from_json_str(json: &str) -> CalibrationResult<Self> {
        let table: CalibrationTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from disk. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> CalibrationResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let table = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_yaml_str(&content)?,
        };
        info!(
            path = %path.display(),
            instruments = table.instruments.len(),
            channels = table.channel_count(),
            "Loaded calibration table"
        );
        Ok(table)
    }

    pub fn to_yaml_string(&self) -> CalibrationResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Add or replace one channel after validating it.
    pub fn insert(
        &mut self,
        instrument: impl Into<String>,
        channel: impl Into<String>,
        coefficients: ChannelCoefficients,
    ) -> CalibrationResult<()> {
        let instrument = instrument.into();
        let channel = channel.into();
        coefficients.validate(&channel)?;
        debug!(%instrument, %channel, family = coefficients.family.name(), "Adding calibration entry");
        self.instruments
            .entry(instrument)
            .or_default()
            .insert(channel, coefficients);
        Ok(())
    }

    /// Merge all channels of `other` into this table, replacing duplicates.
    pub fn merge(&mut self, other: CalibrationTable) {
        for (instrument, channels) in other.instruments {
            self.instruments.entry(instrument).or_default().extend(channels);
        }
    }

    /// Coefficients for one channel.
    pub fn get(&self, instrument: &str, channel: &str) -> CalibrationResult<&ChannelCoefficients> {
        let channels = self
            .instruments
            .get(instrument)
            .ok_or_else(|| SwathError::UnknownInstrument(instrument.to_string()))?;
        channels.get(channel).ok_or_else(|| {
            SwathError::UnknownChannel {
                instrument: instrument.to_string(),
                channel: channel.to_string(),
            }
            .into()
        })
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    /// Channel names of one instrument, empty when the instrument is unknown.
    pub fn channels(&self, instrument: &str) -> Vec<&str> {
        self.instruments
            .get(instrument)
            .map(|c| c.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn channel_count(&self) -> usize {
        self.instruments.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channel_count() == 0
    }

    fn validate(&self) -> CalibrationResult<()> {
        for (instrument, channels) in &self.instruments {
            for (channel, coefficients) in channels {
                coefficients
                    .validate(&format!("{}/{}", instrument, channel))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
instruments:
  AVHRR:
    CH4:
      family: inverse_planck
      wavenumber: 927.0
      scale: 100.0
      correction: { kind: gain_offset, a: 0.3, b: 0.999 }
    CH1:
      family: solar_irradiance
      irradiance: 139.9
      scale: 100.0
      solar_zenith_correction: true
  MODIS:
    B1:
      family: polynomial_reflectance
      coefficients: [0.5, 0.02, 0.0]
      fill_value: 65535
"#;

    #[test]
    fn test_parse_yaml() {
        let table = CalibrationTable::from_yaml_str(TABLE).unwrap();
        assert_eq!(table.channel_count(), 3);
        assert_eq!(table.channels("AVHRR"), vec!["CH1", "CH4"]);

        let ch4 = table.get("AVHRR", "CH4").unwrap();
        assert_eq!(ch4.wavenumber(), Some(927.0));
        match &ch4.family {
            CalibrationFamily::InversePlanck {
                constants,
                correction,
                ..
            } => {
                assert_eq!(*constants, PlanckConstants::EPS);
                assert_eq!(*correction, LinearCorrection::GainOffset { a: 0.3, b: 0.999 });
            }
            other => panic!("wrong family {:?}", other),
        }

        let b1 = table.get("MODIS", "B1").unwrap();
        assert_eq!(b1.fill_value, Some(65535.0));
        assert_eq!(b1.quantity(), Quantity::Reflectance);
        match b1.family {
            CalibrationFamily::PolynomialReflectance { factor, .. } => {
                assert_eq!(factor, POLYNOMIAL_FACTOR)
            }
            ref other => panic!("wrong family {:?}", other),
        }
    }

    #[test]
    fn test_unknown_names() {
        let table = CalibrationTable::from_yaml_str(TABLE).unwrap();
        let err = table.get("HIRS", "CH1").unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::Swath(SwathError::UnknownInstrument(_))
        ));
        let err = table.get("AVHRR", "CH9").unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("CH9"), "{}", err);
    }

    #[test]
    fn test_invalid_table_rejected() {
        let yaml = r#"
instruments:
  X:
    C1:
      family: inverse_planck
      wavenumber: -5.0
"#;
        let err = CalibrationTable::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("X/C1"), "{}", err);
    }

    #[test]
    fn test_unknown_family_rejected() {
        let yaml = "instruments:\n  X:\n    C1:\n      family: magic\n";
        assert!(matches!(
            CalibrationTable::from_yaml_str(yaml),
            Err(CalibrationError::Yaml(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let table = CalibrationTable::from_yaml_str(TABLE).unwrap();
        let yaml = table.to_yaml_string().unwrap();
        assert_eq!(CalibrationTable::from_yaml_str(&yaml).unwrap(), table);
    }

    #[test]
    fn test_insert_validates() {
        let mut table = CalibrationTable::new();
        let bad = ChannelCoefficients::new(CalibrationFamily::SolarIrradiance {
            irradiance: 0.0,
            scale: 100.0,
        });
        assert!(table.insert("AVHRR", "CH1", bad).is_err());
        assert!(table.is_empty());
    }
}
