//! Built-in channel layouts for EPS level 1b products.
//!
//! AVHRR/3 and HIRS/4 publish their calibration coefficients as scaled
//! integers in GIADR metadata arrays; each coefficient is found at a fixed
//! index and divided by a fixed power of ten. AMSU-A channels are calibrated
//! from their nominal frequencies and need no metadata.

use crate::coefficients::{CalibrationFamily, CalibrationTable, ChannelCoefficients};
use crate::corrections::LinearCorrection;
use crate::error::{CalibrationError, CalibrationResult};
use crate::planck::{frequency_to_wavenumber, PlanckConstants};
use serde::{Deserialize, Serialize};
use swath_common::{MultiDimensionReader, SwathError};
use tracing::debug;

/// AVHRR/3 radiance calibration record.
pub const AVHRR_RADIANCE_ARRAY: &str =
    "U-MARF/EPS/AVHR_xxx_1B/METADATA/GIADR/GIADR_RADIANCE_AVHRR_L1_ARRAY_000001";

/// HIRS/4 temperature calibration record: rows γ, A and B, one column per channel.
pub const HIRS_TEMP_ARRAY: &str =
    "U-MARF/EPS/HIRS_xxx_1B/METADATA/GIADR/GIADR_TEMP_HIRS_L1_ARRAY_000001";

pub const HIRS_CHANNELS: usize = 19;

/// Scaled counts are divided by this for every HIRS/4 and AMSU-A channel.
const SOUNDER_SCALE: f64 = 1e7;

/// AMSU-A channel frequencies in GHz, CH1 first.
pub const AMSU_A_FREQUENCIES: [f64; 15] = [
    23.8, 31.4, 50.3, 52.8, 53.596, 54.4, 54.9, 55.5, 57.290, 57.290, 59.290, 59.290, 59.290,
    59.290, 89.0,
];

/// One scaled integer coefficient in a metadata record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledValue {
    pub index: usize,
    pub divisor: f64,
}

const fn scaled(index: usize, divisor: f64) -> ScaledValue {
    ScaledValue { index, divisor }
}

#[derive(Debug, Clone, Copy)]
enum AvhrrChannel {
    Reflective {
        irradiance: usize,
        scale: f64,
    },
    Emissive {
        scale: f64,
        gamma: ScaledValue,
        a: ScaledValue,
        b: ScaledValue,
    },
}

const AVHRR_CHANNELS: [(&str, AvhrrChannel); 6] = [
    ("CH1", AvhrrChannel::Reflective { irradiance: 31, scale: 100.0 }),
    ("CH2", AvhrrChannel::Reflective { irradiance: 33, scale: 100.0 }),
    ("CH3A", AvhrrChannel::Reflective { irradiance: 35, scale: 10000.0 }),
    (
        "CH3B",
        AvhrrChannel::Emissive {
            scale: 10000.0,
            gamma: scaled(37, 1e2),
            a: scaled(38, 1e5),
            b: scaled(39, 1e6),
        },
    ),
    (
        "CH4",
        AvhrrChannel::Emissive {
            scale: 100.0,
            gamma: scaled(40, 1e3),
            a: scaled(41, 1e5),
            b: scaled(42, 1e6),
        },
    ),
    (
        "CH5",
        AvhrrChannel::Emissive {
            scale: 100.0,
            gamma: scaled(43, 1e3),
            a: scaled(44, 1e5),
            b: scaled(45, 1e6),
        },
    ),
];

/// EPS instruments with built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpsInstrument {
    #[serde(rename = "AVHRR")]
    Avhrr,
    #[serde(rename = "HIRS")]
    Hirs,
    #[serde(rename = "AMSU-A")]
    AmsuA,
}

impl EpsInstrument {
    pub fn from_name(name: &str) -> CalibrationResult<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AVHRR" | "AVHR" => Ok(EpsInstrument::Avhrr),
            "HIRS" => Ok(EpsInstrument::Hirs),
            "AMSU-A" | "AMSUA" | "AMSA" => Ok(EpsInstrument::AmsuA),
            _ => Err(SwathError::UnknownInstrument(name.to_string()).into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EpsInstrument::Avhrr => "AVHRR",
            EpsInstrument::Hirs => "HIRS",
            EpsInstrument::AmsuA => "AMSU-A",
        }
    }

    pub fn channels(&self) -> Vec<String> {
        match self {
            EpsInstrument::Avhrr => AVHRR_CHANNELS.iter().map(|(c, _)| c.to_string()).collect(),
            EpsInstrument::Hirs => (1..=HIRS_CHANNELS).map(|c| format!("CH{}", c)).collect(),
            EpsInstrument::AmsuA => (1..=AMSU_A_FREQUENCIES.len())
                .map(|c| format!("CH{}", c))
                .collect(),
        }
    }

    /// Read the coefficients of one channel from product metadata.
    pub fn coefficients<R: MultiDimensionReader + ?Sized>(
        &self,
        reader: &R,
        channel: &str,
    ) -> CalibrationResult<ChannelCoefficients> {
        let coefficients = match self {
            EpsInstrument::Avhrr => avhrr_coefficients(reader, channel)?,
            EpsInstrument::Hirs => hirs_coefficients(reader, channel)?,
            EpsInstrument::AmsuA => amsu_a_coefficients(channel)?,
        };
        coefficients.validate(&format!("{}/{}", self.name(), channel))?;
        debug!(
            instrument = self.name(),
            channel,
            family = coefficients.family.name(),
            wavenumber = ?coefficients.wavenumber(),
            "Read EPS calibration coefficients"
        );
        Ok(coefficients)
    }

    /// Coefficients for every channel of the instrument.
    pub fn table<R: MultiDimensionReader + ?Sized>(
        &self,
        reader: &R,
    ) -> CalibrationResult<CalibrationTable> {
        let mut table = CalibrationTable::new();
        for channel in self.channels() {
            let coefficients = self.coefficients(reader, &channel)?;
            table.insert(self.name(), channel, coefficients)?;
        }
        Ok(table)
    }

    fn unknown_channel(&self, channel: &str) -> CalibrationError {
        SwathError::UnknownChannel {
            instrument: self.name().to_string(),
            channel: channel.to_string(),
        }
        .into()
    }
}

/// Wrap a reader failure as a missing-coefficient configuration error.
fn missing(channel: &str, err: SwathError) -> CalibrationError {
    SwathError::MissingCoefficients {
        channel: channel.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Read part of a metadata record as f64, whatever its storage type.
fn read_record<R: MultiDimensionReader + ?Sized>(
    reader: &R,
    channel: &str,
    array: &str,
    start: &[usize],
    count: &[usize],
) -> CalibrationResult<Vec<f64>> {
    let stride = vec![1; start.len()];
    let values = reader
        .read_array(array, start, count, &stride)
        .map_err(|e| missing(channel, e))?
        .to_f64_vec();
    if values.is_empty() {
        return Err(missing(channel, SwathError::ArrayNotFound(array.to_string())));
    }
    Ok(values)
}

fn read_scaled<R: MultiDimensionReader + ?Sized>(
    reader: &R,
    channel: &str,
    value: ScaledValue,
) -> CalibrationResult<f64> {
    let raw = read_record(reader, channel, AVHRR_RADIANCE_ARRAY, &[0, value.index], &[1, 1])?;
    Ok(raw[0] / value.divisor)
}

fn avhrr_coefficients<R: MultiDimensionReader + ?Sized>(
    reader: &R,
    channel: &str,
) -> CalibrationResult<ChannelCoefficients> {
    let layout = AVHRR_CHANNELS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(channel))
        .map(|(_, layout)| *layout)
        .ok_or_else(|| EpsInstrument::Avhrr.unknown_channel(channel))?;

    let family = match layout {
        AvhrrChannel::Reflective { irradiance, scale } => CalibrationFamily::SolarIrradiance {
            irradiance: read_scaled(reader, channel, scaled(irradiance, 10.0))?,
            scale,
        },
        AvhrrChannel::Emissive { scale, gamma, a, b } => CalibrationFamily::InversePlanck {
            wavenumber: read_scaled(reader, channel, gamma)?,
            scale,
            constants: PlanckConstants::EPS,
            correction: LinearCorrection::GainOffset {
                a: read_scaled(reader, channel, a)?,
                b: read_scaled(reader, channel, b)?,
            },
        },
    };
    Ok(ChannelCoefficients::new(family))
}

/// HIRS/4 and AMSU-A channels are named CH1 … CHn.
fn channel_number(instrument: EpsInstrument, channel: &str, count: usize) -> CalibrationResult<usize> {
    channel
        .get(2..)
        .filter(|_| channel[..2].eq_ignore_ascii_case("CH"))
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=count).contains(n))
        .ok_or_else(|| instrument.unknown_channel(channel))
}

fn hirs_coefficients<R: MultiDimensionReader + ?Sized>(
    reader: &R,
    channel: &str,
) -> CalibrationResult<ChannelCoefficients> {
    let number = channel_number(EpsInstrument::Hirs, channel, HIRS_CHANNELS)?;
    let column = number - 1;
    let gamma_divisor = if number <= 12 { 1e6 } else { 1e5 };

    let row = |r: usize| -> CalibrationResult<f64> {
        let values = read_record(reader, channel, HIRS_TEMP_ARRAY, &[r, 0], &[1, HIRS_CHANNELS])?;
        values.get(column).copied().ok_or_else(|| {
            missing(channel, SwathError::ArrayNotFound(HIRS_TEMP_ARRAY.to_string()))
        })
    };

    Ok(ChannelCoefficients::new(CalibrationFamily::InversePlanck {
        wavenumber: row(0)? / gamma_divisor,
        scale: SOUNDER_SCALE,
        constants: PlanckConstants::EPS,
        correction: LinearCorrection::GainOffset {
            a: row(1)? / 1e6,
            b: row(2)? / 1e6,
        },
    }))
}

/// AMSU-A keeps the uncorrected brightness temperature.
fn amsu_a_coefficients(channel: &str) -> CalibrationResult<ChannelCoefficients> {
    let number = channel_number(EpsInstrument::AmsuA, channel, AMSU_A_FREQUENCIES.len())?;
    Ok(ChannelCoefficients::new(CalibrationFamily::InversePlanck {
        wavenumber: frequency_to_wavenumber(AMSU_A_FREQUENCIES[number - 1]),
        scale: SOUNDER_SCALE,
        constants: PlanckConstants::EPS,
        correction: LinearCorrection::None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swath_common::{ArrayData, MemoryReader};

    fn avhrr_reader() -> MemoryReader {
        let mut record = vec![0i32; 50];
        record[33] = 1036; // irradiance 103.6
        record[40] = 927_000; // γ 927.0
        record[41] = 30_000; // A 0.3
        record[42] = 999_000; // B 0.999
        record[37] = 269_000; // γ 2690.0
        record[38] = 150_000; // A 1.5
        record[39] = 998_000; // B 0.998
        MemoryReader::new().with_array(AVHRR_RADIANCE_ARRAY, vec![1, 50], ArrayData::Int(record))
    }

    #[test]
    fn test_avhrr_emissive_layout() {
        let c = EpsInstrument::Avhrr
            .coefficients(&avhrr_reader(), "CH4")
            .unwrap();
        match c.family {
            CalibrationFamily::InversePlanck {
                wavenumber,
                scale,
                correction,
                ..
            } => {
                assert!((wavenumber - 927.0).abs() < 1e-12);
                assert_eq!(scale, 100.0);
                assert_eq!(correction, LinearCorrection::GainOffset { a: 0.3, b: 0.999 });
            }
            other => panic!("wrong family {:?}", other),
        }

        let c = EpsInstrument::Avhrr
            .coefficients(&avhrr_reader(), "CH3B")
            .unwrap();
        assert_eq!(c.wavenumber(), Some(2690.0));
    }

    #[test]
    fn test_avhrr_zero_irradiance_rejected() {
        // Index 31 is zero in this record
        let err = EpsInstrument::Avhrr
            .coefficients(&avhrr_reader(), "CH1")
            .unwrap_err();
        assert!(err.is_configuration_error(), "{}", err);
    }

    #[test]
    fn test_avhrr_reflective_layout() {
        let c = EpsInstrument::Avhrr
            .coefficients(&avhrr_reader(), "CH2")
            .unwrap();
        match c.family {
            CalibrationFamily::SolarIrradiance { irradiance, scale } => {
                assert!((irradiance - 103.6).abs() < 1e-12);
                assert_eq!(scale, 100.0);
            }
            other => panic!("wrong family {:?}", other),
        }
    }

    #[test]
    fn test_hirs_rows() {
        let mut record = vec![0i32; 3 * HIRS_CHANNELS];
        record[0] = 669_000_000; // CH1 γ 669.0 (÷1e6)
        record[12] = 265_700_000; // CH13 γ 2657.0 (÷1e5)
        record[HIRS_CHANNELS] = -5_000; // CH1 A
        record[2 * HIRS_CHANNELS] = 1_000_100; // CH1 B
        record[2 * HIRS_CHANNELS + 12] = 1_000_000; // CH13 B
        let reader = MemoryReader::new().with_array(
            HIRS_TEMP_ARRAY,
            vec![3, HIRS_CHANNELS],
            ArrayData::Int(record),
        );

        let ch1 = EpsInstrument::Hirs.coefficients(&reader, "CH1").unwrap();
        assert_eq!(ch1.wavenumber(), Some(669.0));
        match ch1.family {
            CalibrationFamily::InversePlanck {
                scale, correction, ..
            } => {
                assert_eq!(scale, 1e7);
                assert_eq!(
                    correction,
                    LinearCorrection::GainOffset {
                        a: -0.005,
                        b: 1.0001
                    }
                );
            }
            other => panic!("wrong family {:?}", other),
        }

        let ch13 = EpsInstrument::Hirs.coefficients(&reader, "CH13").unwrap();
        assert_eq!(ch13.wavenumber(), Some(2657.0));

        // CH2 has a zero γ in this record
        assert!(EpsInstrument::Hirs.coefficients(&reader, "CH2").is_err());
    }

    #[test]
    fn test_missing_metadata_fails_fast() {
        let err = EpsInstrument::Hirs
            .coefficients(&MemoryReader::new(), "CH5")
            .unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::Swath(SwathError::MissingCoefficients { .. })
        ));
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(channel_number(EpsInstrument::Hirs, "CH19", 19).unwrap(), 19);
        assert_eq!(channel_number(EpsInstrument::Hirs, "ch3", 19).unwrap(), 3);
        assert!(channel_number(EpsInstrument::Hirs, "CH20", 19).is_err());
        assert!(channel_number(EpsInstrument::Hirs, "CH0", 19).is_err());
        assert!(channel_number(EpsInstrument::Hirs, "X", 19).is_err());
        assert!(EpsInstrument::Avhrr
            .coefficients(&avhrr_reader(), "CH6")
            .is_err());
    }

    #[test]
    fn test_amsu_without_metadata() {
        let c = EpsInstrument::AmsuA
            .coefficients(&MemoryReader::new(), "CH1")
            .unwrap();
        let nu = c.wavenumber().unwrap();
        assert!((nu - 0.793_333_333).abs() < 1e-8, "nu {}", nu);
        match c.family {
            CalibrationFamily::InversePlanck { correction, .. } => {
                assert_eq!(correction, LinearCorrection::None)
            }
            other => panic!("wrong family {:?}", other),
        }
    }

    #[test]
    fn test_instrument_names() {
        assert_eq!(EpsInstrument::from_name("amsa").unwrap(), EpsInstrument::AmsuA);
        assert_eq!(EpsInstrument::from_name("AVHRR").unwrap(), EpsInstrument::Avhrr);
        assert!(EpsInstrument::from_name("MODIS").is_err());
        assert_eq!(EpsInstrument::Hirs.channels().len(), 19);
    }
}
