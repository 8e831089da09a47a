//! Channel calibrator.
//!
//! A `Calibrator` is built once per instrument channel from validated
//! coefficients and then maps raw counts to physical values. Bad inputs are
//! per-pixel: negative counts, the channel's fill value and non-finite counts
//! calibrate to NaN and never fail the batch.

use crate::coefficients::{CalibrationFamily, CalibrationTable, ChannelCoefficients, Quantity};
use crate::corrections::solar_zenith_normalize;
use crate::error::{CalibrationError, CalibrationResult};
use crate::planck::brightness_temperature;
use crate::reflectance::{irradiance_reflectance, polynomial_reflectance};
use num_traits::ToPrimitive;
use rayon::prelude::*;
use swath_common::SwathError;
use tracing::debug;

/// Arrays smaller than this are calibrated on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// Calibrates counts of a single instrument channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibrator {
    instrument: String,
    channel: String,
    coefficients: ChannelCoefficients,
}

impl Calibrator {
    /// Look up and validate the coefficients for `instrument`/`channel`.
    pub fn new(table: &CalibrationTable, instrument: &str, channel: &str) -> CalibrationResult<Self> {
        let coefficients = table.get(instrument, channel)?.clone();
        Self::from_coefficients(instrument, channel, coefficients)
    }

    pub fn from_coefficients(
        instrument: &str,
        channel: &str,
        coefficients: ChannelCoefficients,
    ) -> CalibrationResult<Self> {
        coefficients.validate(&format!("{}/{}", instrument, channel))?;
        debug!(
            instrument,
            channel,
            family = coefficients.family.name(),
            quantity = %coefficients.quantity(),
            "Built calibrator"
        );
        Ok(Self {
            instrument: instrument.to_string(),
            channel: channel.to_string(),
            coefficients,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn coefficients(&self) -> &ChannelCoefficients {
        &self.coefficients
    }

    pub fn quantity(&self) -> Quantity {
        self.coefficients.quantity()
    }

    pub fn wavenumber(&self) -> Option<f64> {
        self.coefficients.wavenumber()
    }

    /// Calibrate a single count.
    pub fn calibrate_value(&self, count: f64) -> f64 {
        if !count.is_finite() || count < 0.0 || Some(count) == self.coefficients.fill_value {
            return f64::NAN;
        }
        match &self.coefficients.family {
            CalibrationFamily::InversePlanck {
                wavenumber,
                scale,
                constants,
                correction,
            } => correction.apply(brightness_temperature(count / scale, *wavenumber, *constants)),
            CalibrationFamily::PolynomialReflectance {
                coefficients,
                factor,
            } => polynomial_reflectance(count, *coefficients, *factor),
            CalibrationFamily::SolarIrradiance { irradiance, scale } => {
                irradiance_reflectance(count, *scale, *irradiance)
            }
            CalibrationFamily::Lookup { scale, table } => {
                table.radiance_to_temperature(count / scale)
            }
        }
    }

    /// Calibrate an array of counts of any primitive numeric type.
    pub fn calibrate<T: ToPrimitive + Sync>(&self, counts: &[T]) -> Vec<f64> {
        let one = |c: &T| self.calibrate_value(c.to_f64().unwrap_or(f64::NAN));
        if counts.len() < PARALLEL_THRESHOLD {
            counts.iter().map(one).collect()
        } else {
            counts.par_iter().map(one).collect()
        }
    }

    /// Calibrate a row-major swath and apply the channel's corrections.
    ///
    /// `width` is the number of scan positions per line. `solar_zenith` (in
    /// degrees, same layout as `counts`) is required when the channel is
    /// configured for solar zenith normalization and ignored otherwise.
    pub fn calibrate_swath<T: ToPrimitive + Sync>(
        &self,
        counts: &[T],
        width: usize,
        solar_zenith: Option<&[f64]>,
    ) -> CalibrationResult<Vec<f64>> {
        if width == 0 || counts.len() % width != 0 {
            return Err(SwathError::InvalidShape(format!(
                "{} counts do not form lines of {} samples",
                counts.len(),
                width
            ))
            .into());
        }

        let mut values = self.calibrate(counts);

        if self.coefficients.solar_zenith_correction && self.quantity() == Quantity::Reflectance {
            let zenith = solar_zenith.ok_or_else(|| CalibrationError::MissingAncillary {
                channel: self.channel.clone(),
                what: "solar zenith angles",
            })?;
            if zenith.len() != values.len() {
                return Err(
                    SwathError::length_mismatch("solar zenith", values.len(), zenith.len()).into(),
                );
            }
            values
                .par_iter_mut()
                .zip(zenith.par_iter())
                .for_each(|(v, &z)| *v = solar_zenith_normalize(*v, z));
        }

        if let Some(limb) = &self.coefficients.limb_correction {
            limb.apply(&self.channel, &mut values, width)?;
        }

        Ok(values)
    }
}
