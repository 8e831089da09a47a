//! Calibration across a sequence of granules.
//!
//! Each granule of an aggregated pass carries its own coefficients, so one
//! calibrator is kept per granule. The caller names the granule on every
//! call; nothing about the selection is stored between calls.

use crate::calibrator::Calibrator;
use crate::coefficients::Quantity;
use crate::error::{CalibrationError, CalibrationResult};
use num_traits::ToPrimitive;

#[derive(Debug, Clone)]
pub struct GranuleCalibrators {
    members: Vec<Calibrator>,
}

impl GranuleCalibrators {
    /// One calibrator per granule, in granule order.
    ///
    /// Fails when the list is empty or when the members do not all produce
    /// the same quantity.
    pub fn new(members: Vec<Calibrator>) -> CalibrationResult<Self> {
        let first = members.first().ok_or(CalibrationError::EmptyAggregation)?;
        let quantity = first.quantity();
        if let Some(other) = members.iter().find(|c| c.quantity() != quantity) {
            return Err(CalibrationError::MixedQuantities {
                first: format!("{}/{} ({})", first.instrument(), first.channel(), quantity),
                other: format!(
                    "{}/{} ({})",
                    other.instrument(),
                    other.channel(),
                    other.quantity()
                ),
            });
        }
        Ok(Self { members })
    }

    /// The same calibrator for `granules` granules.
    pub fn repeated(calibrator: Calibrator, granules: usize) -> CalibrationResult<Self> {
        Self::new(vec![calibrator; granules])
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn quantity(&self) -> Quantity {
        self.members[0].quantity()
    }

    pub fn get(&self, granule: usize) -> CalibrationResult<&Calibrator> {
        self.members
            .get(granule)
            .ok_or(CalibrationError::GranuleOutOfRange {
                index: granule,
                len: self.members.len(),
            })
    }

    /// Calibrate counts belonging to `granule`.
    pub fn calibrate<T: ToPrimitive + Sync>(
        &self,
        granule: usize,
        counts: &[T],
    ) -> CalibrationResult<Vec<f64>> {
        Ok(self.get(granule)?.calibrate(counts))
    }

    /// Calibrate consecutive granules whose counts are concatenated in
    /// `counts`, with `granule_len` counts per granule.
    pub fn calibrate_sequence<T: ToPrimitive + Sync>(
        &self,
        counts: &[T],
        granule_len: usize,
    ) -> CalibrationResult<Vec<f64>> {
        let expected = granule_len * self.members.len();
        if counts.len() != expected {
            return Err(swath_common::SwathError::length_mismatch(
                "aggregated counts",
                expected,
                counts.len(),
            )
            .into());
        }
        let mut out = Vec::with_capacity(counts.len());
        for (granule, chunk) in counts.chunks(granule_len.max(1)).enumerate() {
            out.extend(self.calibrate(granule, chunk)?);
        }
        Ok(out)
    }
}
