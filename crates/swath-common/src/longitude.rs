//! Longitude range conventions used by earth-coordinate grids.

use serde::{Deserialize, Serialize};

/// Declared longitude range of a sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeConvention {
    /// Longitudes in [-180, 180).
    #[default]
    Signed180,
    /// Longitudes in [0, 360).
    Unsigned360,
}

impl LongitudeConvention {
    /// Bring a longitude in degrees into this convention's range.
    ///
    /// NaN passes through unchanged.
    #[inline]
    pub fn normalize(self, lon: f64) -> f64 {
        if !lon.is_finite() {
            return lon;
        }
        let wrapped = lon.rem_euclid(360.0);
        match self {
            LongitudeConvention::Signed180 => {
                if wrapped >= 180.0 {
                    wrapped - 360.0
                } else {
                    wrapped
                }
            }
            LongitudeConvention::Unsigned360 => wrapped,
        }
    }
}
