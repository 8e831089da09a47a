//! Spectral axes and radiance decoding for hyperspectral sounders.

use crate::error::{CalibrationError, CalibrationResult};
use serde::{Deserialize, Serialize};
use swath_common::SwathError;

// ============================================================================
// IASI
// ============================================================================

/// Number of IASI level 1C channels.
pub const IASI_CHANNELS: usize = 8461;

/// Sample number of the first IASI channel.
pub const IASI_FIRST_SAMPLE: f64 = 2581.0;

/// IASI spectral sampling in m⁻¹.
pub const IASI_SAMPLE_SPACING: f64 = 25.0;

/// Channel index ranges (inclusive) sharing one scale factor exponent.
const IASI_SCALE_BANDS: [(usize, usize, i32); 5] = [
    (0, 3339, 7),
    (3340, 6427, 8),
    (6428, 6959, 9),
    (6960, 8139, 8),
    (8140, 8460, 9),
];

/// Multiplier turning a scaled IASI value of `channel` into radiance in
/// mW/(m²·sr·cm⁻¹). None for channels outside the instrument.
pub fn iasi_scale_factor(channel: usize) -> Option<f64> {
    IASI_SCALE_BANDS
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&channel))
        .map(|(_, _, exponent)| 1.0e5 * 10f64.powi(-exponent))
}

/// Decode an image of scaled values for one channel.
pub fn decode_iasi_channel(values: &[i16], channel: usize) -> CalibrationResult<Vec<f64>> {
    let factor = iasi_scale_factor(channel).ok_or_else(|| unknown_iasi_channel(channel))?;
    Ok(values.iter().map(|&v| v as f64 * factor).collect())
}

/// Decode a spectrum of scaled values that starts at `first_channel`.
pub fn decode_iasi_spectrum(values: &[i16], first_channel: usize) -> CalibrationResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(k, &v)| {
            let channel = first_channel + k;
            iasi_scale_factor(channel)
                .map(|factor| v as f64 * factor)
                .ok_or_else(|| unknown_iasi_channel(channel))
        })
        .collect()
}

/// Wavenumbers (m⁻¹) of the first `count` IASI level 1C channels.
pub fn iasi_wavenumbers(count: usize) -> Vec<f64> {
    (0..count)
        .map(|k| IASI_SAMPLE_SPACING * (IASI_FIRST_SAMPLE + k as f64 - 1.0))
        .collect()
}

fn unknown_iasi_channel(channel: usize) -> CalibrationError {
    SwathError::UnknownChannel {
        instrument: "IASI".to_string(),
        channel: channel.to_string(),
    }
    .into()
}

// ============================================================================
// CrIS
// ============================================================================

/// CrIS full spectral resolution bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrisBand {
    #[serde(rename = "LW")]
    Longwave,
    #[serde(rename = "MW")]
    Midwave,
    #[serde(rename = "SW")]
    Shortwave,
}

impl CrisBand {
    pub const ALL: [CrisBand; 3] = [CrisBand::Longwave, CrisBand::Midwave, CrisBand::Shortwave];

    /// Band of a product or array name ending in LW, MW or SW.
    pub fn from_name(name: &str) -> CalibrationResult<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.ends_with("LW") {
            Ok(CrisBand::Longwave)
        } else if upper.ends_with("MW") {
            Ok(CrisBand::Midwave)
        } else if upper.ends_with("SW") {
            Ok(CrisBand::Shortwave)
        } else {
            Err(SwathError::UnknownChannel {
                instrument: "CrIS".to_string(),
                channel: name.to_string(),
            }
            .into())
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            CrisBand::Longwave => 713,
            CrisBand::Midwave => 865,
            CrisBand::Shortwave => 633,
        }
    }

    /// First wavenumber (cm⁻¹).
    pub fn first_wavenumber(&self) -> f64 {
        match self {
            CrisBand::Longwave => 650.0,
            CrisBand::Midwave => 1210.0,
            CrisBand::Shortwave => 2155.0,
        }
    }

    /// Channel spacing (cm⁻¹).
    pub fn spacing(&self) -> f64 {
        0.625
    }

    pub fn wavenumbers(&self) -> Vec<f64> {
        (0..self.channels())
            .map(|k| self.first_wavenumber() + k as f64 * self.spacing())
            .collect()
    }

    /// Index of the channel nearest to `wavenumber`, None outside the band.
    pub fn channel_at(&self, wavenumber: f64) -> Option<usize> {
        let g = (wavenumber - self.first_wavenumber()) / self.spacing();
        let last = (self.channels() - 1) as f64;
        if !(g >= -0.5 && g <= last + 0.5) {
            return None;
        }
        Some((g + 0.5).floor().clamp(0.0, last) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iasi_scale_bands() {
        assert!((iasi_scale_factor(0).unwrap() - 1e-2).abs() < 1e-15);
        assert!((iasi_scale_factor(3340).unwrap() - 1e-3).abs() < 1e-15);
        assert!((iasi_scale_factor(6959).unwrap() - 1e-4).abs() < 1e-15);
        assert!((iasi_scale_factor(8139).unwrap() - 1e-3).abs() < 1e-15);
        assert!((iasi_scale_factor(8460).unwrap() - 1e-4).abs() < 1e-15);
        assert!(iasi_scale_factor(IASI_CHANNELS).is_none());
    }

    #[test]
    fn test_iasi_decode() {
        let out = decode_iasi_channel(&[100, -3], 10).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] + 0.03).abs() < 1e-12);

        // Spectrum crossing a band edge
        let out = decode_iasi_spectrum(&[1000, 1000], 3339).unwrap();
        assert!((out[0] - 10.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);

        assert!(decode_iasi_spectrum(&[1, 1], 8460).is_err());
    }

    #[test]
    fn test_iasi_wavenumbers() {
        let nu = iasi_wavenumbers(3);
        assert_eq!(nu, vec![64500.0, 64525.0, 64550.0]);
        assert_eq!(iasi_wavenumbers(IASI_CHANNELS).len(), IASI_CHANNELS);
    }

    #[test]
    fn test_cris_bands() {
        assert_eq!(CrisBand::from_name("CrIS_FSR_LW").unwrap(), CrisBand::Longwave);
        assert_eq!(CrisBand::from_name("sw").unwrap(), CrisBand::Shortwave);
        assert!(CrisBand::from_name("VIS").is_err());

        let lw = CrisBand::Longwave.wavenumbers();
        assert_eq!(lw.len(), 713);
        assert_eq!(lw[0], 650.0);
        assert_eq!(lw[712], 650.0 + 712.0 * 0.625);

        assert_eq!(CrisBand::Midwave.channel_at(1210.3), Some(0));
        assert_eq!(CrisBand::Midwave.channel_at(1210.4), Some(1));
        assert_eq!(CrisBand::Midwave.channel_at(1000.0), None);
    }
}
