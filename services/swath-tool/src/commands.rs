//! Subcommand implementations.
//!
//! Each command returns a serializable report; `main` prints it as JSON.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use calibration::planck::brightness_temperature;
use calibration::{CalibrationTable, Calibrator, PlanckConstants};
use navigation::{IrregularGridGeolocation, Navigation, SearchHint};
use projection::{LambertAzimuthalEqualArea, MapProjection};
use serde::Serialize;
use swath::ScanGeometry;
use swath_common::{Linear2D, LongitudeConvention};
use tracing::info;

pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize output")
}

#[derive(Debug, Serialize)]
pub struct PlanckReport {
    pub radiance: f64,
    pub wavenumber: f64,
    pub c1: f64,
    pub c2: f64,
    pub brightness_temperature: f64,
}

pub fn planck(radiance: f64, wavenumber: f64, constants: &str) -> Result<PlanckReport> {
    let constants = match constants.to_ascii_lowercase().as_str() {
        "eps" => PlanckConstants::EPS,
        "sounder" => PlanckConstants::SOUNDER,
        other => bail!("Unknown radiation constants '{}' (expected eps or sounder)", other),
    };
    Ok(PlanckReport {
        radiance,
        wavenumber,
        c1: constants.c1,
        c2: constants.c2,
        brightness_temperature: brightness_temperature(radiance, wavenumber, constants),
    })
}

#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub center: (f64, f64),
    pub lon: f64,
    pub lat: f64,
    pub x: f64,
    pub y: f64,
}

pub fn project(
    center_lon: f64,
    center_lat: f64,
    inverse: bool,
    a: f64,
    b: f64,
) -> Result<ProjectReport> {
    let laea = LambertAzimuthalEqualArea::new(
        projection::lambert_azimuthal::DEFAULT_RADIUS,
        center_lon,
        center_lat,
        0.0,
        0.0,
    )
    .context("Invalid projection center")?;
    let ((lon, lat), (x, y)) = if inverse {
        (laea.to_earth(a, b), (a, b))
    } else {
        ((a, b), laea.from_earth(a, b))
    };
    Ok(ProjectReport {
        center: (center_lon, center_lat),
        lon,
        lat,
        x,
        y,
    })
}

#[derive(Debug, Serialize)]
pub struct CalibrateReport {
    pub instrument: String,
    pub channel: String,
    pub family: &'static str,
    pub quantity: String,
    pub units: &'static str,
    pub values: Vec<f64>,
}

pub fn calibrate(
    table_path: &Path,
    instrument: &str,
    channel: &str,
    width: Option<usize>,
    zenith: Option<f64>,
    counts: &[f64],
) -> Result<CalibrateReport> {
    let table = CalibrationTable::load(table_path)
        .with_context(|| format!("Failed to load calibration table {}", table_path.display()))?;
    let calibrator = Calibrator::new(&table, instrument, channel)
        .with_context(|| format!("No calibration for {} {}", instrument, channel))?;

    let width = width.unwrap_or(counts.len());
    let zenith = zenith.map(|z| vec![z; counts.len()]);
    let values = calibrator
        .calibrate_swath(counts, width, zenith.as_deref())
        .context("Calibration failed")?;
    info!(
        instrument,
        channel,
        samples = values.len(),
        "Calibrated counts"
    );

    let quantity = calibrator.quantity();
    Ok(CalibrateReport {
        instrument: instrument.to_string(),
        channel: channel.to_string(),
        family: calibrator.coefficients().family.name(),
        quantity: quantity.to_string(),
        units: quantity.units(),
        values,
    })
}

#[derive(Debug, Serialize)]
pub struct DescrambleReport {
    pub geometry: &'static str,
    pub block: usize,
    pub width: usize,
    pub height: usize,
    /// Native storage index of each image pixel, one row per image line.
    pub rows: Vec<Vec<usize>>,
}

pub fn descramble(geometry: &str, width: usize, height: usize) -> Result<DescrambleReport> {
    let geometry = ScanGeometry::from_name(geometry)
        .ok_or_else(|| anyhow!("Unknown scan geometry '{}'", geometry))?;
    let perm = geometry.permutation(width, height)?;
    Ok(DescrambleReport {
        geometry: geometry.name(),
        block: geometry.block(),
        width,
        height,
        rows: perm.chunks(width).map(<[usize]>::to_vec).collect(),
    })
}

/// Regular swath-like lon/lat grid sheared along the track.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticGrid {
    pub width: usize,
    pub height: usize,
    pub origin: (f64, f64),
    pub step: f64,
    pub shear: f64,
}

impl SyntheticGrid {
    fn samples(&self) -> (Vec<f64>, Vec<f64>) {
        let mut lon = Vec::with_capacity(self.width * self.height);
        let mut lat = Vec::with_capacity(self.width * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                lon.push(self.origin.0 + col as f64 * self.step + row as f64 * self.shear);
                lat.push(self.origin.1 - row as f64 * self.step);
            }
        }
        (lon, lat)
    }
}

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub lon: f64,
    pub lat: f64,
    pub x: f64,
    pub y: f64,
    pub found: bool,
    /// Earth location of the pixel found, for checking the search.
    pub check: Option<(f64, f64)>,
}

pub fn locate(grid: SyntheticGrid, lon: f64, lat: f64) -> Result<LocateReport> {
    let (glon, glat) = grid.samples();
    let nav = IrregularGridGeolocation::new(
        Linear2D::indices(grid.width, grid.height),
        glon,
        glat,
        grid.width,
        grid.height,
        LongitudeConvention::Signed180,
    )
    .context("Failed to build synthetic geolocation grid")?;

    let mut hint = SearchHint::UNKNOWN;
    let (x, y) = nav.from_reference(lon, lat, &mut hint);
    let found = !(x.is_nan() || y.is_nan());
    Ok(LocateReport {
        lon,
        lat,
        x,
        y,
        found,
        check: found.then(|| nav.to_reference(x.round(), y.round())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;
    use test_utils::fixtures::calibration::TABLE_YAML;

    #[test]
    fn test_planck_golden() {
        let report = planck(120.0, 900.0, "eps").unwrap();
        assert_approx_eq!(report.brightness_temperature, 301.4681551073656, 1e-9);
        assert!(planck(120.0, 900.0, "bogus").is_err());
    }

    #[test]
    fn test_project_round_trip() {
        let forward = project(-100.0, 40.0, false, -95.0, 42.0).unwrap();
        let inverse = project(-100.0, 40.0, true, forward.x, forward.y).unwrap();
        assert_approx_eq!(inverse.lon, -95.0, 1e-6);
        assert_approx_eq!(inverse.lat, 42.0, 1e-6);
    }

    #[test]
    fn test_calibrate_from_file() {
        let (_dir, path) = test_utils::write_temp_file("table.yaml", TABLE_YAML);
        let report = calibrate(&path, "MODIS", "B1", None, None, &[0.0, 100.0, -1.0]).unwrap();
        assert_eq!(report.quantity, "reflectance");
        assert_approx_eq!(report.values[1], 0.05, 1e-12);
        assert!(report.values[2].is_nan());

        assert!(calibrate(&path, "MODIS", "B7", None, None, &[1.0]).is_err());
    }

    #[test]
    fn test_descramble_rows() {
        let report = descramble("cris", 3, 3).unwrap();
        assert_eq!(report.rows, vec![vec![6, 7, 8], vec![3, 4, 5], vec![0, 1, 2]]);
        assert!(descramble("modis", 3, 3).is_err());
        assert!(descramble("cris", 4, 3).is_err());
    }

    #[test]
    fn test_locate_synthetic() {
        let grid = SyntheticGrid {
            width: 20,
            height: 16,
            origin: (10.0, 50.0),
            step: 0.1,
            shear: 0.02,
        };
        let report = locate(grid, 10.5 + 3.0 * 0.02, 49.7).unwrap();
        assert!(report.found);
        assert_approx_eq!(report.x, 5.0, 1e-6);
        assert_approx_eq!(report.y, 3.0, 1e-6);

        let outside = locate(grid, 40.0, 10.0).unwrap();
        assert!(!outside.found);
    }
}
