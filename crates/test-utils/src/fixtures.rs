//! Common test fixtures for swath tests.
//!
//! Calibration tables, product metadata and small synthetic swaths that
//! several crates test against.

use std::fs;
use std::path::PathBuf;
use swath_common::{ArrayData, MemoryReader};

/// Calibration tables in the on-disk format.
pub mod calibration {
    /// A table covering every calibration family.
    pub const TABLE_YAML: &str = r#"
instruments:
  AVHRR:
    CH1:
      family: solar_irradiance
      irradiance: 139.9
      scale: 100.0
      solar_zenith_correction: true
    CH4:
      family: inverse_planck
      wavenumber: 927.0
      scale: 100.0
      correction: { kind: gain_offset, a: 0.3, b: 0.999 }
  MODIS:
    B1:
      family: polynomial_reflectance
      coefficients: [0.0, 0.05, 0.0]
      fill_value: 65535
  VIIRS:
    M15:
      family: inverse_planck
      wavenumber: 925.0
      scale: 100.0
      constants: { c1: 1.191066e-5, c2: 1.438833 }
      correction: { kind: band_correction, alpha: 1.001, beta: 0.05 }
  SSMIS:
    LUT:
      family: lookup
      scale: 1.0
      table:
        radiance: [10.0, 20.0, 40.0, 80.0, 160.0]
        temperature: [200.0, 225.0, 250.0, 275.0, 300.0]
  HIRS:
    CH8:
      family: inverse_planck
      wavenumber: 898.0
      scale: 10.0
      limb_correction: [1.5, 0.5, 0.0, 0.5, 1.5]
"#;

    /// A one-channel table in JSON.
    pub const SINGLE_CHANNEL_JSON: &str = r#"{
  "instruments": {
    "AVHRR": {
      "CH5": {
        "family": "inverse_planck",
        "wavenumber": 837.0,
        "scale": 100.0
      }
    }
  }
}"#;
}

/// EPS level 1b metadata records.
pub mod eps {
    use super::*;

    pub const AVHRR_RADIANCE_ARRAY: &str =
        "U-MARF/EPS/AVHR_xxx_1B/METADATA/GIADR/GIADR_RADIANCE_AVHRR_L1_ARRAY_000001";

    pub const HIRS_TEMP_ARRAY: &str =
        "U-MARF/EPS/HIRS_xxx_1B/METADATA/GIADR/GIADR_TEMP_HIRS_L1_ARRAY_000001";

    /// AVHRR/3 record with plausible values for all six channels.
    pub fn avhrr_reader() -> MemoryReader {
        let mut record = vec![0i32; 50];
        record[31] = 1399; // CH1 irradiance 139.9
        record[33] = 2326; // CH2 irradiance 232.6
        record[35] = 140; // CH3A irradiance 14.0
        record[37] = 269_400; // CH3B γ 2694.00
        record[38] = 165_000; // CH3B A 1.65
        record[39] = 997_400; // CH3B B 0.9974
        record[40] = 927_220; // CH4 γ 927.22
        record[41] = 34_000; // CH4 A 0.34
        record[42] = 999_300; // CH4 B 0.9993
        record[43] = 837_410; // CH5 γ 837.41
        record[44] = 26_000; // CH5 A 0.26
        record[45] = 999_600; // CH5 B 0.9996
        MemoryReader::new().with_array(AVHRR_RADIANCE_ARRAY, vec![1, 50], ArrayData::Int(record))
    }

    /// HIRS/4 record: 19 wavenumbers, intercepts and slopes.
    pub fn hirs_reader() -> MemoryReader {
        let channels = 19;
        let mut record = vec![0i32; 3 * channels];
        for ch in 0..channels {
            let wavenumber = 670.0 + ch as f64 * 100.0;
            let divisor = if ch < 12 { 1e6 } else { 1e5 };
            record[ch] = (wavenumber * divisor / 1000.0) as i32 * 1000;
            record[channels + ch] = -2_000;
            record[2 * channels + ch] = 1_000_200;
        }
        MemoryReader::new().with_array(HIRS_TEMP_ARRAY, vec![3, channels], ArrayData::Int(record))
    }
}

/// Small synthetic swaths.
pub mod swath {
    use super::*;
    use crate::generators::{create_count_ramp, create_skewed_lonlat_grid};

    pub const COUNTS: &str = "Data/counts";
    pub const LONGITUDE: &str = "Geolocation/Longitude";
    pub const LATITUDE: &str = "Geolocation/Latitude";

    /// Reader holding a `track` x `xtrack` count array and full-resolution
    /// geolocation, with counts ramping from 0 upward in storage order.
    pub fn swath_reader(track: usize, xtrack: usize) -> MemoryReader {
        let len = track * xtrack;
        let counts: Vec<i16> = create_count_ramp(len, 0, len as i32 - 1)
            .into_iter()
            .map(|c| c as i16)
            .collect();
        let (lon, lat) = create_skewed_lonlat_grid(xtrack, track, (10.0, 50.0), (0.1, 0.1), 0.01);
        MemoryReader::new()
            .with_array(COUNTS, vec![track, xtrack], ArrayData::Short(counts))
            .with_array(LONGITUDE, vec![track, xtrack], ArrayData::Double(lon))
            .with_array(LATITUDE, vec![track, xtrack], ArrayData::Double(lat))
    }
}

/// Create a temporary directory for a test, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("swath-test-")
        .tempdir()
        .expect("Failed to create temp directory")
}

/// Write `content` into a fresh temporary directory as `name`.
///
/// Returns the directory (keep it alive for as long as the file is needed)
/// and the file path.
pub fn write_temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swath_common::MultiDimensionReader;

    #[test]
    fn test_avhrr_record_shape() {
        let reader = eps::avhrr_reader();
        assert_eq!(
            reader.dimension_lengths(eps::AVHRR_RADIANCE_ARRAY).unwrap(),
            vec![1, 50]
        );
    }

    #[test]
    fn test_hirs_record_values() {
        let reader = eps::hirs_reader();
        let row = reader
            .read_int_array(eps::HIRS_TEMP_ARRAY, &[0, 0], &[1, 19], &[1, 1])
            .unwrap();
        assert_eq!(row[0], 670_000_000);
        assert_eq!(row[12], 187_000_000);
    }

    #[test]
    fn test_swath_reader() {
        let reader = swath::swath_reader(6, 9);
        let counts = reader
            .read_short_array(swath::COUNTS, &[1, 0], &[1, 9], &[1, 1])
            .unwrap();
        assert_eq!(counts[0], 9);
        assert_eq!(counts[8], 17);
    }

    #[test]
    fn test_write_temp_file() {
        let (_dir, path) = write_temp_file("table.yaml", calibration::TABLE_YAML);
        assert!(fs::read_to_string(path).unwrap().contains("AVHRR"));
    }
}
