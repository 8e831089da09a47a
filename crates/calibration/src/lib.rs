//! Radiometric calibration of swath instrument counts.
//!
//! Every channel is calibrated by one of a small set of algorithm families
//! ([`CalibrationFamily`]) driven by plain coefficient data:
//!
//! - inverse Planck with a family-specific linear correction (brightness temperature)
//! - polynomial in the count (reflectance)
//! - scaled radiance over solar irradiance (reflectance)
//! - radiance → brightness temperature lookup table
//!
//! Coefficients come from a [`CalibrationTable`], loaded from YAML/JSON or
//! read from EPS level 1b metadata through [`EpsInstrument`].
//!
//! # Example
//!
//! ```
//! use calibration::{CalibrationTable, Calibrator};
//!
//! let table = CalibrationTable::from_yaml_str(r#"
//! instruments:
//!   SEVIRI:
//!     IR_108:
//!       family: inverse_planck
//!       wavenumber: 930.659
//!       scale: 10.0
//! "#).unwrap();
//!
//! let cal = Calibrator::new(&table, "SEVIRI", "IR_108").unwrap();
//! let bt = cal.calibrate(&[900i16, -1]);
//! assert!(bt[0] > 200.0 && bt[0] < 350.0);
//! assert!(bt[1].is_nan());
//! ```

pub mod aggregation;
pub mod calibrator;
pub mod coefficients;
pub mod corrections;
pub mod eps;
pub mod error;
pub mod lookup;
pub mod planck;
pub mod reflectance;
pub mod spectral;

pub use aggregation::GranuleCalibrators;
pub use calibrator::Calibrator;
pub use coefficients::{CalibrationFamily, CalibrationTable, ChannelCoefficients, Quantity};
pub use corrections::{LimbCorrection, LinearCorrection};
pub use eps::EpsInstrument;
pub use error::{CalibrationError, CalibrationResult};
pub use lookup::LookupTable;
pub use planck::PlanckConstants;
pub use spectral::CrisBand;
