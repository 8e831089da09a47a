//! Swath assembly.
//!
//! Turns raw instrument samples served by a [`MultiDimensionReader`] into
//! rectangular calibrated images with matching geolocation:
//!
//! 1. [`ScanGeometry`] reorders field-of-regard samples into image order.
//! 2. [`SwathAdapter`] aligns subsets to whole blocks, reads and descrambles
//!    counts, then calibrates them with the channel's [`Calibrator`].
//! 3. Geolocation for the same display subset comes from any
//!    [`Navigation`], typically the adapter's own irregular-grid navigation.
//!
//! # Example
//!
//! ```
//! use swath::ScanGeometry;
//!
//! // One CrIS field of regard: slots 0..9 in storage order
//! let native: Vec<u16> = (0..9).collect();
//! let image = ScanGeometry::Cris3x3.descramble(&native, 3, 3).unwrap();
//! assert_eq!(image, vec![6, 7, 8, 3, 4, 5, 0, 1, 2]);
//! assert_eq!(ScanGeometry::Cris3x3.rescramble(&image, 3, 3).unwrap(), native);
//! ```
//!
//! [`MultiDimensionReader`]: swath_common::MultiDimensionReader
//! [`Calibrator`]: calibration::Calibrator
//! [`Navigation`]: navigation::Navigation

pub mod adapter;
pub mod descramble;
pub mod error;

pub use adapter::{SwathAdapter, SwathConfig, SwathCounts, SwathImage};
pub use descramble::{NativeLayout, ScanGeometry};
pub use error::{AdapterError, AdapterResult};
