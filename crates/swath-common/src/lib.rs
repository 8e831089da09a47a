//! Common types shared by the swath geolocation and calibration crates.

pub mod error;
pub mod grid;
pub mod longitude;
pub mod reader;
pub mod subset;

pub use error::{SwathError, SwathResult};
pub use grid::{Linear1D, Linear2D};
pub use longitude::LongitudeConvention;
pub use reader::{ArrayData, MemoryReader, MultiDimensionReader};
pub use subset::{BlockAlignedSubset, DimRange, SubsetRequest};
