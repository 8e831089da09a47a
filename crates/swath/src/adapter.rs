//! Swath adapter: reader → descramble → calibrate → geolocate.
//!
//! A `SwathAdapter` owns one reader and the settings needed to turn one of
//! its count arrays into a calibrated rectangular image. When the instrument
//! samples in fields of regard, requests are widened to whole blocks and the
//! native samples are descrambled before calibration. Geolocation is served
//! for the same display subset through any [`Navigation`].

use crate::descramble::{NativeLayout, ScanGeometry};
use crate::error::{AdapterError, AdapterResult};
use calibration::{CalibrationTable, Calibrator, Quantity};
use navigation::{IrregularGridGeolocation, Navigation};
use serde::{Deserialize, Serialize};
use swath_common::{
    DimRange, Linear1D, Linear2D, LongitudeConvention, MultiDimensionReader, SubsetRequest,
    SwathError,
};
use tracing::{debug, info};

fn default_track_dim() -> String {
    "Track".to_string()
}

fn default_xtrack_dim() -> String {
    "XTrack".to_string()
}

fn default_geo_stride() -> usize {
    1
}

/// Settings describing one swath variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwathConfig {
    /// Raw count array.
    pub array_name: String,
    #[serde(default = "default_track_dim")]
    pub track_dim: String,
    #[serde(default = "default_xtrack_dim")]
    pub xtrack_dim: String,
    /// Detector dimension of flat block storage.
    #[serde(default)]
    pub fov_dim: Option<String>,
    #[serde(default)]
    pub scan_geometry: Option<ScanGeometry>,
    pub instrument: String,
    pub channel: String,
    #[serde(default)]
    pub lon_array: Option<String>,
    #[serde(default)]
    pub lat_array: Option<String>,
    /// Image pixels between consecutive geolocation samples.
    #[serde(default = "default_geo_stride")]
    pub geo_stride: usize,
    #[serde(default)]
    pub longitude_convention: LongitudeConvention,
}

impl SwathConfig {
    pub fn new(
        array_name: impl Into<String>,
        instrument: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            array_name: array_name.into(),
            track_dim: default_track_dim(),
            xtrack_dim: default_xtrack_dim(),
            fov_dim: None,
            scan_geometry: None,
            instrument: instrument.into(),
            channel: channel.into(),
            lon_array: None,
            lat_array: None,
            geo_stride: default_geo_stride(),
            longitude_convention: LongitudeConvention::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> AdapterResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_geometry(mut self, geometry: ScanGeometry, fov_dim: Option<&str>) -> Self {
        self.scan_geometry = Some(geometry);
        self.fov_dim = fov_dim.map(str::to_string);
        self
    }

    pub fn with_geolocation(mut self, lon: &str, lat: &str, stride: usize) -> Self {
        self.lon_array = Some(lon.to_string());
        self.lat_array = Some(lat.to_string());
        self.geo_stride = stride;
        self
    }

    pub fn validate(&self) -> AdapterResult<()> {
        if self.track_dim == self.xtrack_dim {
            return Err(AdapterError::InvalidConfig(format!(
                "track and cross-track dimensions are both '{}'",
                self.track_dim
            )));
        }
        if self.geo_stride == 0 {
            return Err(AdapterError::InvalidConfig(
                "geo_stride must be positive".to_string(),
            ));
        }
        if self.lon_array.is_some() != self.lat_array.is_some() {
            return Err(AdapterError::InvalidConfig(
                "lon_array and lat_array must be given together".to_string(),
            ));
        }
        if let Some(geometry) = self.scan_geometry {
            if geometry.layout() == NativeLayout::Flat && self.fov_dim.is_none() {
                return Err(AdapterError::InvalidConfig(format!(
                    "{:?} stores detectors in a separate dimension; fov_dim is required",
                    geometry
                )));
            }
        }
        Ok(())
    }

    fn fov_dim(&self) -> AdapterResult<&str> {
        self.fov_dim
            .as_deref()
            .ok_or_else(|| AdapterError::InvalidConfig("fov_dim is not set".to_string()))
    }
}

/// Raw counts of a display subset, in rectangular image order.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathCounts {
    /// Subset actually covered, after any block alignment.
    pub subset: SubsetRequest,
    pub width: usize,
    pub height: usize,
    pub counts: Vec<f64>,
}

/// Calibrated image of a display subset.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathImage {
    pub subset: SubsetRequest,
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub quantity: Quantity,
}

/// Composes one reader, one calibrator and an optional scan geometry.
#[derive(Debug)]
pub struct SwathAdapter<R: MultiDimensionReader> {
    reader: R,
    config: SwathConfig,
    calibrator: Calibrator,
}

impl<R: MultiDimensionReader> SwathAdapter<R> {
    /// Build an adapter whose calibrator comes from `table`.
    pub fn new(reader: R, config: SwathConfig, table: &CalibrationTable) -> AdapterResult<Self> {
        let calibrator = Calibrator::new(table, &config.instrument, &config.channel)?;
        Self::with_calibrator(reader, config, calibrator)
    }

    pub fn with_calibrator(
        reader: R,
        config: SwathConfig,
        calibrator: Calibrator,
    ) -> AdapterResult<Self> {
        config.validate()?;
        let adapter = Self {
            reader,
            config,
            calibrator,
        };
        let [height, width] = adapter.image_lengths()?;
        info!(
            array = %adapter.config.array_name,
            instrument = %adapter.config.instrument,
            channel = %adapter.config.channel,
            width,
            height,
            geometry = ?adapter.config.scan_geometry,
            "Opened swath"
        );
        Ok(adapter)
    }

    pub fn config(&self) -> &SwathConfig {
        &self.config
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Rectangular image lengths as `[track, cross-track]`.
    pub fn image_lengths(&self) -> AdapterResult<[usize; 2]> {
        let dims = self.reader.dimension_lengths(&self.config.array_name)?;
        match self.config.scan_geometry.map(|g| (g, g.layout())) {
            Some((geometry, NativeLayout::Flat)) => {
                if dims.len() != 3 {
                    return Err(SwathError::InvalidShape(format!(
                        "'{}' has rank {}, expected track, cross-track and detector dimensions",
                        self.config.array_name,
                        dims.len()
                    ))
                    .into());
                }
                if dims[2] != geometry.fovs() {
                    return Err(SwathError::length_mismatch(
                        format!("detectors of '{}'", self.config.array_name),
                        geometry.fovs(),
                        dims[2],
                    )
                    .into());
                }
                let b = geometry.block();
                Ok([dims[0] * b, dims[1] * b])
            }
            _ => {
                if dims.len() != 2 {
                    return Err(SwathError::InvalidShape(format!(
                        "'{}' has rank {}, expected track and cross-track dimensions",
                        self.config.array_name,
                        dims.len()
                    ))
                    .into());
                }
                Ok([dims[0], dims[1]])
            }
        }
    }

    /// Subset covering the whole rectangular image.
    pub fn full_subset(&self) -> AdapterResult<SubsetRequest> {
        let [height, width] = self.image_lengths()?;
        Ok(SubsetRequest::new()
            .with(self.config.track_dim.as_str(), DimRange::full(height))
            .with(self.config.xtrack_dim.as_str(), DimRange::full(width)))
    }

    fn spatial_dims(&self) -> [&str; 2] {
        [&self.config.track_dim, &self.config.xtrack_dim]
    }

    /// Read raw counts for `subset` in rectangular image order.
    ///
    /// `subset` is left untouched; the returned `SwathCounts::subset` is the
    /// region actually covered.
    pub fn read_counts(&self, subset: &SubsetRequest) -> AdapterResult<SwathCounts> {
        let spatial = self.spatial_dims();
        let geometry = match self.config.scan_geometry {
            Some(geometry) => geometry,
            None => {
                let (start, count, stride) = subset.to_reader_args(&spatial)?;
                let data = self
                    .reader
                    .read_array(&self.config.array_name, &start, &count, &stride)?;
                return Ok(SwathCounts {
                    subset: subset.clone(),
                    width: count[1],
                    height: count[0],
                    counts: data.to_f64_vec(),
                });
            }
        };

        // Interleaved storage is read through the display subset only.
        let fov_dim = match geometry.layout() {
            NativeLayout::Flat => self.config.fov_dim()?,
            NativeLayout::Interleaved => self.config.fov_dim.as_deref().unwrap_or("FOV"),
        };
        let aligned = subset.align_to_blocks(
            spatial,
            fov_dim,
            geometry.block(),
            self.image_lengths()?,
        )?;
        let height = aligned.display.count(spatial[0])?;
        let width = aligned.display.count(spatial[1])?;

        let native = match geometry.layout() {
            NativeLayout::Flat => {
                let (start, count, stride) = aligned
                    .native
                    .to_reader_args(&[spatial[0], spatial[1], fov_dim])?;
                self.reader
                    .read_array(&self.config.array_name, &start, &count, &stride)?
            }
            NativeLayout::Interleaved => {
                let (start, count, stride) = aligned.display.to_reader_args(&spatial)?;
                self.reader
                    .read_array(&self.config.array_name, &start, &count, &stride)?
            }
        };

        debug!(?geometry, width, height, "Descrambling block-aligned subset");
        let counts = geometry.descramble(&native.to_f64_vec(), width, height)?;
        Ok(SwathCounts {
            subset: aligned.display,
            width,
            height,
            counts,
        })
    }

    /// Read and calibrate `subset`.
    ///
    /// `solar_zenith` must match the returned image layout; it is only
    /// consulted by reflective channels configured for zenith normalization.
    pub fn read_calibrated(
        &self,
        subset: &SubsetRequest,
        solar_zenith: Option<&[f64]>,
    ) -> AdapterResult<SwathImage> {
        let raw = self.read_counts(subset)?;
        let values = self
            .calibrator
            .calibrate_swath(&raw.counts, raw.width, solar_zenith)?;
        Ok(SwathImage {
            subset: raw.subset,
            width: raw.width,
            height: raw.height,
            values,
            quantity: self.calibrator.quantity(),
        })
    }

    /// Geolocation built from the configured longitude/latitude arrays.
    ///
    /// Sample `(c, r)` of those arrays sits at image pixel
    /// `(c·geo_stride, r·geo_stride)`, so the returned navigation works in
    /// whole-swath pixel coordinates.
    ///
    /// The navigation domain ends at the last sample. When the image extends
    /// past it, the trailing `geo_stride - 1` pixels repeat the edge sample
    /// and anything further out geolocates to NaN.
    pub fn navigation(&self) -> AdapterResult<IrregularGridGeolocation> {
        let (lon_name, lat_name) = match (&self.config.lon_array, &self.config.lat_array) {
            (Some(lon), Some(lat)) => (lon.as_str(), lat.as_str()),
            _ => {
                return Err(AdapterError::InvalidConfig(format!(
                    "no geolocation arrays configured for '{}'",
                    self.config.array_name
                )))
            }
        };

        let dims = self.reader.dimension_lengths(lat_name)?;
        let lon_dims = self.reader.dimension_lengths(lon_name)?;
        if dims.len() != 2 || dims != lon_dims {
            return Err(SwathError::InvalidShape(format!(
                "'{}' {:?} and '{}' {:?} must be matching 2-D arrays",
                lon_name, lon_dims, lat_name, dims
            ))
            .into());
        }
        let (rows, cols) = (dims[0], dims[1]);
        let read_all = |name: &str| -> AdapterResult<Vec<f64>> {
            Ok(self
                .reader
                .read_array(name, &[0, 0], &[rows, cols], &[1, 1])?
                .to_f64_vec())
        };
        let lon = read_all(lon_name)?;
        let lat = read_all(lat_name)?;

        let s = self.config.geo_stride;
        let last_x = cols.saturating_sub(1) * s;
        let last_y = rows.saturating_sub(1) * s;
        let domain = Linear2D::new(
            Linear1D::new(0.0, last_x as f64, last_x + 1),
            Linear1D::new(0.0, last_y as f64, last_y + 1),
        );
        Ok(IrregularGridGeolocation::new(
            domain,
            lon,
            lat,
            cols,
            rows,
            self.config.longitude_convention,
        )?)
    }

    /// Earth coordinates of every pixel of `display`, row-major.
    pub fn geolocate(
        &self,
        navigation: &dyn Navigation,
        display: &SubsetRequest,
    ) -> AdapterResult<(Vec<f64>, Vec<f64>)> {
        let [track, xtrack] = self.spatial_dims();
        let pixels = Linear2D::new(
            Linear1D::from_range(display.get(xtrack)?),
            Linear1D::from_range(display.get(track)?),
        );
        let (x, y) = pixels.samples();
        Ok(navigation.to_reference_many(&x, &y)?)
    }
}
