//! Geolocation from a reduced-resolution longitude/latitude grid.
//!
//! Many swath products store earth coordinates on a coarser grid than the
//! image pixels (for example every fifth pixel of every fifth scan line).
//! `IrregularGridGeolocation` interpolates that grid onto the dense pixel
//! domain and inverts it by searching a locally projected copy of the grid.
//! Searching in Lambert azimuthal equal-area coordinates centered on the
//! swath keeps cells well shaped across the antimeridian and near the poles.

use crate::cell_search::{CellSearch, SearchHint};
use crate::error::{NavigationError, NavigationResult};
use crate::interpolation::{bilinear_interpolate, nearest_interpolate};
use crate::Navigation;
use projection::lambert_azimuthal::DEFAULT_RADIUS;
use projection::LambertAzimuthalEqualArea;
use swath_common::{Linear1D, Linear2D, LongitudeConvention};
use tracing::debug;

/// Longitude spread (degrees) above which a cell is taken to straddle the
/// antimeridian.
pub const DATELINE_SPREAD: f64 = 300.0;

/// Pixel ↔ earth mapping backed by an irregular longitude/latitude grid.
#[derive(Debug, Clone)]
pub struct IrregularGridGeolocation {
    /// Dense pixel domain the caller works in
    domain: Linear2D,
    /// Maps dense grid indices onto sample grid indices
    sub_set: Linear2D,
    lon: Vec<f64>,
    lat: Vec<f64>,
    width: usize,
    height: usize,
    /// Surviving scan lines, when any were missing
    good_lines: Option<Vec<usize>>,
    line_is_good: Vec<bool>,
    projection: LambertAzimuthalEqualArea,
    /// Projected samples of the surviving lines
    planar: CellSearch,
    convention: LongitudeConvention,
    need_interp: bool,
}

impl IrregularGridGeolocation {
    /// Build a geolocation from a `width` x `height` sample grid.
    ///
    /// # Arguments
    /// * `domain` - Dense pixel domain (pixel coordinates, x then y)
    /// * `lon`, `lat` - Row-major samples in degrees, NaN or |lat| > 90 for fill
    /// * `width`, `height` - Sample grid dimensions
    /// * `convention` - Longitude range the samples use
    pub fn new(
        domain: Linear2D,
        lon: Vec<f64>,
        lat: Vec<f64>,
        width: usize,
        height: usize,
        convention: LongitudeConvention,
    ) -> NavigationResult<Self> {
        NavigationError::check_pair(lon.len(), lat.len())?;
        if lon.len() != width * height {
            return Err(NavigationError::InvalidGrid(format!(
                "expected {} samples for {}x{} grid, got {}",
                width * height,
                width,
                height,
                lon.len()
            )));
        }
        if width < 2 || height < 2 || domain.is_empty() {
            return Err(NavigationError::InvalidGrid(format!(
                "sample grid {}x{} and pixel domain {:?} are too small",
                width,
                height,
                domain.lengths()
            )));
        }

        let (dense_w, dense_h) = domain.lengths();
        let sub_set = Linear2D::new(
            Linear1D::new(0.0, (width - 1) as f64, dense_w),
            Linear1D::new(0.0, (height - 1) as f64, dense_h),
        );
        let need_interp = !(dense_w == width && dense_h == height);

        let good = Self::good_lines(&lon, &lat, width, height);
        if good.len() < 2 {
            return Err(NavigationError::InvalidGrid(format!(
                "only {} of {} scan lines have valid geolocation",
                good.len(),
                height
            )));
        }
        let mut line_is_good = vec![false; height];
        for &line in &good {
            line_is_good[line] = true;
        }
        let good_lines = if good.len() == height {
            None
        } else {
            debug!(
                missing = height - good.len(),
                lines = height,
                "Removing missing scan lines from geolocation grid"
            );
            Some(good)
        };

        // Samples of the surviving lines only
        let (lon_c, lat_c, len_y) = match &good_lines {
            Some(lines) => {
                let mut lon_c = Vec::with_capacity(width * lines.len());
                let mut lat_c = Vec::with_capacity(width * lines.len());
                for &line in lines {
                    let start = line * width;
                    lon_c.extend_from_slice(&lon[start..start + width]);
                    lat_c.extend_from_slice(&lat[start..start + width]);
                }
                (lon_c, lat_c, lines.len())
            }
            None => (lon.clone(), lat.clone(), height),
        };

        // The center column of a surviving line is valid by construction.
        let center = (len_y / 2) * width + width / 2;
        let projection = LambertAzimuthalEqualArea::new(
            DEFAULT_RADIUS,
            lon_c[center],
            lat_c[center],
            0.0,
            0.0,
        )?;

        let (px, py): (Vec<f64>, Vec<f64>) = lon_c
            .iter()
            .zip(&lat_c)
            .map(|(&lo, &la)| {
                if lo.is_nan() || la.is_nan() || la.abs() > 90.0 {
                    (f64::NAN, f64::NAN)
                } else {
                    projection.forward(lo.to_radians(), la.to_radians())
                }
            })
            .unzip();
        let planar = CellSearch::new(px, py, width, len_y)?;

        debug!(
            width,
            height,
            dense_width = dense_w,
            dense_height = dense_h,
            center_lon = lon_c[center],
            center_lat = lat_c[center],
            "Built irregular grid geolocation"
        );

        Ok(Self {
            domain,
            sub_set,
            lon,
            lat,
            width,
            height,
            good_lines,
            line_is_good,
            projection,
            planar,
            convention,
            need_interp,
        })
    }

    /// Scan lines whose center sample is present and has a valid latitude.
    fn good_lines(lon: &[f64], lat: &[f64], width: usize, height: usize) -> Vec<usize> {
        (0..height)
            .filter(|&j| {
                let idx = j * width + width / 2;
                !(lon[idx].is_nan() || lat[idx].is_nan()) && lat[idx].abs() <= 90.0
            })
            .collect()
    }

    /// Surviving scan lines, or None when no line was missing.
    pub fn surviving_lines(&self) -> Option<&[usize]> {
        self.good_lines.as_deref()
    }

    pub fn sample_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn local_projection(&self) -> &LambertAzimuthalEqualArea {
        &self.projection
    }

    pub fn convention(&self) -> LongitudeConvention {
        self.convention
    }

    /// Nearest surviving line to a fractional line index, ties to the lower line.
    fn nearest_good_line(&self, y: f64) -> f64 {
        let lines = match &self.good_lines {
            Some(lines) => lines,
            None => return y,
        };
        let after = lines.partition_point(|&l| (l as f64) < y);
        let below = after.checked_sub(1).map(|k| lines[k] as f64);
        let above = lines.get(after).map(|&l| l as f64);
        match (below, above) {
            (Some(b), Some(a)) => {
                if y - b <= a - y {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => y,
        }
    }

    /// Snap a sample-grid line coordinate off a missing line.
    fn avoid_missing_line(&self, y: f64) -> f64 {
        if self.good_lines.is_none() || y.is_nan() {
            return y;
        }
        let last = self.height - 1;
        let y0 = (y.floor().max(0.0) as usize).min(last);
        let y1 = (y.ceil().max(0.0) as usize).min(last);
        if self.line_is_good[y0] && self.line_is_good[y1] {
            y
        } else {
            self.nearest_good_line(y)
        }
    }

    /// Expand a fractional line index in the compacted grid to the full grid.
    fn expand_line(&self, y: f64) -> f64 {
        let lines = match &self.good_lines {
            Some(lines) => lines,
            None => return y,
        };
        let last = lines.len() - 1;
        let k = (y.floor().max(0.0) as usize).min(last - 1);
        let frac = y - k as f64;
        let l0 = lines[k] as f64;
        let l1 = lines[k + 1] as f64;
        l0 + frac * (l1 - l0)
    }

    fn lookup(&self, gx: f64, gy: f64) -> (f64, f64) {
        if !(gx > -1.0 && gy > -1.0) {
            return (f64::NAN, f64::NAN);
        }
        let (gx, gy) = (gx.max(0.0) as usize, gy.max(0.0) as usize);
        if gx >= self.width || gy >= self.height {
            return (f64::NAN, f64::NAN);
        }
        let idx = gy * self.width + gx;
        (self.lon[idx], self.lat[idx])
    }

    fn interpolate(&self, cx: f64, cy: f64) -> (f64, f64) {
        if !(cx > -1.0 && cy > -1.0) {
            return (f64::NAN, f64::NAN);
        }
        let gx = cx.max(0.0) as usize;
        let gy = cy.max(0.0) as usize;
        if gx >= self.width || gy >= self.height {
            return (f64::NAN, f64::NAN);
        }

        // Longitude spread over the cell corners, ignoring missing samples
        let idx = gy * self.width + gx;
        let mut corners = vec![self.lon[idx]];
        if gx + 1 < self.width {
            corners.push(self.lon[idx + 1]);
        }
        if gy + 1 < self.height {
            corners.push(self.lon[idx + self.width]);
        }
        if gx + 1 < self.width && gy + 1 < self.height {
            corners.push(self.lon[idx + self.width + 1]);
        }
        let (min, max) = corners
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        // Cells straddling the antimeridian take the nearest sample.
        if max - min > DATELINE_SPREAD {
            return (
                nearest_interpolate(&self.lon, self.width, self.height, cx, cy),
                nearest_interpolate(&self.lat, self.width, self.height, cx, cy),
            );
        }

        (
            bilinear_interpolate(&self.lon, self.width, self.height, cx, cy),
            bilinear_interpolate(&self.lat, self.width, self.height, cx, cy),
        )
    }
}

impl Navigation for IrregularGridGeolocation {
    fn domain(&self) -> Linear2D {
        self.domain
    }

    fn to_reference(&self, x: f64, y: f64) -> (f64, f64) {
        let (gx, gy) = self.domain.value_to_grid(x, y);
        let (lon, lat) = if self.need_interp {
            let (cx, cy) = self.sub_set.grid_to_value(gx, gy);
            self.interpolate(cx, self.avoid_missing_line(cy))
        } else {
            self.lookup(gx, self.avoid_missing_line(gy.trunc()))
        };
        if lat.is_nan() || lat.abs() > 90.0 {
            return (f64::NAN, f64::NAN);
        }
        (lon, lat)
    }

    fn from_reference(&self, lon: f64, lat: f64, hint: &mut SearchHint) -> (f64, f64) {
        let lon = self.convention.normalize(lon);
        if lon.is_nan() || lat.is_nan() || lat.abs() > 90.0 {
            hint.reset();
            return (f64::NAN, f64::NAN);
        }
        let (px, py) = self.projection.forward(lon.to_radians(), lat.to_radians());
        let (gx, gy) = self.planar.locate(px, py, hint);
        if gx.is_nan() || gy.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        let gy = self.expand_line(gy);
        let (dx, dy) = self.sub_set.value_to_grid(gx, gy);
        self.domain.grid_to_value(dx, dy)
    }
}

impl PartialEq for IrregularGridGeolocation {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.width == other.width
            && self.height == other.height
            && self.convention == other.convention
            && same_samples(&self.lon, &other.lon)
            && same_samples(&self.lat, &other.lat)
    }
}

/// Element-wise equality treating NaN as equal to NaN.
fn same_samples(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{create_dateline_grid, create_lonlat_grid, mark_missing_lines};

    #[test]
    fn test_direct_lookup_when_dimensions_match() {
        let (lon, lat) = create_lonlat_grid(5, 4, (10.0, 40.0), (0.5, 0.5));
        let nav = IrregularGridGeolocation::new(
            Linear2D::indices(5, 4),
            lon,
            lat,
            5,
            4,
            LongitudeConvention::Signed180,
        )
        .unwrap();
        assert!(!nav.need_interp);
        let (lon, lat) = nav.to_reference(3.0, 2.0);
        assert_eq!((lon, lat), (11.5, 39.0));
    }

    #[test]
    fn test_interpolated_pixel() {
        let (lon, lat) = create_lonlat_grid(3, 3, (0.0, 10.0), (1.0, 1.0));
        // Dense grid with twice the resolution: pixel 1 sits halfway between samples.
        let nav = IrregularGridGeolocation::new(
            Linear2D::indices(5, 5),
            lon,
            lat,
            3,
            3,
            LongitudeConvention::Signed180,
        )
        .unwrap();
        let (lon, lat) = nav.to_reference(1.0, 3.0);
        assert!((lon - 0.5).abs() < 1e-12, "lon {}", lon);
        assert!((lat - 8.5).abs() < 1e-12, "lat {}", lat);
    }

    #[test]
    fn test_dateline_cell_uses_nearest_sample() {
        let (lon, lat) = create_dateline_grid(4, 3, 1.0);
        let corners = [179.5, -179.5];
        let nav = IrregularGridGeolocation::new(
            Linear2D::indices(7, 5),
            lon,
            lat,
            4,
            3,
            LongitudeConvention::Signed180,
        )
        .unwrap();
        // Dense x = 3.4 maps to sample column 1.7, inside the dateline cell.
        let (lon, _) = nav.to_reference(3.4, 1.0);
        assert!(
            corners.contains(&lon),
            "expected a corner longitude, got {}",
            lon
        );
    }

    #[test]
    fn test_surviving_lines_recorded() {
        let (mut lon, mut lat) = create_lonlat_grid(5, 6, (0.0, 0.0), (1.0, 1.0));
        mark_missing_lines(&mut lon, &mut lat, 5, &[2]);
        let nav = IrregularGridGeolocation::new(
            Linear2D::indices(5, 6),
            lon,
            lat,
            5,
            6,
            LongitudeConvention::Signed180,
        )
        .unwrap();
        assert_eq!(nav.surviving_lines(), Some(&[0, 1, 3, 4, 5][..]));
        assert_eq!(nav.nearest_good_line(2.0), 1.0);
        assert_eq!(nav.expand_line(2.5), 3.5);
    }

    #[test]
    fn test_too_few_lines() {
        let (mut lon, mut lat) = create_lonlat_grid(3, 3, (0.0, 0.0), (1.0, 1.0));
        mark_missing_lines(&mut lon, &mut lat, 3, &[0, 2]);
        let result = IrregularGridGeolocation::new(
            Linear2D::indices(3, 3),
            lon,
            lat,
            3,
            3,
            LongitudeConvention::Signed180,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_equality_by_domain_and_samples() {
        let (lon, lat) = create_lonlat_grid(4, 4, (0.0, 0.0), (1.0, 1.0));
        let make = |lon: Vec<f64>| {
            IrregularGridGeolocation::new(
                Linear2D::indices(8, 8),
                lon,
                lat.clone(),
                4,
                4,
                LongitudeConvention::Signed180,
            )
            .unwrap()
        };
        let a = make(lon.clone());
        let b = make(lon.clone());
        let mut shifted = lon;
        shifted[0] += 0.1;
        let c = make(shifted);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
