//! Synthetic swath data generators.
//!
//! These generators create predictable, verifiable earth-coordinate grids and
//! raw count arrays that can be used across the test suite. All grids are
//! row-major with x (cross-track) varying fastest.

/// Creates a sequence grid where each value equals its flat index.
///
/// Useful for checking permutations: after reordering, each value tells you
/// exactly where it came from.
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[5], 5.0);
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f32> {
    (0..width * height).map(|i| i as f32).collect()
}

/// Creates a regular longitude/latitude grid.
///
/// Longitude increases with column and latitude decreases with row (north-up
/// scan order).
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `origin` - (lon, lat) of the first sample
/// * `step` - (dlon, dlat) spacing in degrees
///
/// # Returns
///
/// `(lon, lat)` vectors of length `width * height`.
pub fn create_lonlat_grid(
    width: usize,
    height: usize,
    origin: (f64, f64),
    step: (f64, f64),
) -> (Vec<f64>, Vec<f64>) {
    create_skewed_lonlat_grid(width, height, origin, step, 0.0)
}

/// Creates a sheared longitude/latitude grid, similar to a polar-orbiter swath
/// whose scan lines are not aligned with parallels.
///
/// Longitude is wrapped into [-180, 180).
pub fn create_skewed_lonlat_grid(
    width: usize,
    height: usize,
    origin: (f64, f64),
    step: (f64, f64),
    shear: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut lon = Vec::with_capacity(width * height);
    let mut lat = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = origin.0 + col as f64 * step.0 + row as f64 * shear;
            let y = origin.1 - row as f64 * step.1 + col as f64 * shear * 0.5;
            lon.push(wrap_longitude(x));
            lat.push(y);
        }
    }
    (lon, lat)
}

/// Creates a small grid straddling the antimeridian.
///
/// Columns run from 179 east through 180 to 179 west, so naive bilinear
/// blending across the middle column pair would average to about zero.
pub fn create_dateline_grid(width: usize, height: usize, step: f64) -> (Vec<f64>, Vec<f64>) {
    let start = 180.0 - step * (width / 2) as f64 + step * 0.5;
    create_lonlat_grid(width, height, (start, 10.0), (step, step))
}

/// Marks whole scan lines as missing by filling them with NaN.
pub fn mark_missing_lines(lon: &mut [f64], lat: &mut [f64], width: usize, lines: &[usize]) {
    for &line in lines {
        let start = line * width;
        let end = (start + width).min(lon.len());
        for idx in start..end {
            lon[idx] = f64::NAN;
            lat[idx] = f64::NAN;
        }
    }
}

/// Creates a ramp of raw counts from `min` to `max` (inclusive).
pub fn create_count_ramp(len: usize, min: i32, max: i32) -> Vec<i32> {
    if len <= 1 {
        return vec![min; len];
    }
    let span = (max - min) as f64;
    (0..len)
        .map(|i| min + (span * i as f64 / (len - 1) as f64).round() as i32)
        .collect()
}

/// Creates radiance-like values in a realistic infrared range.
///
/// Values span roughly 20 to 140 mW/(m²·sr·cm⁻¹).
pub fn create_radiance_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            data.push(20.0 + x_factor * 60.0 + y_factor * 60.0);
        }
    }
    data
}

fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
