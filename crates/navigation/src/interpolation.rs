//! Interpolation of sample grids at fractional indices.

/// Nearest neighbor interpolation.
///
/// Returns the value of the nearest grid point, or NaN outside the grid.
pub fn nearest_interpolate(data: &[f64], width: usize, height: usize, x: f64, y: f64) -> f64 {
    if !(x > -0.5 && y > -0.5) {
        return f64::NAN;
    }
    let col = x.round() as usize;
    let row = y.round() as usize;

    if col >= width || row >= height {
        return f64::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation.
///
/// Interpolates between the four surrounding grid points. Indices on the last
/// row or column reuse the edge samples, as do integral indices. Any NaN
/// corner that carries weight gives NaN.
pub fn bilinear_interpolate(data: &[f64], width: usize, height: usize, x: f64, y: f64) -> f64 {
    if !(x >= 0.0 && y >= 0.0) || width == 0 || height == 0 {
        return f64::NAN;
    }
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    if x0 >= width || y0 >= height {
        return f64::NAN;
    }
    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    let x1 = if xf == 0.0 { x0 } else { (x0 + 1).min(width - 1) };
    let y1 = if yf == 0.0 { y0 } else { (y0 + 1).min(height - 1) };

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f64::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_interpolate() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        ];

        assert_eq!(nearest_interpolate(&data, 3, 3, 0.0, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 1.0, 1.0), 5.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.4, 0.4), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.6, 0.6), 5.0);
        assert!(nearest_interpolate(&data, 3, 3, -1.0, 0.0).is_nan());
        assert!(nearest_interpolate(&data, 3, 3, 2.6, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_interpolate() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 2.0,
            3.0, 4.0,
        ];

        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 0.0), 1.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 0.0), 2.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 1.0), 3.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 1.0), 4.0);
        assert!((bilinear_interpolate(&data, 2, 2, 0.5, 0.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bilinear_nan_corner() {
        let data = vec![1.0, f64::NAN, 3.0, 4.0];
        assert!(bilinear_interpolate(&data, 2, 2, 0.5, 0.5).is_nan());
        // Zero-weight neighbors are not consulted
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 0.5), 2.0);
        assert!(bilinear_interpolate(&data, 2, 2, f64::NAN, 0.5).is_nan());
        assert!(bilinear_interpolate(&data, 2, 2, -0.1, 0.5).is_nan());
    }
}
