//! Integration tests for swath geolocation.

use navigation::{
    CellSearch, IrregularGridGeolocation, Navigation, NavigationError, RawGridNavigation,
    SearchHint,
};
use swath_common::{Linear2D, LongitudeConvention};
use test_utils::{
    assert_coords_approx_eq, create_dateline_grid, create_lonlat_grid, create_skewed_lonlat_grid,
    mark_missing_lines,
};

const WIDTH: usize = 9;
const HEIGHT: usize = 10;

fn swath_with_missing_lines(dense: Linear2D) -> IrregularGridGeolocation {
    let (mut lon, mut lat) =
        create_skewed_lonlat_grid(WIDTH, HEIGHT, (20.0, 45.0), (0.5, 0.4), 0.05);
    mark_missing_lines(&mut lon, &mut lat, WIDTH, &[4, 7]);
    IrregularGridGeolocation::new(dense, lon, lat, WIDTH, HEIGHT, LongitudeConvention::Signed180)
        .expect("valid swath")
}

// ============================================================================
// Missing scan lines
// ============================================================================

#[test]
fn test_missing_lines_roundtrip_on_surviving_lines() {
    let nav = swath_with_missing_lines(Linear2D::indices(WIDTH, HEIGHT));
    assert_eq!(nav.surviving_lines(), Some(&[0, 1, 2, 3, 5, 6, 8, 9][..]));

    let mut hint = SearchHint::UNKNOWN;
    for &y in &[0usize, 1, 2, 3, 5, 6, 8, 9] {
        for x in 0..WIDTH {
            let (lon, lat) = nav.to_reference(x as f64, y as f64);
            assert!(lon.is_finite() && lat.is_finite(), "pixel ({}, {})", x, y);
            let (px, py) = nav.from_reference(lon, lat, &mut hint);
            assert_coords_approx_eq!((px, py), (x as f64, y as f64), 1e-6);
        }
    }
}

#[test]
fn test_missing_line_falls_back_to_nearest_surviving_line() {
    let nav = swath_with_missing_lines(Linear2D::indices(WIDTH, HEIGHT));

    // Line 4 sits between surviving lines 3 and 5; the tie goes to line 3.
    // Line 7 sits between 6 and 8; the tie goes to line 6.
    for (missing, fallback) in [(4.0, 3.0), (7.0, 6.0)] {
        for x in 0..WIDTH {
            let x = x as f64;
            let on_missing = nav.to_reference(x, missing);
            let on_fallback = nav.to_reference(x, fallback);
            assert_eq!(on_missing, on_fallback, "x = {}, line {}", x, missing);

            let (px, py) = nav.from_reference(on_missing.0, on_missing.1, &mut SearchHint::UNKNOWN);
            assert_coords_approx_eq!((px, py), (x, fallback), 1e-6);
        }
    }
}

#[test]
fn test_missing_lines_with_interpolation() {
    // Dense grid at twice the sample resolution.
    let dense = Linear2D::indices(2 * WIDTH - 1, 2 * HEIGHT - 1);
    let nav = swath_with_missing_lines(dense);

    let mut hint = SearchHint::UNKNOWN;
    for y in [0.0, 1.0, 3.0, 5.0, 11.0, 17.0] {
        for x in [0.0, 3.0, 8.0, 15.0] {
            let (lon, lat) = nav.to_reference(x, y);
            let (px, py) = nav.from_reference(lon, lat, &mut hint);
            assert_coords_approx_eq!((px, py), (x, y), 0.05);
        }
    }
}

// ============================================================================
// Antimeridian
// ============================================================================

#[test]
fn test_dateline_cell_resolves_to_a_corner() {
    let corners = [179.0, -179.0, 179.5, -179.5];
    let lon = corners.to_vec();
    let lat = vec![10.0, 10.0, 9.0, 9.0];
    let nav = IrregularGridGeolocation::new(
        Linear2D::indices(5, 5),
        lon,
        lat,
        2,
        2,
        LongitudeConvention::Signed180,
    )
    .unwrap();

    // Pixels x < 4 fall inside the straddling cell; column 4 is its east edge.
    for y in 0..5 {
        for x in 0..4 {
            let (lon, _) = nav.to_reference(x as f64, y as f64);
            assert!(corners.contains(&lon), "blended longitude {} at ({}, {})", lon, x, y);
        }
    }
}

#[test]
fn test_inverse_across_dateline() {
    let (lon, lat) = create_dateline_grid(8, 6, 0.5);
    let nav = IrregularGridGeolocation::new(
        Linear2D::indices(8, 6),
        lon,
        lat,
        8,
        6,
        LongitudeConvention::Signed180,
    )
    .unwrap();

    let mut hint = SearchHint::UNKNOWN;
    let (west_x, west_y) = nav.from_reference(179.9, 9.0, &mut hint);
    let (east_x, east_y) = nav.from_reference(-179.9, 9.0, &mut hint);
    assert!(west_x.is_finite() && east_x.is_finite());
    assert!(west_x < east_x, "{} should be left of {}", west_x, east_x);
    assert!((west_y - east_y).abs() < 1e-6);

    // 180.1 east is the same place as 179.9 west.
    let (x360, y360) = nav.from_reference(180.1, 9.0, &mut SearchHint::UNKNOWN);
    assert_coords_approx_eq!((x360, y360), (east_x, east_y), 1e-9);
}

#[test]
fn test_unsigned_convention_grid() {
    let (lon, lat) = create_lonlat_grid(6, 6, (170.0, 0.0), (4.0, 1.0));
    let lon: Vec<f64> = lon.into_iter().map(|l| l.rem_euclid(360.0)).collect();
    let nav = IrregularGridGeolocation::new(
        Linear2D::indices(6, 6),
        lon,
        lat,
        6,
        6,
        LongitudeConvention::Unsigned360,
    )
    .unwrap();

    let (x, y) = nav.from_reference(-174.0, -2.0, &mut SearchHint::UNKNOWN);
    assert_coords_approx_eq!((x, y), (4.0, 2.0), 1e-6);
}

// ============================================================================
// Search hint
// ============================================================================

#[test]
fn test_wrong_hint_matches_no_hint() {
    let nav = swath_with_missing_lines(Linear2D::indices(WIDTH, HEIGHT));
    let (lon, lat) = nav.to_reference(6.0, 8.0);

    let (ux, uy) = nav.from_reference(lon, lat, &mut SearchHint::UNKNOWN);
    for hint in [SearchHint::at(0, 0), SearchHint::at(7, 6), SearchHint::at(3, 0)] {
        let mut hint = hint;
        let (hx, hy) = nav.from_reference(lon, lat, &mut hint);
        assert_coords_approx_eq!((hx, hy), (ux, uy), 1e-9);
    }
}

#[test]
fn test_hint_reset_on_miss() {
    let nav = swath_with_missing_lines(Linear2D::indices(WIDTH, HEIGHT));
    let mut hint = SearchHint::at(3, 3);
    let (x, y) = nav.from_reference(-60.0, -30.0, &mut hint);
    assert!(x.is_nan() && y.is_nan());
    assert!(hint.is_unknown());
}

// ============================================================================
// Batch API
// ============================================================================

#[test]
fn test_batch_length_mismatch() {
    let (lon, lat) = create_lonlat_grid(4, 4, (0.0, 0.0), (1.0, 1.0));
    let nav = RawGridNavigation::new(lat, lon, 4, 4, 1, 1).unwrap();
    let err = nav.to_reference_many(&[0.0, 1.0], &[0.0]).unwrap_err();
    assert!(matches!(err, NavigationError::LengthMismatch { first: 2, second: 1 }));
}

#[test]
fn test_batch_matches_scalar() {
    let navs: Vec<Box<dyn Navigation>> = vec![
        Box::new(swath_with_missing_lines(Linear2D::indices(WIDTH, HEIGHT))),
        {
            let (lon, lat) = create_lonlat_grid(WIDTH, HEIGHT, (100.0, 20.0), (0.25, 0.25));
            Box::new(RawGridNavigation::new(lat, lon, HEIGHT, WIDTH, 1, 1).unwrap())
        },
    ];
    for nav in &navs {
        let xs = [0.0, 2.0, 5.0, 8.0];
        let ys = [0.0, 3.0, 6.0, 9.0];
        let (lons, lats) = nav.to_reference_many(&xs, &ys).unwrap();
        for k in 0..xs.len() {
            let (lon, lat) = nav.to_reference(xs[k], ys[k]);
            assert_eq!((lons[k], lats[k]), (lon, lat));
        }
        let (px, py) = nav.from_reference_many(&lons, &lats).unwrap();
        for k in 0..xs.len() {
            assert_coords_approx_eq!((px[k], py[k]), (xs[k], ys[k]), 1e-6);
        }
    }
}

#[test]
fn test_cell_search_over_projected_grid() {
    let (lon, lat) = create_skewed_lonlat_grid(12, 12, (-10.0, 60.0), (1.0, 1.0), 0.2);
    let search = CellSearch::new(lon, lat, 12, 12).unwrap();
    let (gx, gy) = search.locate_many(&[-5.0, 0.0], &[55.0, 52.0]).unwrap();
    assert!(gx.iter().all(|v| v.is_finite()));
    assert!(gy.iter().all(|v| v.is_finite()));
}
