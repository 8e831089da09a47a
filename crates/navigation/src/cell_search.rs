//! Inverse lookup on a quadrilateral mesh.
//!
//! Given a 2-D sample grid of coordinate pairs (for example projected x/y, or
//! latitude/longitude stored per pixel), find the fractional grid index of a
//! query point. Each cell is split into a lower triangle `(v0, v1, v2)` and an
//! upper triangle `(v1, v3, v2)`:
//!
//! ```text
//!   v0 ---- v1        v0 = (gx,   gy)     v1 = (gx+1, gy)
//!   |     / |         v2 = (gx,   gy+1)   v3 = (gx+1, gy+1)
//!   |   /   |
//!   | /     |
//!   v2 ---- v3
//! ```
//!
//! The walk tests the query against the three edges of the current triangle
//! and steps toward the failing edges until it lands in a triangle that
//! contains the point, then solves the local inverse analytically.

use crate::error::{NavigationError, NavigationResult};
use tracing::trace;

/// Last successful cell of a search, used to seed the next one.
///
/// This is a performance hint only. A stale or wrong hint never changes the
/// answer: a failed hinted search is retried once from the grid center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHint {
    x: i64,
    y: i64,
}

impl SearchHint {
    /// No previous cell; start from the grid center.
    pub const UNKNOWN: SearchHint = SearchHint { x: -1, y: -1 };

    pub fn at(x: usize, y: usize) -> Self {
        Self {
            x: x as i64,
            y: y as i64,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.x == -1 && self.y == -1
    }

    /// Cell index, if known.
    pub fn cell(&self) -> Option<(usize, usize)> {
        if self.is_unknown() {
            None
        } else {
            Some((self.x.max(0) as usize, self.y.max(0) as usize))
        }
    }

    pub fn reset(&mut self) {
        *self = Self::UNKNOWN;
    }
}

impl Default for SearchHint {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

type Vertex = (f64, f64);

#[inline]
fn sub(a: Vertex, b: Vertex) -> Vertex {
    (a.0 - b.0, a.1 - b.1)
}

#[inline]
fn cross(a: Vertex, b: Vertex) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

/// Edge test: on the edge, or on the interior side for this orientation.
#[inline]
fn passes(tval: f64, positive: bool) -> bool {
    tval == 0.0 || (tval > 0.0) == positive
}

/// Quadrilateral mesh over a row-major grid of coordinate pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSearch {
    a: Vec<f64>,
    b: Vec<f64>,
    width: usize,
    height: usize,
    positive: bool,
}

impl CellSearch {
    /// Build a mesh from two coordinate components of equal length.
    ///
    /// The winding of the mesh is taken from the first cell whose four
    /// corners are all present.
    pub fn new(a: Vec<f64>, b: Vec<f64>, width: usize, height: usize) -> NavigationResult<Self> {
        NavigationError::check_pair(a.len(), b.len())?;
        if width < 2 || height < 2 {
            return Err(NavigationError::InvalidGrid(format!(
                "cell search needs at least 2x2 samples, got {}x{}",
                width, height
            )));
        }
        if a.len() != width * height {
            return Err(NavigationError::InvalidGrid(format!(
                "expected {} samples for {}x{} grid, got {}",
                width * height,
                width,
                height,
                a.len()
            )));
        }
        let mut search = Self {
            a,
            b,
            width,
            height,
            positive: true,
        };
        search.positive = search.detect_orientation();
        Ok(search)
    }

    /// Override the detected winding.
    pub fn with_orientation(mut self, positive: bool) -> Self {
        self.positive = positive;
        self
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Upper bound on steps per walk.
    pub fn max_iterations(&self) -> usize {
        2 * (self.width + self.height)
    }

    /// Coordinate pair stored at a grid point.
    pub fn sample(&self, gx: usize, gy: usize) -> (f64, f64) {
        let idx = gy * self.width + gx;
        (self.a[idx], self.b[idx])
    }

    fn detect_orientation(&self) -> bool {
        for gy in 0..self.height - 1 {
            for gx in 0..self.width - 1 {
                if let Some([v0, v1, v2, _]) = self.corners(gx as i64, gy as i64) {
                    let winding = cross(sub(v1, v0), sub(v2, v0));
                    if winding != 0.0 {
                        return winding > 0.0;
                    }
                }
            }
        }
        true
    }

    fn corners(&self, gx: i64, gy: i64) -> Option<[Vertex; 4]> {
        let (gx, gy) = (gx as usize, gy as usize);
        let corners = [
            self.sample(gx, gy),
            self.sample(gx + 1, gy),
            self.sample(gx, gy + 1),
            self.sample(gx + 1, gy + 1),
        ];
        if corners.iter().any(|v| v.0.is_nan() || v.1.is_nan()) {
            return None;
        }
        Some(corners)
    }

    /// Find the fractional grid index `(gx, gy)` of the point `(pa, pb)`.
    ///
    /// Returns (NaN, NaN) when the point is not inside the mesh (within half a
    /// cell of its edges). `hint` seeds the walk and is updated to the cell
    /// that was found, or reset when nothing was found.
    pub fn locate(&self, pa: f64, pb: f64, hint: &mut SearchHint) -> (f64, f64) {
        if pa.is_nan() || pb.is_nan() {
            hint.reset();
            return (f64::NAN, f64::NAN);
        }

        let mut grid = match hint.cell() {
            Some(start) => {
                let grid = self.walk(pa, pb, start);
                if grid.0.is_nan() || grid.1.is_nan() {
                    trace!(?start, "Hinted search failed, retrying from center");
                    self.walk(pa, pb, self.center())
                } else {
                    grid
                }
            }
            None => self.walk(pa, pb, self.center()),
        };

        if grid.0.is_nan() || grid.1.is_nan() {
            grid = (f64::NAN, f64::NAN);
            hint.reset();
        } else {
            let hx = (grid.0.max(0.0) as usize).min(self.width - 2);
            let hy = (grid.1.max(0.0) as usize).min(self.height - 2);
            *hint = SearchHint::at(hx, hy);
        }
        grid
    }

    /// Locate many points, threading the hint from one point to the next.
    pub fn locate_many(&self, a: &[f64], b: &[f64]) -> NavigationResult<(Vec<f64>, Vec<f64>)> {
        NavigationError::check_pair(a.len(), b.len())?;
        let mut hint = SearchHint::UNKNOWN;
        Ok(a.iter()
            .zip(b)
            .map(|(&pa, &pb)| self.locate(pa, pb, &mut hint))
            .unzip())
    }

    fn center(&self) -> (usize, usize) {
        ((self.width - 1) / 2, (self.height - 1) / 2)
    }

    fn walk(&self, pa: f64, pb: f64, start: (usize, usize)) -> (f64, f64) {
        let max_gx = self.width as i64 - 2;
        let max_gy = self.height as i64 - 2;
        let mut gx = (start.0 as i64).min(max_gx);
        let mut gy = (start.1 as i64).min(max_gy);
        let pos = self.positive;
        let mut lower = true;
        let mut grid = (f64::NAN, f64::NAN);

        for _ in 0..self.max_iterations() {
            let Some([v0, v1, v2, v3]) = self.corners(gx, gy) else {
                break;
            };
            let bd = sub(v2, v1);
            let bp = (pa - v1.0, pb - v1.1);
            let dp = (pa - v2.0, pb - v2.1);
            let (ogx, ogy) = (gx, gy);

            if lower {
                let ab = sub(v1, v0);
                let da = sub(v0, v2);
                let ap = (pa - v0.0, pb - v0.1);
                let t1 = passes(cross(ab, ap), pos);
                let t2 = passes(cross(bd, bp), pos);
                let t3 = passes(cross(da, dp), pos);

                if !t1 && !t2 {
                    gx += 1;
                    gy -= 1;
                } else if !t2 && !t3 {
                    gx -= 1;
                    gy += 1;
                } else if !t1 && !t3 {
                    gx -= 1;
                    gy -= 1;
                } else if !t1 {
                    gy -= 1;
                } else if !t3 {
                    gx -= 1;
                }
                gx = gx.clamp(0, max_gx);
                gy = gy.clamp(0, max_gy);

                if gx == ogx && gy == ogy && t2 {
                    let (fx, fy) = (gx as f64, gy as f64);
                    grid.0 = ((pa - v0.0) * (v2.1 - v0.1) + (v0.1 - pb) * (v2.0 - v0.0))
                        / ((v1.0 - v0.0) * (v2.1 - v0.1) + (v0.1 - v1.1) * (v2.0 - v0.0))
                        + fx;
                    grid.1 = ((pa - v0.0) * (v1.1 - v0.1) + (v0.1 - pb) * (v1.0 - v0.0))
                        / ((v2.0 - v0.0) * (v1.1 - v0.1) + (v0.1 - v2.1) * (v1.0 - v0.0))
                        + fy;
                    break;
                }
                lower = false;
            } else {
                let bc = sub(v3, v1);
                let cd = sub(v2, v3);
                let cp = (pa - v3.0, pb - v3.1);
                let t1 = passes(cross(bc, bp), pos);
                let t2 = passes(cross(cd, cp), pos);
                let t3 = passes(-cross(bd, dp), pos);

                if !t1 && !t3 {
                    gx += 1;
                    gy -= 1;
                } else if !t2 && !t3 {
                    gx -= 1;
                    gy += 1;
                } else if !t1 && !t2 {
                    gx += 1;
                    gy += 1;
                } else if !t1 {
                    gx += 1;
                } else if !t2 {
                    gy += 1;
                }
                gx = gx.clamp(0, max_gx);
                gy = gy.clamp(0, max_gy);

                if gx == ogx && gy == ogy && t3 {
                    let (fx, fy) = (gx as f64, gy as f64);
                    grid.0 = ((v3.0 - pa) * (v1.1 - v3.1) + (pb - v3.1) * (v1.0 - v3.0))
                        / ((v2.0 - v3.0) * (v1.1 - v3.1) - (v2.1 - v3.1) * (v1.0 - v3.0))
                        + fx
                        + 1.0;
                    grid.1 = ((v2.1 - v3.1) * (v3.0 - pa) + (v2.0 - v3.0) * (pb - v3.1))
                        / ((v1.0 - v3.0) * (v2.1 - v3.1) - (v2.0 - v3.0) * (v1.1 - v3.1))
                        + fy
                        + 1.0;
                    break;
                }
                lower = true;
            }
        }

        let w = self.width as f64;
        let h = self.height as f64;
        if grid.0 >= w - 0.5 || grid.1 >= h - 0.5 || grid.0 <= -0.5 || grid.1 <= -0.5 {
            return (f64::NAN, f64::NAN);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Regular mesh where a = column * 10, b = row * 10.
    fn regular(width: usize, height: usize) -> CellSearch {
        let mut a = Vec::new();
        let mut b = Vec::new();
        for j in 0..height {
            for i in 0..width {
                a.push(i as f64 * 10.0);
                b.push(j as f64 * 10.0);
            }
        }
        CellSearch::new(a, b, width, height).unwrap()
    }

    #[test]
    fn test_locate_interior_point() {
        let search = regular(6, 5);
        let mut hint = SearchHint::UNKNOWN;
        let (gx, gy) = search.locate(23.0, 31.5, &mut hint);
        assert!((gx - 2.3).abs() < 1e-9, "gx = {}", gx);
        assert!((gy - 3.15).abs() < 1e-9, "gy = {}", gy);
        assert_eq!(hint.cell(), Some((2, 3)));
    }

    #[test]
    fn test_locate_both_triangles() {
        let search = regular(4, 4);
        for &(pa, pb) in &[(12.0, 11.0), (18.0, 17.0), (11.0, 19.0), (19.0, 11.0)] {
            let (gx, gy) = search.locate(pa, pb, &mut SearchHint::UNKNOWN);
            assert!((gx - pa / 10.0).abs() < 1e-9, "({}, {}) -> gx {}", pa, pb, gx);
            assert!((gy - pb / 10.0).abs() < 1e-9, "({}, {}) -> gy {}", pa, pb, gy);
        }
    }

    #[test]
    fn test_locate_grid_vertices() {
        let search = regular(5, 5);
        for j in 0..5 {
            for i in 0..5 {
                let (gx, gy) =
                    search.locate(i as f64 * 10.0, j as f64 * 10.0, &mut SearchHint::UNKNOWN);
                assert!((gx - i as f64).abs() < 1e-9 && (gy - j as f64).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_outside_margin_is_nan() {
        let search = regular(4, 4);
        let mut hint = SearchHint::at(1, 1);
        let (gx, gy) = search.locate(-20.0, 15.0, &mut hint);
        assert!(gx.is_nan() && gy.is_nan());
        assert!(hint.is_unknown());

        // Within half a cell of the edge is still accepted.
        let (gx, _) = search.locate(-4.0, 15.0, &mut SearchHint::UNKNOWN);
        assert!((gx + 0.4).abs() < 1e-9, "gx = {}", gx);
    }

    #[test]
    fn test_nan_corner_aborts() {
        let mut a = vec![0.0, 10.0, 0.0, 10.0];
        let b = vec![0.0, 0.0, 10.0, 10.0];
        a[3] = f64::NAN;
        let search = CellSearch::new(a, b, 2, 2).unwrap();
        let (gx, gy) = search.locate(5.0, 5.0, &mut SearchHint::UNKNOWN);
        assert!(gx.is_nan() && gy.is_nan());
    }

    #[test]
    fn test_wrong_hint_gives_same_answer() {
        let search = regular(20, 20);
        let (ux, uy) = search.locate(153.0, 27.0, &mut SearchHint::UNKNOWN);
        for hint in [SearchHint::at(0, 0), SearchHint::at(18, 18), SearchHint::at(500, 500)] {
            let mut hint = hint;
            let (hx, hy) = search.locate(153.0, 27.0, &mut hint);
            assert!((hx - ux).abs() < 1e-12 && (hy - uy).abs() < 1e-12);
            assert_eq!(hint.cell(), Some((15, 2)));
        }
    }

    #[test]
    fn test_negative_orientation() {
        // Rows run downward in b, flipping the winding.
        let mut a = Vec::new();
        let mut b = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                a.push(i as f64);
                b.push(-(j as f64));
            }
        }
        let search = CellSearch::new(a, b, 4, 4).unwrap();
        assert!(!search.is_positive());
        let (gx, gy) = search.locate(1.25, -2.5, &mut SearchHint::UNKNOWN);
        assert!((gx - 1.25).abs() < 1e-9 && (gy - 2.5).abs() < 1e-9, "({}, {})", gx, gy);
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        assert!(CellSearch::new(vec![0.0; 3], vec![0.0; 3], 3, 1).is_err());
        assert!(CellSearch::new(vec![0.0; 4], vec![0.0; 3], 2, 2).is_err());
    }
}
