//! Field-of-regard descrambling.
//!
//! Cross-track sounders observe a small square of detectors (a field of
//! regard) at once and store the detector samples in an instrument-specific
//! order. A [`ScanGeometry`] knows that order and maps every native storage
//! slot onto its place in a rectangular image, block by block.
//!
//! Two native layouts exist:
//!
//! - `Flat`: each block's detectors are contiguous, blocks in row-major
//!   order (`native = j·(W/b)·b² + i·b² + k`).
//! - `Interleaved`: the native array is already image shaped but detectors
//!   sit at permuted offsets inside each block.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use swath_common::{SwathError, SwathResult};

/// Arrays smaller than this are permuted on the calling thread.
const PARALLEL_THRESHOLD: usize = 16 * 1024;

/// How detector samples of one block are laid out in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeLayout {
    Flat,
    Interleaved,
}

/// Field-of-regard geometry of a scanning instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanGeometry {
    /// 3×3 detectors, flat storage (CrIS).
    #[serde(rename = "cris_3x3")]
    Cris3x3,
    /// 2×2 detectors, interleaved storage (IASI level 1C).
    #[serde(rename = "iasi_2x2")]
    Iasi2x2,
    /// 2×2 detectors, flat storage with the alternate detector order.
    #[serde(rename = "iasi_2x2_flat")]
    Iasi2x2Flat,
}

/// (row, column) offset in the image block of each native slot.
const CRIS_ORDER: [(usize, usize); 9] = [
    (2, 0),
    (2, 1),
    (2, 2),
    (1, 0),
    (1, 1),
    (1, 2),
    (0, 0),
    (0, 1),
    (0, 2),
];

const IASI_ORDER: [(usize, usize); 4] = [(1, 1), (0, 0), (0, 1), (1, 0)];

const IASI_FLAT_ORDER: [(usize, usize); 4] = [(0, 1), (1, 1), (1, 0), (0, 0)];

impl ScanGeometry {
    pub const ALL: [ScanGeometry; 3] = [
        ScanGeometry::Cris3x3,
        ScanGeometry::Iasi2x2,
        ScanGeometry::Iasi2x2Flat,
    ];

    /// Parse a geometry or instrument name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cris" | "cris_3x3" => Some(ScanGeometry::Cris3x3),
            "iasi" | "iasi_2x2" => Some(ScanGeometry::Iasi2x2),
            "iasi_2x2_flat" => Some(ScanGeometry::Iasi2x2Flat),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanGeometry::Cris3x3 => "cris_3x3",
            ScanGeometry::Iasi2x2 => "iasi_2x2",
            ScanGeometry::Iasi2x2Flat => "iasi_2x2_flat",
        }
    }

    /// Detectors along each side of a block.
    pub fn block(&self) -> usize {
        match self {
            ScanGeometry::Cris3x3 => 3,
            ScanGeometry::Iasi2x2 | ScanGeometry::Iasi2x2Flat => 2,
        }
    }

    /// Detectors per block.
    pub fn fovs(&self) -> usize {
        self.block() * self.block()
    }

    pub fn layout(&self) -> NativeLayout {
        match self {
            ScanGeometry::Cris3x3 | ScanGeometry::Iasi2x2Flat => NativeLayout::Flat,
            ScanGeometry::Iasi2x2 => NativeLayout::Interleaved,
        }
    }

    pub fn order(&self) -> &'static [(usize, usize)] {
        match self {
            ScanGeometry::Cris3x3 => &CRIS_ORDER,
            ScanGeometry::Iasi2x2 => &IASI_ORDER,
            ScanGeometry::Iasi2x2Flat => &IASI_FLAT_ORDER,
        }
    }

    /// Native storage index of slot `k` of block (`j`, `i`) in an image
    /// `width` pixels wide.
    #[inline]
    pub fn native_index(&self, width: usize, j: usize, i: usize, k: usize) -> usize {
        let b = self.block();
        match self.layout() {
            NativeLayout::Flat => j * (width / b * b * b) + i * b * b + k,
            NativeLayout::Interleaved => {
                let (dy, dx) = self.order()[k];
                (b * j + dy) * width + b * i + dx
            }
        }
    }

    /// Image index that slot `k` of block (`j`, `i`) is written to.
    #[inline]
    pub fn image_index(&self, width: usize, j: usize, i: usize, k: usize) -> usize {
        let b = self.block();
        let (dy, dx) = match self.layout() {
            NativeLayout::Flat => self.order()[k],
            NativeLayout::Interleaved => (k / b, k % b),
        };
        (b * j + dy) * width + b * i + dx
    }

    /// `perm[image_index] = native_index` for a `width` × `height` image.
    pub fn permutation(&self, width: usize, height: usize) -> SwathResult<Vec<usize>> {
        self.check_shape(width, height, width * height)?;
        let b = self.block();
        let mut perm = vec![0usize; width * height];
        for j in 0..height / b {
            for i in 0..width / b {
                for k in 0..b * b {
                    perm[self.image_index(width, j, i, k)] = self.native_index(width, j, i, k);
                }
            }
        }
        Ok(perm)
    }

    fn check_shape(&self, width: usize, height: usize, len: usize) -> SwathResult<()> {
        let b = self.block();
        if width == 0 || height == 0 || width % b != 0 || height % b != 0 {
            return Err(SwathError::InvalidShape(format!(
                "{}x{} image is not a whole number of {}x{} blocks",
                width, height, b, b
            )));
        }
        if len != width * height {
            return Err(SwathError::length_mismatch("scrambled samples", width * height, len));
        }
        Ok(())
    }

    /// Reorder native samples into a rectangular row-major image.
    pub fn descramble<T: Copy + Send + Sync>(
        &self,
        values: &[T],
        width: usize,
        height: usize,
    ) -> SwathResult<Vec<T>> {
        self.check_shape(width, height, values.len())?;
        let perm = self.permutation(width, height)?;
        if perm.len() < PARALLEL_THRESHOLD {
            Ok(perm.iter().map(|&n| values[n]).collect())
        } else {
            Ok(perm.par_iter().map(|&n| values[n]).collect())
        }
    }

    /// Inverse of [`descramble`](Self::descramble): back to native order.
    pub fn rescramble<T: Copy + Send + Sync>(
        &self,
        image: &[T],
        width: usize,
        height: usize,
    ) -> SwathResult<Vec<T>> {
        self.check_shape(width, height, image.len())?;
        let perm = self.permutation(width, height)?;
        let mut native = image.to_vec();
        for (img, &nat) in perm.iter().enumerate() {
            native[nat] = image[img];
        }
        Ok(native)
    }
}
