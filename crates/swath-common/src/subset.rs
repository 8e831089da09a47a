//! Subset requests: named-dimension `[start, stop, stride]` selections.
//!
//! A subset is consumed read-only. Operations that need a different view of
//! the request (block alignment, native-storage coordinates) always build a
//! new `SubsetRequest` and leave the caller's value untouched.

use crate::error::{SwathError, SwathResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive `[start, stop]` range with a stride, in index units.
///
/// Serialized as a 3-element array to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct DimRange {
    pub start: f64,
    pub stop: f64,
    pub stride: f64,
}

impl DimRange {
    pub fn new(start: f64, stop: f64, stride: f64) -> Self {
        Self {
            start,
            stop,
            stride,
        }
    }

    /// Range covering `0..len` with unit stride.
    pub fn full(len: usize) -> Self {
        Self::new(0.0, len.saturating_sub(1) as f64, 1.0)
    }

    /// Number of samples selected by this range.
    pub fn count(&self) -> usize {
        if self.stop < self.start || self.stride <= 0.0 {
            return 0;
        }
        ((self.stop - self.start) / self.stride).floor() as usize + 1
    }

    fn validate(&self, dim: &str) -> SwathResult<()> {
        if !(self.start.is_finite() && self.stop.is_finite() && self.stride.is_finite()) {
            return Err(SwathError::InvalidRange {
                dim: dim.to_string(),
                message: "non-finite bound".to_string(),
            });
        }
        if self.start < 0.0 {
            return Err(SwathError::InvalidRange {
                dim: dim.to_string(),
                message: format!("negative start {}", self.start),
            });
        }
        if self.stop < self.start {
            return Err(SwathError::InvalidRange {
                dim: dim.to_string(),
                message: format!("stop {} before start {}", self.stop, self.start),
            });
        }
        if self.stride < 1.0 {
            return Err(SwathError::InvalidRange {
                dim: dim.to_string(),
                message: format!("stride {} must be >= 1", self.stride),
            });
        }
        Ok(())
    }
}

impl From<[f64; 3]> for DimRange {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<DimRange> for [f64; 3] {
    fn from(r: DimRange) -> Self {
        [r.start, r.stop, r.stride]
    }
}

/// Mapping from dimension name to selected range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsetRequest {
    dims: BTreeMap<String, DimRange>,
}

impl SubsetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, dim: impl Into<String>, range: DimRange) -> Self {
        self.dims.insert(dim.into(), range);
        self
    }

    pub fn insert(&mut self, dim: impl Into<String>, range: DimRange) {
        self.dims.insert(dim.into(), range);
    }

    /// Look up a dimension; a missing dimension is a caller defect.
    pub fn get(&self, dim: &str) -> SwathResult<&DimRange> {
        self.dims
            .get(dim)
            .ok_or_else(|| SwathError::MissingDimension(dim.to_string()))
    }

    pub fn contains(&self, dim: &str) -> bool {
        self.dims.contains_key(dim)
    }

    pub fn dims(&self) -> impl Iterator<Item = (&str, &DimRange)> {
        self.dims.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Number of samples selected along `dim`.
    pub fn count(&self, dim: &str) -> SwathResult<usize> {
        Ok(self.get(dim)?.count())
    }

    /// Convert to reader `(start, count, stride)` vectors in the given dimension order.
    pub fn to_reader_args(
        &self,
        order: &[&str],
    ) -> SwathResult<(Vec<usize>, Vec<usize>, Vec<usize>)> {
        if order.len() != self.dims.len() {
            return Err(SwathError::length_mismatch(
                "subset dimensionality",
                order.len(),
                self.dims.len(),
            ));
        }
        let mut start = Vec::with_capacity(order.len());
        let mut count = Vec::with_capacity(order.len());
        let mut stride = Vec::with_capacity(order.len());
        for dim in order {
            let range = self.get(dim)?;
            range.validate(dim)?;
            start.push(range.start as usize);
            count.push(range.count());
            stride.push(range.stride as usize);
        }
        Ok((start, count, stride))
    }

    /// Expand the two spatial dimensions to whole field-of-regard blocks.
    ///
    /// `image_lengths` are the rectangular (descrambled) lengths of the track
    /// and cross-track dimensions. Starts are rounded down and stops rounded
    /// up to block boundaries; stops are clamped to the last complete block.
    /// The returned `display` subset is in rectangular image coordinates, the
    /// `native` subset in storage coordinates with `fov_dim` selecting every
    /// detector of the block.
    pub fn align_to_blocks(
        &self,
        spatial_dims: [&str; 2],
        fov_dim: &str,
        block: usize,
        image_lengths: [usize; 2],
    ) -> SwathResult<BlockAlignedSubset> {
        if block == 0 {
            return Err(SwathError::InvalidShape("block size must be positive".to_string()));
        }
        let mut display = self.clone();
        let mut native = self.clone();
        let b = block as f64;

        for (dim, len) in spatial_dims.iter().zip(image_lengths) {
            let range = self.get(dim)?;
            range.validate(dim)?;

            let full_blocks = len / block;
            if full_blocks == 0 {
                return Err(SwathError::InvalidRange {
                    dim: dim.to_string(),
                    message: format!("length {} shorter than one {}-block", len, block),
                });
            }
            let last_stop = (full_blocks * block - 1) as f64;

            let start = b * (range.start / b).floor();
            let stop = (b * ((range.stop + 1.0) / b).ceil() - 1.0).min(last_stop);
            if stop < start {
                return Err(SwathError::InvalidRange {
                    dim: dim.to_string(),
                    message: format!("[{}, {}] lies outside complete blocks", range.start, range.stop),
                });
            }

            display.insert(*dim, DimRange::new(start, stop, 1.0));
            native.insert(*dim, DimRange::new(start / b, (stop + 1.0) / b - 1.0, 1.0));
        }
        native.insert(fov_dim, DimRange::new(0.0, (block * block - 1) as f64, 1.0));

        Ok(BlockAlignedSubset {
            display,
            native,
            block,
        })
    }
}

/// Result of aligning a subset to instrument blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockAlignedSubset {
    /// Rectangular image coordinates, used for geolocation and output shape.
    pub display: SubsetRequest,
    /// Native storage coordinates, used for reading raw samples.
    pub native: SubsetRequest,
    pub block: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(track: [f64; 3], xtrack: [f64; 3]) -> SubsetRequest {
        SubsetRequest::new()
            .with("Track", track.into())
            .with("XTrack", xtrack.into())
    }

    #[test]
    fn test_count() {
        assert_eq!(DimRange::new(0.0, 9.0, 1.0).count(), 10);
        assert_eq!(DimRange::new(0.0, 9.0, 2.0).count(), 5);
        assert_eq!(DimRange::new(3.0, 3.0, 1.0).count(), 1);
        assert_eq!(DimRange::new(5.0, 3.0, 1.0).count(), 0);
    }

    #[test]
    fn test_wire_format_roundtrip() {
        let subset = request([0.0, 44.0, 1.0], [3.0, 29.0, 2.0]);
        let json = serde_json::to_string(&subset).unwrap();
        assert_eq!(json, r#"{"Track":[0.0,44.0,1.0],"XTrack":[3.0,29.0,2.0]}"#);

        let back: SubsetRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subset);
    }

    #[test]
    fn test_missing_dimension_is_error() {
        let subset = request([0.0, 1.0, 1.0], [0.0, 1.0, 1.0]);
        let err = subset.get("Channel").unwrap_err();
        assert!(matches!(err, SwathError::MissingDimension(d) if d == "Channel"));
    }

    #[test]
    fn test_reader_args_order() {
        let subset = request([2.0, 11.0, 3.0], [0.0, 29.0, 1.0]);
        let (start, count, stride) = subset.to_reader_args(&["XTrack", "Track"]).unwrap();
        assert_eq!(start, vec![0, 2]);
        assert_eq!(count, vec![30, 4]);
        assert_eq!(stride, vec![1, 3]);
    }

    #[test]
    fn test_reader_args_dimensionality_mismatch() {
        let subset = request([0.0, 1.0, 1.0], [0.0, 1.0, 1.0]);
        assert!(subset.to_reader_args(&["Track"]).is_err());
    }

    #[test]
    fn test_align_rounds_outward() {
        let subset = request([4.0, 10.0, 1.0], [1.0, 7.0, 1.0]);
        let aligned = subset
            .align_to_blocks(["Track", "XTrack"], "FOV", 3, [90, 90])
            .unwrap();

        assert_eq!(*aligned.display.get("Track").unwrap(), DimRange::new(3.0, 11.0, 1.0));
        assert_eq!(*aligned.display.get("XTrack").unwrap(), DimRange::new(0.0, 8.0, 1.0));
        assert_eq!(*aligned.native.get("Track").unwrap(), DimRange::new(1.0, 3.0, 1.0));
        assert_eq!(*aligned.native.get("XTrack").unwrap(), DimRange::new(0.0, 2.0, 1.0));
        assert_eq!(*aligned.native.get("FOV").unwrap(), DimRange::new(0.0, 8.0, 1.0));
        assert!(!aligned.display.contains("FOV"));
    }

    #[test]
    fn test_align_does_not_mutate_caller() {
        let subset = request([4.0, 10.0, 2.0], [1.0, 7.0, 1.0]);
        let before = subset.clone();
        let _ = subset
            .align_to_blocks(["Track", "XTrack"], "FOV", 2, [40, 40])
            .unwrap();
        assert_eq!(subset, before);
    }

    #[test]
    fn test_align_clamps_to_complete_blocks() {
        let subset = request([0.0, 29.0, 1.0], [25.0, 29.0, 1.0]);
        // 29 rows hold 9 complete 3-blocks (rows 0..=26).
        let aligned = subset
            .align_to_blocks(["Track", "XTrack"], "FOV", 3, [29, 29])
            .unwrap();
        assert_eq!(aligned.display.get("Track").unwrap().stop, 26.0);
        assert_eq!(aligned.native.get("Track").unwrap().stop, 8.0);
        assert_eq!(*aligned.display.get("XTrack").unwrap(), DimRange::new(24.0, 26.0, 1.0));
    }

    #[test]
    fn test_align_rejects_range_past_last_block() {
        let subset = request([28.0, 28.0, 1.0], [0.0, 5.0, 1.0]);
        assert!(subset
            .align_to_blocks(["Track", "XTrack"], "FOV", 3, [29, 29])
            .is_err());
    }
}
