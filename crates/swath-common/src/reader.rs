//! Reader collaborator interface.
//!
//! The core never opens files. Instead, it asks a `MultiDimensionReader` for
//! typed hyperslabs by array name and `(start, count, stride)`. `MemoryReader`
//! is an in-memory implementation used by tests and the command-line tool.

use crate::error::{SwathError, SwathResult};
use std::collections::HashMap;

/// Typed array returned by a reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float(Vec<f32>),
    Double(Vec<f64>),
    Int(Vec<i32>),
    Short(Vec<i16>),
    Byte(Vec<i8>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float(v) => v.len(),
            ArrayData::Double(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Byte(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayData::Float(_) => "float",
            ArrayData::Double(_) => "double",
            ArrayData::Int(_) => "int",
            ArrayData::Short(_) => "short",
            ArrayData::Byte(_) => "byte",
        }
    }

    /// Widen every element to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            ArrayData::Float(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::Double(v) => v.clone(),
            ArrayData::Int(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::Short(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::Byte(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    /// Element `idx` widened to f64.
    pub fn get_f64(&self, idx: usize) -> Option<f64> {
        match self {
            ArrayData::Float(v) => v.get(idx).map(|&x| x as f64),
            ArrayData::Double(v) => v.get(idx).copied(),
            ArrayData::Int(v) => v.get(idx).map(|&x| x as f64),
            ArrayData::Short(v) => v.get(idx).map(|&x| x as f64),
            ArrayData::Byte(v) => v.get(idx).map(|&x| x as f64),
        }
    }

    fn gather(&self, indices: &[usize]) -> ArrayData {
        fn pick<T: Copy>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| v[i]).collect()
        }
        match self {
            ArrayData::Float(v) => ArrayData::Float(pick(v, indices)),
            ArrayData::Double(v) => ArrayData::Double(pick(v, indices)),
            ArrayData::Int(v) => ArrayData::Int(pick(v, indices)),
            ArrayData::Short(v) => ArrayData::Short(pick(v, indices)),
            ArrayData::Byte(v) => ArrayData::Byte(pick(v, indices)),
        }
    }
}

/// Source of typed multi-dimensional arrays.
pub trait MultiDimensionReader {
    /// Read a strided hyperslab of a named array.
    fn read_array(
        &self,
        name: &str,
        start: &[usize],
        count: &[usize],
        stride: &[usize],
    ) -> SwathResult<ArrayData>;

    /// Read a global (file-level) attribute.
    fn read_global_attribute(&self, name: &str) -> SwathResult<ArrayData>;

    /// Lengths of each dimension of a named array.
    fn dimension_lengths(&self, name: &str) -> SwathResult<Vec<usize>>;

    /// Read an array and require 32-bit integer storage.
    fn read_int_array(
        &self,
        name: &str,
        start: &[usize],
        count: &[usize],
        stride: &[usize],
    ) -> SwathResult<Vec<i32>> {
        match self.read_array(name, start, count, stride)? {
            ArrayData::Int(v) => Ok(v),
            other => Err(SwathError::ReadError {
                name: name.to_string(),
                message: format!("expected int array, found {}", other.type_name()),
            }),
        }
    }

    /// Read an array and require 16-bit integer storage.
    fn read_short_array(
        &self,
        name: &str,
        start: &[usize],
        count: &[usize],
        stride: &[usize],
    ) -> SwathResult<Vec<i16>> {
        match self.read_array(name, start, count, stride)? {
            ArrayData::Short(v) => Ok(v),
            other => Err(SwathError::ReadError {
                name: name.to_string(),
                message: format!("expected short array, found {}", other.type_name()),
            }),
        }
    }

    /// Read an array of any numeric type, widened to f32.
    fn read_float_array(
        &self,
        name: &str,
        start: &[usize],
        count: &[usize],
        stride: &[usize],
    ) -> SwathResult<Vec<f32>> {
        match self.read_array(name, start, count, stride)? {
            ArrayData::Float(v) => Ok(v),
            other => Ok(other.to_f64_vec().into_iter().map(|x| x as f32).collect()),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredArray {
    shape: Vec<usize>,
    data: ArrayData,
}

/// In-memory reader holding row-major arrays and global attributes.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    arrays: HashMap<String, StoredArray>,
    attributes: HashMap<String, ArrayData>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a row-major array with the given shape.
    pub fn insert_array(
        &mut self,
        name: impl Into<String>,
        shape: Vec<usize>,
        data: ArrayData,
    ) -> SwathResult<()> {
        let name = name.into();
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(SwathError::length_mismatch(
                format!("array '{}'", name),
                expected,
                data.len(),
            ));
        }
        self.arrays.insert(name, StoredArray { shape, data });
        Ok(())
    }

    /// Builder-style `insert_array` for fixtures; panics on shape mismatch.
    pub fn with_array(mut self, name: &str, shape: Vec<usize>, data: ArrayData) -> Self {
        if let Err(e) = self.insert_array(name, shape, data) {
            panic!("invalid fixture array: {}", e);
        }
        self
    }

    pub fn insert_attribute(&mut self, name: impl Into<String>, data: ArrayData) {
        self.attributes.insert(name.into(), data);
    }

    fn lookup(&self, name: &str) -> SwathResult<&StoredArray> {
        self.arrays
            .get(name)
            .ok_or_else(|| SwathError::ArrayNotFound(name.to_string()))
    }
}

impl MultiDimensionReader for MemoryReader {
    fn read_array(
        &self,
        name: &str,
        start: &[usize],
        count: &[usize],
        stride: &[usize],
    ) -> SwathResult<ArrayData> {
        let stored = self.lookup(name)?;
        let rank = stored.shape.len();
        if start.len() != rank || count.len() != rank || stride.len() != rank {
            return Err(SwathError::ReadError {
                name: name.to_string(),
                message: format!(
                    "rank {} but got start/count/stride of length {}/{}/{}",
                    rank,
                    start.len(),
                    count.len(),
                    stride.len()
                ),
            });
        }
        for d in 0..rank {
            if stride[d] == 0 || count[d] == 0 {
                return Err(SwathError::ReadError {
                    name: name.to_string(),
                    message: format!("zero count or stride in dimension {}", d),
                });
            }
            let last = start[d] + (count[d] - 1) * stride[d];
            if last >= stored.shape[d] {
                return Err(SwathError::ReadError {
                    name: name.to_string(),
                    message: format!(
                        "dimension {} index {} out of bounds (length {})",
                        d, last, stored.shape[d]
                    ),
                });
            }
        }

        // Row-major strides of the stored array.
        let mut dim_stride = vec![1usize; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            dim_stride[d] = dim_stride[d + 1] * stored.shape[d + 1];
        }

        let total: usize = count.iter().product();
        let mut indices = Vec::with_capacity(total);
        let mut counter = vec![0usize; rank];
        for _ in 0..total {
            let flat: usize = (0..rank)
                .map(|d| (start[d] + counter[d] * stride[d]) * dim_stride[d])
                .sum();
            indices.push(flat);
            for d in (0..rank).rev() {
                counter[d] += 1;
                if counter[d] < count[d] {
                    break;
                }
                counter[d] = 0;
            }
        }

        Ok(stored.data.gather(&indices))
    }

    fn read_global_attribute(&self, name: &str) -> SwathResult<ArrayData> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| SwathError::ArrayNotFound(name.to_string()))
    }

    fn dimension_lengths(&self, name: &str) -> SwathResult<Vec<usize>> {
        Ok(self.lookup(name)?.shape.clone())
    }
}
