//! Bijection between n-dimensional coordinates and linear array offsets.
//!
//! The array-backed engines address their flat arrays through this mapping:
//! the first axis varies fastest, so for extents `(x, y, z)` the index of
//! coordinate `(a, b, c)` is `a + x*b + x*y*c`. Both directions validate
//! their input and reject anything outside the coordinate space.

use crate::error::{GraphError, Result};

/// Ordered tuple of per-axis extents. The product of the extents is the
/// base node count of an array-backed graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    extents: Vec<usize>,
}

impl Dimensions {
    /// Build a dimension tuple. Every extent must be non-zero and at least
    /// one axis must be present.
    pub fn new(extents: &[usize]) -> Result<Self> {
        if extents.is_empty() {
            return Err(GraphError::InvalidArgument(
                "dimension tuple must not be empty".into(),
            ));
        }
        if extents.iter().any(|&e| e == 0) {
            return Err(GraphError::InvalidArgument(
                "dimension extents must be non-zero".into(),
            ));
        }
        Ok(Self {
            extents: extents.to_vec(),
        })
    }

    /// Number of axes.
    pub fn count(&self) -> usize {
        self.extents.len()
    }

    /// Per-axis extents in order.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Size of the linear array needed to hold every coordinate: the
    /// product of all extents.
    pub fn index_length(&self) -> usize {
        self.extents.iter().product()
    }

    /// Linear offset of the given coordinate tuple.
    pub fn index_of(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.extents.len() {
            return Err(GraphError::InvalidArgument(format!(
                "expected {} coordinates, got {}",
                self.extents.len(),
                coords.len()
            )));
        }
        let mut index = 0;
        let mut stride = 1;
        for (axis, (&c, &extent)) in coords.iter().zip(self.extents.iter()).enumerate() {
            if c >= extent {
                return Err(GraphError::InvalidArgument(format!(
                    "coordinate {c} out of bounds for axis {axis} (extent {extent})"
                )));
            }
            index += stride * c;
            stride *= extent;
        }
        Ok(index)
    }

    /// Coordinate tuple of the given linear offset.
    pub fn coords_of(&self, index: usize) -> Result<Vec<usize>> {
        if index >= self.index_length() {
            return Err(GraphError::InvalidArgument(format!(
                "index {index} out of bounds (length {})",
                self.index_length()
            )));
        }
        let mut coords = vec![0; self.extents.len()];
        let mut remainder = index;
        for (c, &extent) in coords.iter_mut().zip(self.extents.iter()) {
            *c = remainder % extent;
            remainder /= extent;
        }
        Ok(coords)
    }
}
