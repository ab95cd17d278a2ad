//! Region boundary rings.

use crate::error::{RegionError, RegionResult};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// A closed ring of `(lon, lat)` vertices outlining a region of interest.
///
/// Built once from a boundary file and reused, unchanged, for every time
/// step. The ring is always stored closed (first vertex repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    vertices: Vec<(f64, f64)>,
}

impl BoundaryPolygon {
    /// Create a boundary from an ordered ring of vertices.
    ///
    /// An open ring is closed automatically. After closing, the ring must
    /// have at least 4 points and every coordinate must be finite.
    pub fn new(mut vertices: Vec<(f64, f64)>) -> RegionResult<Self> {
        if vertices
            .iter()
            .any(|(lon, lat)| !lon.is_finite() || !lat.is_finite())
        {
            return Err(RegionError::invalid_boundary(
                "boundary contains non-finite coordinates",
            ));
        }

        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            if first != last {
                vertices.push(first);
            }
        }

        if vertices.len() < 4 {
            return Err(RegionError::invalid_boundary(
                "boundary ring must have at least 4 points (including closing point)",
            ));
        }

        Ok(Self { vertices })
    }

    /// The closed ring of vertices.
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Number of stored vertices, including the closing point.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false for a constructed boundary; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Bounding box of the ring.
    pub fn bbox(&self) -> BoundingBox {
        // A constructed ring always has points.
        BoundingBox::from_points(self.vertices.iter().copied())
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Planar (square-degree) area from the shoelace formula.
    pub fn area_sq_degrees(&self) -> f64 {
        let twice_area: f64 = self
            .vertices
            .windows(2)
            .map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1)
            .sum();
        twice_area.abs() / 2.0
    }
}
