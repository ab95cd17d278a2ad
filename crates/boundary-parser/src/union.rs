//! Merge several boundary rings into one outline.

use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};
use tracing::debug;

use crate::error::{BoundaryError, BoundaryResult};
use crate::{BoundaryPolygon, Ring};

/// Union every ring and return the exterior of the resulting region.
///
/// Adjacent or overlapping shapes (counties of a state, sub-basins of a
/// basin) merge into one outline. If the union still has separate pieces,
/// the piece with the largest area is kept; interior holes are dropped.
pub fn union_outline(rings: &[Ring]) -> BoundaryResult<BoundaryPolygon> {
    let polygons: Vec<Polygon<f64>> = rings
        .iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| Polygon::new(LineString::from(ring.clone()), vec![]))
        .collect();

    if polygons.is_empty() {
        return Err(BoundaryError::Empty("boundary rings".to_string()));
    }

    if polygons.len() == 1 {
        let ring = exterior_points(&polygons[0]);
        return Ok(BoundaryPolygon::new(ring)?);
    }

    let merged = polygons
        .iter()
        .fold(MultiPolygon::new(vec![]), |acc, polygon| {
            acc.union(&MultiPolygon::new(vec![polygon.clone()]))
        });

    debug!(
        inputs = polygons.len(),
        pieces = merged.0.len(),
        "Merged boundary polygons"
    );

    let largest = merged
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        .ok_or_else(|| BoundaryError::Empty("union of boundary rings".to_string()))?;

    Ok(BoundaryPolygon::new(exterior_points(largest))?)
}

fn exterior_points(polygon: &Polygon<f64>) -> Vec<(f64, f64)> {
    polygon.exterior().coords().map(|c| (c.x, c.y)).collect()
}
