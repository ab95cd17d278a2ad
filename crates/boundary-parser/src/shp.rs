//! ESRI shapefile boundaries.
//!
//! Only the `.shp` geometry is read; the `.dbf` attribute table is not
//! needed. Polygon shapes contribute their outer rings. Line shapes
//! contribute each part as a ring, since boundary layers are often
//! exported as closed outlines.

use std::path::Path;

use shapefile::{PolygonRing, Shape, ShapeReader};
use tracing::debug;

use crate::error::{BoundaryError, BoundaryResult};
use crate::wkt::validate_coordinates;
use crate::Ring;

impl From<shapefile::Error> for BoundaryError {
    fn from(err: shapefile::Error) -> Self {
        match err {
            shapefile::Error::IoError(io) => BoundaryError::Io(io),
            other => BoundaryError::InvalidShapefile(other.to_string()),
        }
    }
}

/// Read every polygon and line shape of a shapefile as raw rings.
pub fn read_shapefile(path: &Path) -> BoundaryResult<Vec<Ring>> {
    let mut reader = ShapeReader::from_path(path)?;
    let mut rings = Vec::new();
    let mut skipped = 0usize;

    for shape in reader.iter_shapes() {
        match shape? {
            Shape::Polygon(polygon) => outer_rings(polygon.rings(), |p| (p.x, p.y), &mut rings)?,
            Shape::PolygonM(polygon) => outer_rings(polygon.rings(), |p| (p.x, p.y), &mut rings)?,
            Shape::PolygonZ(polygon) => outer_rings(polygon.rings(), |p| (p.x, p.y), &mut rings)?,
            Shape::Polyline(line) => {
                for part in line.parts() {
                    rings.push(to_ring(part, |p| (p.x, p.y))?);
                }
            }
            Shape::PolylineM(line) => {
                for part in line.parts() {
                    rings.push(to_ring(part, |p| (p.x, p.y))?);
                }
            }
            Shape::PolylineZ(line) => {
                for part in line.parts() {
                    rings.push(to_ring(part, |p| (p.x, p.y))?);
                }
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipping non-polygonal shapes");
    }
    if rings.is_empty() {
        return Err(BoundaryError::Empty(path.display().to_string()));
    }

    Ok(rings)
}

fn outer_rings<P>(
    polygon_rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64) + Copy,
    rings: &mut Vec<Ring>,
) -> BoundaryResult<()> {
    for ring in polygon_rings {
        if let PolygonRing::Outer(points) = ring {
            rings.push(to_ring(points, xy)?);
        }
    }
    Ok(())
}

fn to_ring<P>(points: &[P], xy: impl Fn(&P) -> (f64, f64)) -> BoundaryResult<Ring> {
    points
        .iter()
        .map(|p| {
            let (lon, lat) = xy(p);
            validate_coordinates(lon, lat)?;
            Ok((lon, lat))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, Polygon, Polyline, ShapeWriter};

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_polygon_outer_rings_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basin.shp");

        let polygon = Polygon::with_rings(vec![
            PolygonRing::Outer(points(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(points(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)])),
        ]);
        {
            let mut writer = ShapeWriter::from_path(&path).unwrap();
            writer.write_shape(&polygon).unwrap();
        }

        let rings = read_shapefile(&path).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert!(rings[0].contains(&(4.0, 4.0)));
    }

    #[test]
    fn test_polyline_parts_are_rings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.shp");

        let line = Polyline::with_parts(vec![
            points(&[(10.0, 45.0), (10.5, 45.0), (10.5, 45.5), (10.0, 45.0)]),
            points(&[(11.0, 45.0), (11.5, 45.0), (11.5, 45.5), (11.0, 45.0)]),
        ]);
        {
            let mut writer = ShapeWriter::from_path(&path).unwrap();
            writer.write_shape(&line).unwrap();
        }

        let rings = read_shapefile(&path).unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1][0], (11.0, 45.0));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projected.shp");

        // Projected metres, not degrees
        let polygon = Polygon::new(PolygonRing::Outer(points(&[
            (500000.0, 4000000.0),
            (500000.0, 4100000.0),
            (600000.0, 4100000.0),
            (500000.0, 4000000.0),
        ])));
        {
            let mut writer = ShapeWriter::from_path(&path).unwrap();
            writer.write_shape(&polygon).unwrap();
        }

        assert!(matches!(
            read_shapefile(&path),
            Err(BoundaryError::OutOfRange(_))
        ));
    }
}
