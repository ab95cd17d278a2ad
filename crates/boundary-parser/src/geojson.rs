//! GeoJSON boundary parsing.
//!
//! Only the geometry is read; feature properties are ignored. Line geometries
//! are treated as rings, since boundary layers exported from line shapefiles
//! describe each outline as a (usually closed) line.

use serde::Deserialize;
use tracing::debug;

use crate::error::{BoundaryError, BoundaryResult};
use crate::wkt::validate_coordinates;
use crate::Ring;

/// A GeoJSON position: `[lon, lat]` with an optional elevation.
type Position = Vec<f64>;

/// The subset of GeoJSON object types a boundary file may contain.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonObject {
    FeatureCollection {
        features: Vec<GeoJsonObject>,
    },
    Feature {
        geometry: Option<Box<GeoJsonObject>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonObject>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Parse GeoJSON text into the exterior rings of every polygon it contains.
pub fn parse_geojson(text: &str) -> BoundaryResult<Vec<Ring>> {
    let object: GeoJsonObject = serde_json::from_str(text)?;

    let mut rings = Vec::new();
    collect_rings(object, &mut rings)?;

    if rings.is_empty() {
        return Err(BoundaryError::Empty("GeoJSON document".to_string()));
    }

    Ok(rings)
}

fn collect_rings(object: GeoJsonObject, rings: &mut Vec<Ring>) -> BoundaryResult<()> {
    match object {
        GeoJsonObject::FeatureCollection { features } => {
            for feature in features {
                collect_rings(feature, rings)?;
            }
        }
        GeoJsonObject::Feature { geometry } => match geometry {
            Some(geometry) => collect_rings(*geometry, rings)?,
            None => debug!("Skipping feature without geometry"),
        },
        GeoJsonObject::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_rings(geometry, rings)?;
            }
        }
        GeoJsonObject::Polygon { coordinates } => {
            if let Some(exterior) = coordinates.first() {
                rings.push(to_ring(exterior)?);
            }
        }
        GeoJsonObject::MultiPolygon { coordinates } => {
            for polygon in &coordinates {
                if let Some(exterior) = polygon.first() {
                    rings.push(to_ring(exterior)?);
                }
            }
        }
        GeoJsonObject::LineString { coordinates } => {
            rings.push(to_ring(&coordinates)?);
        }
        GeoJsonObject::MultiLineString { coordinates } => {
            for line in &coordinates {
                rings.push(to_ring(line)?);
            }
        }
        GeoJsonObject::Unsupported => debug!("Skipping non-polygonal GeoJSON geometry"),
    }
    Ok(())
}

fn to_ring(positions: &[Position]) -> BoundaryResult<Ring> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => {
                validate_coordinates(*lon, *lat)?;
                Ok((*lon, *lat))
            }
            _ => Err(BoundaryError::InvalidGeoJson(format!(
                "position must have at least 2 values, got {}",
                position.len()
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"NAME": "A"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "B"},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[2, 2], [3, 2], [3, 3], [2, 2]]],
                            [[[5, 5], [6, 5], [6, 6], [5, 5]], [[5.2, 5.1], [5.3, 5.1], [5.3, 5.2], [5.2, 5.1]]]
                        ]
                    }
                },
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [9, 9]}}
            ]
        }"#;

        let rings = parse_geojson(text).unwrap();
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[2][0], (5.0, 5.0));
    }

    #[test]
    fn test_bare_polygon_with_elevation() {
        let text = r#"{"type": "Polygon", "coordinates": [[[0, 0, 100], [1, 0, 100], [1, 1, 100], [0, 0, 100]]]}"#;
        let rings = parse_geojson(text).unwrap();
        assert_eq!(rings[0][1], (1.0, 0.0));
    }

    #[test]
    fn test_line_string_is_ring() {
        let text = r#"{"type": "LineString", "coordinates": [[0, 0], [1, 0], [1, 1], [0, 1]]}"#;
        let rings = parse_geojson(text).unwrap();
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_geojson("{not json"),
            Err(BoundaryError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            parse_geojson(r#"{"type": "Point", "coordinates": [0, 0]}"#),
            Err(BoundaryError::Empty(_))
        ));
        assert!(matches!(
            parse_geojson(r#"{"type": "Polygon", "coordinates": [[[0], [1, 0], [1, 1], [0, 0]]]}"#),
            Err(BoundaryError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            parse_geojson(r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 99], [1, 1], [0, 0]]]}"#),
            Err(BoundaryError::OutOfRange(_))
        ));
    }
}
