//! WKT `POLYGON` / `MULTIPOLYGON` parsing.

use crate::error::{BoundaryError, BoundaryResult};
use crate::Ring;

/// Parse WKT text into the exterior rings of every polygon it contains.
///
/// Accepts formats:
/// - `POLYGON((lon1 lat1, lon2 lat2, lon3 lat3, lon1 lat1))`
/// - `POLYGON((outer...),(hole...))` (holes are ignored)
/// - `MULTIPOLYGON(((ring1)),((ring2)))`
///
/// Several geometries may appear one per line.
pub fn parse_wkt(text: &str) -> BoundaryResult<Vec<Ring>> {
    let mut rings = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let upper = line.to_uppercase();
        if upper.starts_with("MULTIPOLYGON") {
            rings.extend(parse_multipolygon(line)?);
        } else if upper.starts_with("POLYGON") {
            rings.push(parse_polygon(line)?);
        } else {
            return Err(BoundaryError::InvalidWkt(
                "Expected POLYGON or MULTIPOLYGON format".to_string(),
            ));
        }
    }

    if rings.is_empty() {
        return Err(BoundaryError::Empty("WKT text".to_string()));
    }

    Ok(rings)
}

/// Parse a single WKT `POLYGON` and return its exterior ring.
pub fn parse_polygon(wkt: &str) -> BoundaryResult<Ring> {
    let body = outer_body(wkt)?;
    let rings = top_level_groups(body)?;
    let exterior = rings
        .first()
        .ok_or_else(|| BoundaryError::InvalidWkt("POLYGON has no rings".to_string()))?;
    parse_ring(exterior)
}

fn parse_multipolygon(wkt: &str) -> BoundaryResult<Vec<Ring>> {
    let body = outer_body(wkt)?;
    let polygons = top_level_groups(body)?;

    if polygons.is_empty() {
        return Err(BoundaryError::InvalidWkt(
            "MULTIPOLYGON must contain at least one polygon".to_string(),
        ));
    }

    polygons
        .iter()
        .map(|polygon| {
            let rings = top_level_groups(polygon)?;
            let exterior = rings.first().ok_or_else(|| {
                BoundaryError::InvalidWkt("MULTIPOLYGON member has no rings".to_string())
            })?;
            parse_ring(exterior)
        })
        .collect()
}

/// Text between the first `(` and the last `)`.
fn outer_body(wkt: &str) -> BoundaryResult<&str> {
    let start = wkt
        .find('(')
        .ok_or_else(|| BoundaryError::InvalidWkt("Missing opening parenthesis".to_string()))?;
    let end = wkt
        .rfind(')')
        .ok_or_else(|| BoundaryError::InvalidWkt("Missing closing parenthesis".to_string()))?;

    if end <= start {
        return Err(BoundaryError::InvalidWkt(
            "Invalid parenthesis order".to_string(),
        ));
    }

    Ok(&wkt[start + 1..end])
}

/// Contents of each parenthesised group at nesting depth one.
///
/// `"(a),(b (c))"` yields `["a", "b (c)"]`.
fn top_level_groups(text: &str) -> BoundaryResult<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = idx + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(BoundaryError::InvalidWkt(
                        "Unbalanced parentheses".to_string(),
                    ));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(&text[start..idx]);
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(BoundaryError::InvalidWkt(
            "Unbalanced parentheses".to_string(),
        ));
    }

    Ok(groups)
}

/// Parse a comma-separated list of `lon lat` pairs.
fn parse_ring(coords_str: &str) -> BoundaryResult<Ring> {
    let points = coords_str
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let parts: Vec<&str> = pair.split_whitespace().collect();
            // A trailing Z or M value is allowed and dropped.
            if parts.len() < 2 || parts.len() > 4 {
                return Err(BoundaryError::InvalidWkt(format!(
                    "Expected 'lon lat' format, got '{}'",
                    pair
                )));
            }

            let lon: f64 = parts[0]
                .parse()
                .map_err(|_| BoundaryError::InvalidCoordinate(parts[0].to_string()))?;
            let lat: f64 = parts[1]
                .parse()
                .map_err(|_| BoundaryError::InvalidCoordinate(parts[1].to_string()))?;

            validate_coordinates(lon, lat)?;
            Ok((lon, lat))
        })
        .collect::<BoundaryResult<Ring>>()?;

    if points.len() < 4 {
        return Err(BoundaryError::InvalidWkt(
            "Polygon must have at least 4 points (including closing point)".to_string(),
        ));
    }

    Ok(points)
}

/// Longitudes may be given in either -180..180 or 0..360 convention.
pub(crate) fn validate_coordinates(lon: f64, lat: f64) -> BoundaryResult<()> {
    if !(-180.0..=360.0).contains(&lon) {
        return Err(BoundaryError::OutOfRange(format!(
            "longitude {} must be between -180 and 360",
            lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(BoundaryError::OutOfRange(format!(
            "latitude {} must be between -90 and 90",
            lat
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let ring = parse_polygon("POLYGON((-120 35, -118 35, -118 36, -120 36, -120 35))").unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[1], (-118.0, 35.0));
    }

    #[test]
    fn test_parse_polygon_with_space_and_hole() {
        let ring = parse_polygon(
            "POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 2, 1 1))",
        )
        .unwrap();
        assert_eq!(ring, vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
    }

    #[test]
    fn test_parse_multipolygon() {
        let rings = parse_wkt(
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 1, 0 0)),((2 2, 3 2, 3 3, 2 3, 2 2)))",
        )
        .unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1][0], (2.0, 2.0));
    }

    #[test]
    fn test_multiple_lines() {
        let text = "# two counties\nPOLYGON((0 0, 1 0, 1 1, 0 0))\n\npolygon((5 5, 6 5, 6 6, 5 5))\n";
        let rings = parse_wkt(text).unwrap();
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn test_three_dimensional_points() {
        let ring = parse_polygon("POLYGON Z((0 0 10, 1 0 10, 1 1 10, 0 0 10))").unwrap();
        assert_eq!(ring[2], (1.0, 1.0));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            parse_wkt("POINT(0 0)"),
            Err(BoundaryError::InvalidWkt(_))
        ));
        assert!(matches!(
            parse_wkt("POLYGON((0 0, 1 0, 0 0))"),
            Err(BoundaryError::InvalidWkt(_))
        ));
        assert!(matches!(
            parse_wkt("POLYGON((0 0, 1 x, 1 1, 0 0))"),
            Err(BoundaryError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            parse_wkt("POLYGON((0 0, 1 95, 1 1, 0 0))"),
            Err(BoundaryError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_wkt("POLYGON((0 0, 1 0, 1 1, 0 0)"),
            Err(BoundaryError::InvalidWkt(_))
        ));
        assert!(matches!(parse_wkt("  \n"), Err(BoundaryError::Empty(_))));
    }
}
