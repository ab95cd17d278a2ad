//! File-level tests for boundary loading.

use std::fs;

use boundary_parser::{read_boundary, BoundaryError};

#[test]
fn test_read_wkt_counties_merge_into_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.wkt");
    fs::write(
        &path,
        "POLYGON((-120 35, -119 35, -119 36, -120 36, -120 35))\n\
         POLYGON((-119 35, -118 35, -118 36, -119 36, -119 35))\n",
    )
    .unwrap();

    let outline = read_boundary(&path).unwrap();
    let bbox = outline.bbox();

    assert_eq!(bbox.min_lon, -120.0);
    assert_eq!(bbox.max_lon, -118.0);
    assert!((outline.area_sq_degrees() - 2.0).abs() < 1e-9);
}

#[test]
fn test_read_geojson_feature_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basin.geojson");
    fs::write(
        &path,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"id": 1},
             "geometry": {"type": "Polygon", "coordinates": [[[10.0, 45.0], [10.5, 45.0], [10.5, 45.5], [10.0, 45.5], [10.0, 45.0]]]}}
        ]}"#,
    )
    .unwrap();

    let outline = read_boundary(&path).unwrap();
    assert_eq!(outline.len(), 5);
    assert_eq!(outline.vertices()[0], (10.0, 45.0));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_boundary(dir.path().join("missing.wkt"));
    assert!(matches!(result, Err(BoundaryError::Io(_))));
}

#[test]
fn test_adjacent_squares_fixture_merge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pair.wkt");
    fs::write(&path, test_utils::fixtures::boundary::ADJACENT_SQUARES_WKT).unwrap();

    let outline = read_boundary(&path).unwrap();
    let bbox = outline.bbox();
    assert_eq!((bbox.min_lon, bbox.max_lon), (0.0, 2.0));
    test_utils::assert_approx_eq!(outline.area_sq_degrees(), 2.0, 1e-9);
}

#[test]
fn test_basin_feature_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basin.json");
    fs::write(&path, test_utils::fixtures::boundary::BASIN_GEOJSON).unwrap();

    let outline = read_boundary(&path).unwrap();
    test_utils::assert_approx_eq!(outline.area_sq_degrees(), 0.25, 1e-9);
}

#[test]
fn test_read_shapefile_counties_merge() {
    use shapefile::{Point, Polygon, PolygonRing, ShapeWriter};

    let square = |x0: f64| {
        Polygon::new(PolygonRing::Outer(vec![
            Point::new(x0, 35.0),
            Point::new(x0, 36.0),
            Point::new(x0 + 1.0, 36.0),
            Point::new(x0 + 1.0, 35.0),
            Point::new(x0, 35.0),
        ]))
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counties.shp");
    {
        let mut writer = ShapeWriter::from_path(&path).unwrap();
        writer.write_shape(&square(-120.0)).unwrap();
        writer.write_shape(&square(-119.0)).unwrap();
    }

    let outline = read_boundary(&path).unwrap();
    let bbox = outline.bbox();
    assert_eq!((bbox.min_lon, bbox.max_lon), (-120.0, -118.0));
    test_utils::assert_approx_eq!(outline.area_sq_degrees(), 2.0, 1e-9);
}
