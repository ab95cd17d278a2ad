//! Boundary file loading.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{BoundaryError, BoundaryResult};
use crate::shp::read_shapefile;
use crate::{parse_geojson, parse_wkt, union_outline, BoundaryPolygon, Ring};

/// On-disk boundary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryFormat {
    Wkt,
    GeoJson,
    Shapefile,
}

impl BoundaryFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> BoundaryResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "wkt" | "txt" => Ok(Self::Wkt),
            "geojson" | "json" => Ok(Self::GeoJson),
            "shp" => Ok(Self::Shapefile),
            _ => Err(BoundaryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Read the raw rings of a boundary file in this format.
    pub fn read_rings(&self, path: &Path) -> BoundaryResult<Vec<Ring>> {
        match self {
            Self::Wkt => parse_wkt(&fs::read_to_string(path)?),
            Self::GeoJson => parse_geojson(&fs::read_to_string(path)?),
            Self::Shapefile => read_shapefile(path),
        }
    }
}

/// Read a boundary file and merge all of its shapes into one outline.
pub fn read_boundary(path: impl AsRef<Path>) -> BoundaryResult<BoundaryPolygon> {
    let path = path.as_ref();
    let format = BoundaryFormat::from_path(path)?;
    let rings = format.read_rings(path)?;
    let outline = union_outline(&rings)?;

    info!(
        path = %path.display(),
        shapes = rings.len(),
        vertices = outline.len(),
        "Loaded region boundary"
    );

    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            BoundaryFormat::from_path(Path::new("a/region.WKT")).unwrap(),
            BoundaryFormat::Wkt
        );
        assert_eq!(
            BoundaryFormat::from_path(Path::new("region.geojson")).unwrap(),
            BoundaryFormat::GeoJson
        );
        assert_eq!(
            BoundaryFormat::from_path(Path::new("counties.SHP")).unwrap(),
            BoundaryFormat::Shapefile
        );
        assert!(matches!(
            BoundaryFormat::from_path(Path::new("region.kml")),
            Err(BoundaryError::UnsupportedFormat(_))
        ));
        assert!(BoundaryFormat::from_path(Path::new("region")).is_err());
    }
}
