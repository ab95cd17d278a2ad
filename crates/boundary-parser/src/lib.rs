//! Region boundary readers.
//!
//! Boundary files describe a study region as one or more polygons (a state
//! split into counties, a basin split into sub-basins). Masking needs a single
//! closed outline, so every reader here returns raw rings and
//! [`union_outline`] merges them into one [`BoundaryPolygon`].
//!
//! ```text
//! region.wkt / region.geojson / region.shp
//!      │
//!      ├─► parse_wkt / parse_geojson / read_shapefile → Vec<ring>
//!      │
//!      └─► union_outline               → BoundaryPolygon (exterior ring)
//! ```

pub mod error;
pub mod geojson;
pub mod reader;
pub mod shp;
pub mod union;
pub mod wkt;

pub use error::{BoundaryError, BoundaryResult};
pub use geojson::parse_geojson;
pub use reader::{read_boundary, BoundaryFormat};
pub use shp::read_shapefile;
pub use union::union_outline;
pub use wkt::parse_wkt;

pub use region_common::BoundaryPolygon;

/// A single ring of `(lon, lat)` points.
pub type Ring = Vec<(f64, f64)>;
