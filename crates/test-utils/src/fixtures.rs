//! Common test fixtures for region-series tests.
//!
//! Constants describing the grids, boundaries and file names the tools are
//! run against.

/// Grid definitions for testing.
pub mod grid {
    /// Regular grid fixture: `rows x cols` cell centres from the origin.
    #[derive(Debug, Clone, Copy)]
    pub struct GridFixture {
        pub rows: usize,
        pub cols: usize,
        pub first_lon: f64,
        pub first_lat: f64,
        pub cell_size: f64,
    }

    impl GridFixture {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.rows * self.cols
        }

        /// Longitude of the last column centre.
        pub fn last_lon(&self) -> f64 {
            self.first_lon + (self.cols - 1) as f64 * self.cell_size
        }

        /// Latitude of the last row centre.
        pub fn last_lat(&self) -> f64 {
            self.first_lat + (self.rows - 1) as f64 * self.cell_size
        }
    }

    /// GPM IMERG global 0.1 degree grid.
    pub const GPM_GLOBAL: GridFixture = GridFixture {
        rows: 1800,
        cols: 3600,
        first_lon: -179.95,
        first_lat: -89.95,
        cell_size: 0.1,
    };

    /// Small 10x10 grid starting at the equator and prime meridian.
    pub const SIMPLE_10X10: GridFixture = GridFixture {
        rows: 10,
        cols: 10,
        first_lon: 0.05,
        first_lat: 0.05,
        cell_size: 0.1,
    };

    /// Regional grid over the southern US plains (Texas).
    pub const TEXAS: GridFixture = GridFixture {
        rows: 120,
        cols: 150,
        first_lon: -106.65,
        first_lat: 25.85,
        cell_size: 0.1,
    };
}

/// Boundary definitions for testing.
pub mod boundary {
    /// Two adjacent squares that merge into one rectangle.
    pub const ADJACENT_SQUARES_WKT: &str = "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 1, 0 0)), ((1 0, 2 0, 2 1, 1 1, 1 0)))";

    /// Boundary entirely outside `grid::SIMPLE_10X10`.
    pub const OUTSIDE_WKT: &str = "POLYGON((50 50, 51 50, 51 51, 50 51, 50 50))";

    /// GeoJSON feature around a small basin.
    pub const BASIN_GEOJSON: &str = r#"{"type": "Feature", "properties": {"name": "basin"}, "geometry": {"type": "Polygon", "coordinates": [[[-98.0, 30.0], [-97.5, 30.0], [-97.5, 30.5], [-98.0, 30.5], [-98.0, 30.0]]]}}"#;
}

/// Common time values and file names for testing.
pub mod time {
    /// Seconds since the Unix epoch for 2024-02-01T00:00:00Z.
    pub const REFERENCE_EPOCH: f64 = 1_706_745_600.0;

    /// WRF history file name and its timestamp pattern.
    pub const WRF_FILENAME: &str = "wrfout_d01_2024-02-01_06:00:00";
    pub const WRF_PATTERN: &str = "wrfout_d01_%Y-%m-%d_%H:%M:%S";

    /// WRF-Hydro channel output name and its timestamp pattern.
    pub const CHRTOUT_FILENAME: &str = "202402011200.CHRTOUT_DOMAIN1";
    pub const CHRTOUT_PATTERN: &str = "%Y%m%d%H%M.CHRTOUT_DOMAIN1";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_fixture_size() {
        assert_eq!(grid::GPM_GLOBAL.size(), 1800 * 3600);
        assert_eq!(grid::SIMPLE_10X10.size(), 100);
    }

    #[test]
    fn test_gpm_extent() {
        assert!((grid::GPM_GLOBAL.last_lon() - 179.95).abs() < 1e-9);
        assert!((grid::GPM_GLOBAL.last_lat() - 89.95).abs() < 1e-9);
    }
}
