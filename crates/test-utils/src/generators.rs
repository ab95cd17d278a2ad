//! Synthetic fields and boundary rings.
//!
//! Fields are returned as row-major `Vec<f64>` with row 0 in the south, the
//! same layout every crate in the workspace uses. Rings are closed lists of
//! `(lon, lat)` vertices.

/// A field where every cell holds `value`.
pub fn constant_field(rows: usize, cols: usize, value: f64) -> Vec<f64> {
    vec![value; rows * cols]
}

/// A field whose cell value encodes its position: `row * 1000 + col`.
///
/// Makes it easy to check that orientation survives a read or transform.
///
/// ```
/// use test_utils::ramp_field;
///
/// let field = ramp_field(2, 3);
/// assert_eq!(field[0], 0.0);     // row 0, col 0
/// assert_eq!(field[2], 2.0);     // row 0, col 2
/// assert_eq!(field[3], 1000.0);  // row 1, col 0
/// ```
pub fn ramp_field(rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 1000 + col) as f64);
        }
    }
    data
}

/// A field of `value` with NaN at the given `(row, col)` cells.
pub fn field_with_nans(rows: usize, cols: usize, value: f64, nans: &[(usize, usize)]) -> Vec<f64> {
    let mut data = constant_field(rows, cols, value);
    for &(row, col) in nans {
        if row < rows && col < cols {
            data[row * cols + col] = f64::NAN;
        }
    }
    data
}

/// Sparse precipitation-like values in mm: most cells dry, some up to 50.
pub fn precipitation_field(rows: usize, cols: usize, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let hash = simple_hash(col as u32, row as u32, seed);
            let precip = if hash % 4 == 0 {
                (hash % 5000) as f64 / 100.0
            } else {
                0.0
            };
            data.push(precip);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Cell-centre axis: `first, first + step, ...` with `n` points.
pub fn axis(first: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| first + i as f64 * step).collect()
}

/// Closed axis-aligned rectangle.
pub fn square_ring(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Vec<(f64, f64)> {
    vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
        (min_lon, min_lat),
    ]
}

/// Closed rectangle with `per_side` evenly spaced vertices along each edge.
///
/// Dense sampling gives every row crossed by the rectangle a seed on both
/// edges, so the scanline fill selects the whole interior.
pub fn dense_square_ring(
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    per_side: usize,
) -> Vec<(f64, f64)> {
    let n = per_side.max(1);
    let corners = [
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
    ];

    let mut ring = Vec::with_capacity(4 * n + 1);
    for i in 0..4 {
        let (x0, y0) = corners[i];
        let (x1, y1) = corners[(i + 1) % 4];
        for k in 0..n {
            let t = k as f64 / n as f64;
            ring.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
        }
    }
    ring.push(corners[0]);
    ring
}

/// Closed diamond centred on `(lon, lat)` with the given half-diagonal.
pub fn diamond_ring(lon: f64, lat: f64, radius: f64) -> Vec<(f64, f64)> {
    vec![
        (lon, lat - radius),
        (lon + radius, lat),
        (lon, lat + radius),
        (lon - radius, lat),
        (lon, lat - radius),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_field_layout() {
        let field = ramp_field(3, 4);
        assert_eq!(field.len(), 12);
        assert_eq!(field[4 + 2], 1002.0);
        assert_eq!(field[11], 2003.0);
    }

    #[test]
    fn test_field_with_nans() {
        let field = field_with_nans(2, 2, 1.0, &[(1, 0), (5, 5)]);
        assert!(field[2].is_nan());
        assert_eq!(field.iter().filter(|v| v.is_nan()).count(), 1);
    }

    #[test]
    fn test_precipitation_deterministic() {
        let a = precipitation_field(20, 20, 7);
        let b = precipitation_field(20, 20, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0.0..=50.0).contains(&v)));
        assert!(a.iter().any(|&v| v == 0.0));
    }

    #[test]
    fn test_axis() {
        let lon = axis(-179.95, 0.1, 3);
        assert_eq!(lon.len(), 3);
        assert!((lon[2] - -179.75).abs() < 1e-9);
    }

    #[test]
    fn test_rings_are_closed() {
        for ring in [
            square_ring(0.0, 0.0, 1.0, 1.0),
            dense_square_ring(0.0, 0.0, 1.0, 1.0, 5),
            diamond_ring(0.0, 0.0, 1.0),
        ] {
            assert_eq!(ring.first(), ring.last());
            assert!(ring.len() >= 5);
        }
        assert_eq!(dense_square_ring(0.0, 0.0, 1.0, 1.0, 5).len(), 21);
    }
}
