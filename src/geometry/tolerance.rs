//! Tolerance-based coordinate comparison and canonical grid keys.

use glam::{DVec2, DVec3};

/// Working precision for coordinate equality and cache keys.
pub const COORD_TOLERANCE: f64 = 1e-4;

/// Snaps a coordinate to the nearest multiple of [`COORD_TOLERANCE`].
#[inline]
pub fn quantize(value: f64) -> i64 {
    (value / COORD_TOLERANCE).round() as i64
}

/// Canonical integer key for a planar coordinate.
#[inline]
pub fn planar_key(p: DVec2) -> (i64, i64) {
    (quantize(p.x), quantize(p.y))
}

/// Integer cell holding a 3D point in a grid of tolerance-sized cells.
#[inline]
pub fn cell_key(p: DVec3) -> (i64, i64, i64) {
    (
        (p.x / COORD_TOLERANCE).floor() as i64,
        (p.y / COORD_TOLERANCE).floor() as i64,
        (p.z / COORD_TOLERANCE).floor() as i64,
    )
}

/// True when every coordinate differs by at most [`COORD_TOLERANCE`].
#[inline]
pub fn approx_eq(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() <= COORD_TOLERANCE
}
