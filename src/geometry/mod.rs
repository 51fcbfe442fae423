//! Planar triangle geometry.
//!
//! Terrain points are `glam::DVec3` values with `z` as elevation. This module
//! holds the triangle primitive and the tolerance rules used to decide when two
//! floating-point coordinates name the same place.

mod triangle;
mod tolerance;

pub use triangle::{Triangle, planar_midpoint};
pub use tolerance::{COORD_TOLERANCE, approx_eq, cell_key, planar_key, quantize};
