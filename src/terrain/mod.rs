//! Terrain generation module.
//!
//! Midpoint-displacement subdivision of a seed triangle, backed by a per-run
//! height cache, assembled into a welded mesh.

mod height_cache;
mod subdivide;
mod landscape;

pub use height_cache::HeightCache;
pub use subdivide::{seed_triangle, subdivide};
pub use landscape::{GenerationStats, Landscape, generate, generate_candidates, generate_with_rng};
