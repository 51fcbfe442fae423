//! Fractal landscape generator.
//!
//! Builds a triangulated terrain by midpoint-displacement subdivision of a
//! single seed triangle, welds it into an indexed mesh and classifies it
//! against sea level for coloring.

pub mod config;
pub mod geometry;
pub mod noise;
pub mod terrain;
pub mod mesh;
pub mod elevation;
pub mod export;

pub use config::{ConfigError, LandscapeConfig, MAX_SUPPORTED_DEPTH};
pub use geometry::Triangle;
pub use noise::DisplacementModel;
pub use terrain::{HeightCache, Landscape, generate, generate_candidates, generate_with_rng};
pub use mesh::{Mesh, MeshBuilder};
pub use elevation::{ElevationBand, Granularity, classify};
