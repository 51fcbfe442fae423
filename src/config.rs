//! Generation parameters and their validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::COORD_TOLERANCE;

/// Deepest subdivision accepted; 4^10 triangles is already about a million.
///
/// Depth is also bounded by key precision: see [`MIN_GRID_SPACING`].
pub const MAX_SUPPORTED_DEPTH: u32 = 10;

/// Smallest accepted distance between neighbouring grid vertices.
///
/// Cache keys and vertex welding both work on the absolute `COORD_TOLERANCE`
/// grid, so the finest subdivision must stay well clear of it or distinct
/// midpoints start sharing keys.
pub const MIN_GRID_SPACING: f64 = 10.0 * COORD_TOLERANCE;

/// Largest accepted footprint half-width. Beyond this `f64` coordinates lose
/// the 1e-4 resolution the keys rely on.
pub const MAX_EXTENT: f64 = 1.0e6;

/// Reasons a configuration is rejected before generation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Subdivision depth must be nonnegative, got {0}")]
    NegativeDepth(i64),
    #[error("Subdivision depth {0} exceeds the supported maximum of {max}", max = MAX_SUPPORTED_DEPTH)]
    DepthTooLarge(u64),
    #[error("Parameter '{0}' must be finite, got {1}")]
    NonFinite(&'static str, f64),
    #[error("Displacement factor must not be negative, got {0}")]
    NegativeDisplacement(f64),
    #[error("Footprint extent must be finite and in (0, {max}], got {0}", max = MAX_EXTENT)]
    InvalidExtent(f64),
    #[error(
        "Grid spacing {spacing} at depth {depth} is below the minimum of {min}; raise the extent or lower the depth",
        min = MIN_GRID_SPACING
    )]
    SpacingBelowTolerance { depth: u32, spacing: f64 },
    #[error("Height scale must be finite and positive, got {0}")]
    InvalidHeightScale(f64),
}

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Parameters for one landscape generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Number of subdivision steps (0 keeps the single seed triangle).
    pub max_depth: u32,
    /// Displacement amplitude; controls roughness.
    pub displacement_factor: f64,
    /// Elevation separating submerged terrain from land.
    pub sea_level: f64,
    /// Half-width of the seed triangle footprint.
    pub extent: f64,
    /// Vertical exaggeration applied once while assembling the mesh.
    pub height_scale: f64,
    /// Random seed; `None` draws a fresh one per run.
    pub seed: Option<u64>,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            displacement_factor: 0.35,
            sea_level: 0.3,
            extent: 2.0,
            height_scale: 1.0,
            seed: None,
        }
    }
}

impl LandscapeConfig {
    /// Builds a validated configuration from untrusted numeric input.
    ///
    /// `max_depth` is taken signed so a negative value surfaces as
    /// [`ConfigError::NegativeDepth`] instead of wrapping.
    pub fn new(max_depth: i64, displacement_factor: f64, sea_level: f64) -> Result<Self, ConfigError> {
        let max_depth = checked_depth(max_depth)?;
        let config = Self {
            max_depth,
            displacement_factor,
            sea_level,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the seed for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Jagged, island-heavy terrain.
    pub fn rough() -> Self {
        Self {
            max_depth: 5,
            displacement_factor: 0.6,
            sea_level: 0.35,
            ..Default::default()
        }
    }

    /// Rolling hills with little water.
    pub fn gentle() -> Self {
        Self {
            max_depth: 5,
            displacement_factor: 0.15,
            sea_level: 0.1,
            ..Default::default()
        }
    }

    /// Checks every parameter; generation must not start on `Err`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::DepthTooLarge(u64::from(self.max_depth)));
        }
        if !self.displacement_factor.is_finite() {
            return Err(ConfigError::NonFinite("displacement_factor", self.displacement_factor));
        }
        if self.displacement_factor < 0.0 {
            return Err(ConfigError::NegativeDisplacement(self.displacement_factor));
        }
        if !self.sea_level.is_finite() {
            return Err(ConfigError::NonFinite("sea_level", self.sea_level));
        }
        if !(self.extent.is_finite() && self.extent > 0.0 && self.extent <= MAX_EXTENT) {
            return Err(ConfigError::InvalidExtent(self.extent));
        }
        let spacing = self.grid_spacing();
        if spacing < MIN_GRID_SPACING {
            return Err(ConfigError::SpacingBelowTolerance {
                depth: self.max_depth,
                spacing,
            });
        }
        if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
            return Err(ConfigError::InvalidHeightScale(self.height_scale));
        }
        Ok(())
    }

    /// Loads and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of triangles the run will produce before mesh assembly.
    pub fn triangle_count(&self) -> u64 {
        4u64.pow(self.max_depth)
    }

    /// Distance between neighbouring vertices of the finest grid along either
    /// axis. The seed triangle's base and height both span `2 * extent`.
    pub fn grid_spacing(&self) -> f64 {
        2.0 * self.extent / f64::from(1u32 << self.max_depth.min(31))
    }

    /// Number of unique vertices on the subdivided triangular grid.
    pub fn vertex_count(&self) -> u64 {
        let segments = 1u64 << self.max_depth;
        (segments + 1) * (segments + 2) / 2
    }
}

/// Converts a signed depth to `u32`, enforcing the supported range.
pub fn checked_depth(depth: i64) -> Result<u32, ConfigError> {
    if depth < 0 {
        return Err(ConfigError::NegativeDepth(depth));
    }
    match u32::try_from(depth) {
        Ok(d) if d <= MAX_SUPPORTED_DEPTH => Ok(d),
        _ => Err(ConfigError::DepthTooLarge(depth as u64)),
    }
}
