//! Elevation bands relative to sea level.
//!
//! Every vertex or face falls into one of three bands that drive its fill
//! color. Bands are recomputed from heights on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// Height above sea level still counted as shoreline.
pub const SHORELINE_BAND: f64 = 0.1;

/// Coarse elevation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevationBand {
    /// Strictly below sea level.
    Submerged,
    /// At or above sea level, below `sea_level + SHORELINE_BAND`.
    Shoreline,
    /// Everything higher.
    Land,
}

impl ElevationBand {
    /// All bands from lowest to highest.
    pub const fn all() -> [ElevationBand; 3] {
        [ElevationBand::Submerged, ElevationBand::Shoreline, ElevationBand::Land]
    }

    /// Fill color: blue water, sandy-brown shore, green land.
    pub fn preview_rgb(self) -> [u8; 3] {
        match self {
            ElevationBand::Submerged => [0, 0, 255],
            ElevationBand::Shoreline => [244, 164, 96],
            ElevationBand::Land => [0, 128, 0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElevationBand::Submerged => "submerged",
            ElevationBand::Shoreline => "shoreline",
            ElevationBand::Land => "land",
        }
    }
}

/// Classifies `height` against `sea_level`.
pub fn classify(height: f64, sea_level: f64) -> ElevationBand {
    if height < sea_level {
        ElevationBand::Submerged
    } else if height < sea_level + SHORELINE_BAND {
        ElevationBand::Shoreline
    } else {
        ElevationBand::Land
    }
}

/// Which mesh element a band is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Granularity {
    /// One band per vertex, for smooth per-vertex shading.
    PerVertex,
    /// One band per triangle from its mean vertex height, for flat faces.
    #[default]
    PerTriangle,
}

/// Bands for every vertex of `mesh`, with heights divided by `height_scale`
/// to undo any vertical exaggeration applied at assembly.
pub fn classify_vertices(mesh: &Mesh, sea_level: f64, height_scale: f64) -> Vec<ElevationBand> {
    mesh.vertices
        .iter()
        .map(|v| classify(v.z / height_scale, sea_level))
        .collect()
}

/// Bands for every triangle of `mesh` from its average vertex height.
pub fn classify_triangles(mesh: &Mesh, sea_level: f64, height_scale: f64) -> Vec<ElevationBand> {
    mesh.triangles()
        .map(|tri| classify(tri.average_height() / height_scale, sea_level))
        .collect()
}

/// Bands at the requested granularity.
pub fn classify_mesh(
    mesh: &Mesh,
    sea_level: f64,
    height_scale: f64,
    granularity: Granularity,
) -> Vec<ElevationBand> {
    match granularity {
        Granularity::PerVertex => classify_vertices(mesh, sea_level, height_scale),
        Granularity::PerTriangle => classify_triangles(mesh, sea_level, height_scale),
    }
}

/// Number of elements in each band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub submerged: usize,
    pub shoreline: usize,
    pub land: usize,
}

impl BandCounts {
    pub fn tally(bands: &[ElevationBand]) -> Self {
        let mut counts = Self::default();
        for band in bands {
            match band {
                ElevationBand::Submerged => counts.submerged += 1,
                ElevationBand::Shoreline => counts.shoreline += 1,
                ElevationBand::Land => counts.land += 1,
            }
        }
        counts
    }

    /// Count for a single band.
    pub fn get(&self, band: ElevationBand) -> usize {
        match band {
            ElevationBand::Submerged => self.submerged,
            ElevationBand::Shoreline => self.shoreline,
            ElevationBand::Land => self.land,
        }
    }

    pub fn total(&self) -> usize {
        self.submerged + self.shoreline + self.land
    }

    /// Fraction of elements below sea level, 0 for an empty tally.
    pub fn water_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.submerged as f64 / n as f64,
        }
    }
}
