//! End-to-end landscape generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, LandscapeConfig};
use crate::elevation::{BandCounts, ElevationBand, Granularity, classify_mesh};
use crate::geometry::Triangle;
use crate::mesh::{Mesh, MeshBuilder};
use crate::noise::DisplacementModel;
use super::height_cache::HeightCache;
use super::subdivide::{seed_triangle, subdivide};

/// Bookkeeping from one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Triangles produced by subdivision, before welding.
    pub triangles_generated: usize,
    /// Distinct midpoints assigned a height.
    pub cached_midpoints: usize,
    /// Midpoint lookups served from the cache.
    pub cache_hits: u64,
    /// Triangles dropped during welding because they collapsed.
    pub degenerate_dropped: usize,
}

/// A generated terrain surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landscape {
    /// Configuration the landscape was generated with.
    pub config: LandscapeConfig,
    /// Seed that reproduces this landscape, if it was generated from one.
    pub seed: Option<u64>,
    /// The undisplaced seed triangle, with its raw corner heights.
    pub corners: Triangle,
    /// Welded surface mesh.
    pub mesh: Mesh,
    pub stats: GenerationStats,
}

impl Landscape {
    /// `(min, max)` elevation with height scaling removed.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.mesh
            .height_range()
            .map(|(lo, hi)| (lo / self.config.height_scale, hi / self.config.height_scale))
    }

    /// Elevation bands at the requested granularity.
    pub fn bands(&self, granularity: Granularity) -> Vec<ElevationBand> {
        classify_mesh(
            &self.mesh,
            self.config.sea_level,
            self.config.height_scale,
            granularity,
        )
    }

    pub fn vertex_bands(&self) -> Vec<ElevationBand> {
        self.bands(Granularity::PerVertex)
    }

    pub fn face_bands(&self) -> Vec<ElevationBand> {
        self.bands(Granularity::PerTriangle)
    }

    /// Fill colors at the requested granularity.
    pub fn colors(&self, granularity: Granularity) -> Vec<[u8; 3]> {
        self.bands(granularity)
            .into_iter()
            .map(ElevationBand::preview_rgb)
            .collect()
    }

    pub fn band_counts(&self, granularity: Granularity) -> BandCounts {
        BandCounts::tally(&self.bands(granularity))
    }
}

/// Generates a landscape, seeding a `ChaCha8Rng` from `config.seed`.
///
/// Without a configured seed a fresh one is drawn and recorded on the result.
pub fn generate(config: &LandscapeConfig) -> Result<Landscape, ConfigError> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("generating landscape with seed {}", seed);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut landscape = generate_with_rng(config, &mut rng)?;
    landscape.seed = Some(seed);
    Ok(landscape)
}

/// Generates a landscape drawing every random number from `rng`.
///
/// `config.seed` is ignored; the caller owns reproducibility.
pub fn generate_with_rng<R: Rng + ?Sized>(
    config: &LandscapeConfig,
    rng: &mut R,
) -> Result<Landscape, ConfigError> {
    config.validate()?;

    let corners = seed_triangle(config.extent, rng);
    let model = DisplacementModel::new(config.displacement_factor);
    let mut cache = HeightCache::with_capacity(config.vertex_count() as usize);

    let triangles = subdivide(vec![corners], config.max_depth, &model, &mut cache, rng);

    let mut builder = MeshBuilder::with_height_scale(config.height_scale);
    builder.reserve(config.vertex_count() as usize, triangles.len());
    builder.extend(&triangles);
    let degenerate_dropped = builder.degenerate_count();
    let mesh = builder.finish();

    let stats = GenerationStats {
        triangles_generated: triangles.len(),
        cached_midpoints: cache.len(),
        cache_hits: cache.hits(),
        degenerate_dropped,
    };
    log::info!(
        "landscape ready: depth {}, {} triangles, {} vertices, {} cache hits",
        config.max_depth,
        mesh.triangle_count(),
        mesh.vertex_count(),
        stats.cache_hits
    );

    Ok(Landscape {
        config: config.clone(),
        seed: None,
        corners,
        mesh,
        stats,
    })
}

/// Generates one candidate landscape per seed in parallel.
///
/// Each candidate is an independent run with its own cache and RNG; output
/// order follows `seeds`.
pub fn generate_candidates(
    config: &LandscapeConfig,
    seeds: &[u64],
) -> Result<Vec<Landscape>, ConfigError> {
    config.validate()?;

    seeds
        .par_iter()
        .map(|&seed| generate(&config.clone().with_seed(seed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::geometry::planar_key;

    fn config(depth: u32, factor: f64, seed: u64) -> LandscapeConfig {
        LandscapeConfig {
            max_depth: depth,
            displacement_factor: factor,
            ..Default::default()
        }
        .with_seed(seed)
    }

    #[test]
    fn test_depth_zero_returns_seed_triangle() {
        let landscape = generate(&config(0, 0.35, 10)).unwrap();

        assert_eq!(landscape.mesh.vertex_count(), 3);
        assert_eq!(landscape.mesh.triangle_count(), 1);

        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let expected: Vec<f64> = (0..3).map(|_| rng.random::<f64>()).collect();
        let heights: Vec<f64> = landscape.mesh.vertices.iter().map(|v| v.z).collect();
        assert_eq!(heights, expected);
        assert_eq!(landscape.corners.vertices().map(|p| p.z).to_vec(), expected);
    }

    #[test]
    fn test_counts_match_depth() {
        for depth in 0..=5 {
            let cfg = config(depth, 0.35, 3);
            let landscape = generate(&cfg).unwrap();

            assert_eq!(landscape.stats.triangles_generated as u64, cfg.triangle_count());
            assert_eq!(landscape.mesh.triangle_count() as u64, cfg.triangle_count());
            assert_eq!(landscape.mesh.vertex_count() as u64, cfg.vertex_count());
            assert_eq!(landscape.stats.degenerate_dropped, 0);
        }
    }

    #[test]
    fn test_mesh_is_valid() {
        let landscape = generate(&config(4, 0.5, 21)).unwrap();
        assert!(landscape.mesh.validate().is_ok());
    }

    #[test]
    fn test_mesh_is_crack_free() {
        let landscape = generate(&config(5, 0.9, 64)).unwrap();
        let mut seen: HashMap<(i64, i64), usize> = HashMap::new();

        for (i, v) in landscape.mesh.vertices.iter().enumerate() {
            assert!(seen.insert(planar_key(v.truncate()), i).is_none());
        }
    }

    #[test]
    fn test_seed_reproduces() {
        let a = generate(&config(4, 0.35, 7)).unwrap();
        let b = generate(&config(4, 0.35, 7)).unwrap();
        let c = generate(&config(4, 0.35, 8)).unwrap();

        assert_eq!(a.mesh, b.mesh);
        assert_ne!(a.mesh, c.mesh);
        assert_eq!(a.seed, Some(7));
    }

    #[test]
    fn test_unseeded_run_records_seed() {
        let cfg = LandscapeConfig { max_depth: 2, ..Default::default() };
        let first = generate(&cfg).unwrap();
        let seed = first.seed.unwrap();

        let replay = generate(&cfg.clone().with_seed(seed)).unwrap();
        assert_eq!(first.mesh, replay.mesh);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let cfg = LandscapeConfig {
            sea_level: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(generate(&cfg), Err(ConfigError::NonFinite("sea_level", _))));
        assert!(generate_candidates(&cfg, &[1, 2]).is_err());
    }

    #[test]
    fn test_zero_displacement_keeps_heights_within_corners() {
        let landscape = generate(&config(4, 0.0, 12)).unwrap();
        let corner_z = landscape.corners.vertices().map(|p| p.z);
        let lo = corner_z.iter().cloned().fold(f64::MAX, f64::min);
        let hi = corner_z.iter().cloned().fold(f64::MIN, f64::max);

        for v in &landscape.mesh.vertices {
            assert!(v.z >= lo - 1e-12 && v.z <= hi + 1e-12);
        }
    }

    #[test]
    fn test_height_scale_preserves_bands() {
        let plain = generate(&config(3, 0.35, 5)).unwrap();
        let mut tall_cfg = config(3, 0.35, 5);
        tall_cfg.height_scale = 4.0;
        let tall = generate(&tall_cfg).unwrap();

        assert_eq!(plain.face_bands(), tall.face_bands());
        let (lo, hi) = plain.elevation_range().unwrap();
        let (tlo, thi) = tall.elevation_range().unwrap();
        assert!((lo - tlo).abs() < 1e-12 && (hi - thi).abs() < 1e-12);
    }

    #[test]
    fn test_band_granularities() {
        let landscape = generate(&config(3, 0.35, 99)).unwrap();
        assert_eq!(landscape.vertex_bands().len(), landscape.mesh.vertex_count());
        assert_eq!(landscape.face_bands().len(), landscape.mesh.triangle_count());
        assert_eq!(
            landscape.band_counts(Granularity::PerTriangle).total(),
            landscape.mesh.triangle_count()
        );
        assert_eq!(landscape.colors(Granularity::PerVertex).len(), landscape.mesh.vertex_count());
    }

    #[test]
    fn test_candidates_are_independent_runs() {
        let cfg = config(3, 0.35, 0);
        let seeds = [11, 12, 11];
        let candidates = generate_candidates(&cfg, &seeds).unwrap();

        assert_eq!(candidates.len(), 3);
        for (landscape, &seed) in candidates.iter().zip(&seeds) {
            assert_eq!(landscape.seed, Some(seed));
        }
        assert_eq!(candidates[0].mesh, candidates[2].mesh);
        assert_ne!(candidates[0].mesh, candidates[1].mesh);

        let serial = generate(&cfg.clone().with_seed(12)).unwrap();
        assert_eq!(serial.mesh, candidates[1].mesh);
    }

    #[test]
    fn test_injected_rng_drives_generation() {
        let cfg = config(2, 0.35, 0);
        let mut a = ChaCha8Rng::seed_from_u64(500);
        let mut b = ChaCha8Rng::seed_from_u64(500);

        let first = generate_with_rng(&cfg, &mut a).unwrap();
        let second = generate_with_rng(&cfg, &mut b).unwrap();
        assert_eq!(first.mesh, second.mesh);
        assert_eq!(first.seed, None);
    }
}
