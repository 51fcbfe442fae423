//! Midpoint-displacement triangle subdivision.

use std::num::NonZeroU32;

use glam::DVec3;
use rand::Rng;

use crate::geometry::{Triangle, planar_midpoint};
use crate::noise::{DisplacementModel, corner_height};
use super::height_cache::HeightCache;

/// Builds the seed triangle over `[-extent, extent]` with random corner heights.
///
/// Corners are `(-e, -e)`, `(e, -e)` and `(0, e)`; heights are drawn in that
/// order, each uniform in `[0, 1)`.
pub fn seed_triangle<R: Rng + ?Sized>(extent: f64, rng: &mut R) -> Triangle {
    let p1 = DVec3::new(-extent, -extent, corner_height(rng));
    let p2 = DVec3::new(extent, -extent, corner_height(rng));
    let p3 = DVec3::new(0.0, extent, corner_height(rng));
    Triangle::new(p1, p2, p3)
}

/// Subdivides `triangles` `depth` times, returning `4^depth` children per input.
///
/// Each level replaces every triangle by three corner triangles and one centre
/// triangle built from its edge midpoints. Midpoint heights come from `cache`,
/// keyed on planar position, so edges shared by two parents resolve to a
/// single height. `depth == 0` returns the input unchanged.
pub fn subdivide<R: Rng + ?Sized>(
    triangles: Vec<Triangle>,
    depth: u32,
    model: &DisplacementModel,
    cache: &mut HeightCache,
    rng: &mut R,
) -> Vec<Triangle> {
    let mut current = triangles;
    let mut remaining = depth;

    // Loop invariant: `current.len() == input_len * 4^(depth - remaining)`.
    while let Some(level) = NonZeroU32::new(remaining) {
        current = split_level(&current, level, model, cache, rng);
        log::debug!(
            "subdivision level {} done: {} triangles, {} cached midpoints",
            level,
            current.len(),
            cache.len()
        );
        remaining -= 1;
    }

    current
}

/// Runs one subdivision step at `level`.
pub(crate) fn split_level<R: Rng + ?Sized>(
    triangles: &[Triangle],
    level: NonZeroU32,
    model: &DisplacementModel,
    cache: &mut HeightCache,
    rng: &mut R,
) -> Vec<Triangle> {
    let mut children = Vec::with_capacity(triangles.len() * 4);

    for tri in triangles {
        let m1 = displaced_midpoint(tri.p1, tri.p2, level, model, cache, rng);
        let m2 = displaced_midpoint(tri.p2, tri.p3, level, model, cache, rng);
        let m3 = displaced_midpoint(tri.p3, tri.p1, level, model, cache, rng);

        children.push(Triangle::new(tri.p1, m1, m3));
        children.push(Triangle::new(m1, tri.p2, m2));
        children.push(Triangle::new(m3, m2, tri.p3));
        children.push(Triangle::new(m1, m2, m3));
    }

    children
}

fn displaced_midpoint<R: Rng + ?Sized>(
    a: DVec3,
    b: DVec3,
    level: NonZeroU32,
    model: &DisplacementModel,
    cache: &mut HeightCache,
    rng: &mut R,
) -> DVec3 {
    let xy = planar_midpoint(a, b);
    let base = (a.z + b.z) / 2.0;
    let z = cache.height_at(xy, base, level, model, rng);
    DVec3::new(xy.x, xy.y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use crate::geometry::planar_key;

    fn run(depth: u32, factor: f64, seed: u64) -> (Triangle, Vec<Triangle>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let seed_tri = seed_triangle(2.0, &mut rng);
        let mut cache = HeightCache::new();
        let model = DisplacementModel::new(factor);
        let out = subdivide(vec![seed_tri], depth, &model, &mut cache, &mut rng);
        (seed_tri, out)
    }

    #[test]
    fn test_triangle_count_is_power_of_four() {
        for depth in 0..=5 {
            let (_, tris) = run(depth, 0.35, 42);
            assert_eq!(tris.len(), 4usize.pow(depth), "depth {}", depth);
        }
    }

    #[test]
    fn test_depth_zero_is_identity() {
        let (seed_tri, tris) = run(0, 0.35, 9);
        assert_eq!(tris, vec![seed_tri]);
    }

    #[test]
    fn test_seed_triangle_layout() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let tri = seed_triangle(3.0, &mut rng);
        assert_eq!(tri.p1.truncate().to_array(), [-3.0, -3.0]);
        assert_eq!(tri.p2.truncate().to_array(), [3.0, -3.0]);
        assert_eq!(tri.p3.truncate().to_array(), [0.0, 3.0]);
        for p in tri.vertices() {
            assert!((0.0..1.0).contains(&p.z));
        }
    }

    #[test]
    fn test_child_layout_of_single_step() {
        let (seed_tri, tris) = run(1, 0.0, 1);
        let [p1, p2, p3] = seed_tri.vertices();
        let mid = |a: DVec3, b: DVec3| (a + b) / 2.0;

        assert_eq!(tris[0], Triangle::new(p1, mid(p1, p2), mid(p3, p1)));
        assert_eq!(tris[1], Triangle::new(mid(p1, p2), p2, mid(p2, p3)));
        assert_eq!(tris[2], Triangle::new(mid(p3, p1), mid(p2, p3), p3));
        assert_eq!(tris[3], Triangle::new(mid(p1, p2), mid(p2, p3), mid(p3, p1)));
    }

    #[test]
    fn test_shared_positions_have_one_height() {
        for depth in 1..=5 {
            let (_, tris) = run(depth, 0.8, 1234 + depth as u64);
            let mut seen: HashMap<(i64, i64), f64> = HashMap::new();

            for tri in &tris {
                for p in tri.vertices() {
                    let z = *seen.entry(planar_key(p.truncate())).or_insert(p.z);
                    assert_eq!(z, p.z, "crack at ({}, {}) depth {}", p.x, p.y, depth);
                }
            }
        }
    }

    #[test]
    fn test_shared_edge_between_parents_agrees() {
        let a = DVec3::new(0.0, 0.0, 0.1);
        let b = DVec3::new(1.0, 0.0, 0.5);
        let c = DVec3::new(0.0, 1.0, 0.9);
        let d = DVec3::new(1.0, 1.0, 0.3);
        // B-C is shared; the second parent walks it in the opposite direction.
        let parents = vec![Triangle::new(a, b, c), Triangle::new(c, b, d)];

        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut cache = HeightCache::new();
        let model = DisplacementModel::new(1.0);
        let tris = subdivide(parents, 1, &model, &mut cache, &mut rng);

        // first parent: m2 = mid(B, C); second parent: m1 = mid(C, B)
        let from_first = tris[1].p3;
        let from_second = tris[4].p2;
        assert_eq!(from_first, from_second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 5);
    }

    #[test]
    fn test_zero_displacement_interpolates_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let model = DisplacementModel::new(0.0);
        let mut cache = HeightCache::new();
        let mut current = vec![seed_triangle(2.0, &mut rng)];

        for level in (1..=5).rev() {
            let level = NonZeroU32::new(level).unwrap();
            let children = split_level(&current, level, &model, &mut cache, &mut rng);

            for (parent, quad) in current.iter().zip(children.chunks(4)) {
                assert_eq!(quad[3].p1.z, (parent.p1.z + parent.p2.z) / 2.0);
                assert_eq!(quad[3].p2.z, (parent.p2.z + parent.p3.z) / 2.0);
                assert_eq!(quad[3].p3.z, (parent.p3.z + parent.p1.z) / 2.0);
            }
            current = children;
        }
    }

    #[test]
    fn test_zero_displacement_stays_planar() {
        let (seed_tri, tris) = run(4, 0.0, 8);
        let [p1, p2, p3] = seed_tri.vertices();
        let normal = (p2 - p1).cross(p3 - p1).normalize();

        for tri in &tris {
            for p in tri.vertices() {
                assert!((p - p1).dot(normal).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let (_, a) = run(3, 0.35, 2024);
        let (_, b) = run(3, 0.35, 2024);
        assert_eq!(a, b);
    }

    #[test]
    fn test_displacement_bounded_per_level() {
        let factor = 0.4;
        let (_, tris) = run(1, factor, 55);
        let center = tris[3];
        let bound = factor / 1.0;

        for (m, (a, b)) in center.vertices().iter().zip([
            (tris[0].p1, tris[1].p2),
            (tris[1].p2, tris[2].p3),
            (tris[2].p3, tris[0].p1),
        ]) {
            assert!((m.z - (a.z + b.z) / 2.0).abs() <= bound);
        }
    }
}
