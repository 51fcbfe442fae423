//! Indexed mesh assembly with tolerance-based vertex welding.

use std::collections::HashMap;

use glam::DVec3;

use crate::geometry::{Triangle, approx_eq, cell_key};
use super::Mesh;

/// Accumulates triangles into an indexed [`Mesh`].
///
/// Vertices within `COORD_TOLERANCE` of an already-stored vertex on every axis
/// reuse its index; the first occurrence wins and indices follow insertion
/// order. Lookups go through a hash grid of tolerance-sized cells, probing the
/// 27 cells around the query.
///
/// A triangle whose corners weld onto fewer than three distinct vertices is
/// dropped and counted in [`MeshBuilder::degenerate_count`].
#[derive(Debug)]
pub struct MeshBuilder {
    vertices: Vec<DVec3>,
    indices: Vec<[u32; 3]>,
    grid: HashMap<(i64, i64, i64), Vec<u32>>,
    height_scale: f64,
    degenerate: usize,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::with_height_scale(1.0)
    }

    /// Builder that multiplies every incoming height by `height_scale` before
    /// welding.
    pub fn with_height_scale(height_scale: f64) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            grid: HashMap::new(),
            height_scale,
            degenerate: 0,
        }
    }

    /// Reserves room for the given number of vertices and triangles.
    pub fn reserve(&mut self, vertices: usize, triangles: usize) {
        self.vertices.reserve(vertices);
        self.indices.reserve(triangles);
        self.grid.reserve(vertices);
    }

    /// Returns the index of `position`, inserting it if no stored vertex lies
    /// within tolerance.
    pub fn insert_vertex(&mut self, position: DVec3) -> u32 {
        let p = DVec3::new(position.x, position.y, position.z * self.height_scale);
        if let Some(index) = self.find(p) {
            return index;
        }

        let index = self.vertices.len() as u32;
        self.vertices.push(p);
        self.grid.entry(cell_key(p)).or_default().push(index);
        index
    }

    /// Adds one triangle, returning its index triple unless it collapsed.
    pub fn add_triangle(&mut self, triangle: &Triangle) -> Option<[u32; 3]> {
        let a = self.insert_vertex(triangle.p1);
        let b = self.insert_vertex(triangle.p2);
        let c = self.insert_vertex(triangle.p3);

        if a == b || b == c || c == a {
            self.degenerate += 1;
            return None;
        }

        let tri = [a, b, c];
        self.indices.push(tri);
        Some(tri)
    }

    /// Adds every triangle in `triangles`.
    pub fn extend<'a, I>(&mut self, triangles: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Triangle>,
    {
        for tri in triangles {
            self.add_triangle(tri);
        }
        self
    }

    /// Triangles dropped because two of their corners welded together.
    pub fn degenerate_count(&self) -> usize {
        self.degenerate
    }

    /// Consumes the builder and returns the finished mesh.
    pub fn finish(self) -> Mesh {
        if self.degenerate > 0 {
            log::warn!(
                "dropped {} degenerate triangles while welding vertices",
                self.degenerate
            );
        }
        Mesh {
            vertices: self.vertices,
            indices: self.indices,
        }
    }

    fn find(&self, p: DVec3) -> Option<u32> {
        let (cx, cy, cz) = cell_key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    if let Some(&index) = bucket
                        .iter()
                        .find(|&&i| approx_eq(self.vertices[i as usize], p))
                    {
                        return Some(index);
                    }
                }
            }
        }
        None
    }
}

/// Builds an indexed mesh from a triangle soup at unit height scale.
pub fn build_mesh(triangles: &[Triangle]) -> Mesh {
    let mut builder = MeshBuilder::new();
    builder.reserve(triangles.len() / 2 + 3, triangles.len());
    builder.extend(triangles);
    builder.finish()
}
