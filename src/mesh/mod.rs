//! Indexed triangle mesh handed to renderers and exporters.

mod builder;

pub use builder::{MeshBuilder, build_mesh};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Triangle, approx_eq};

/// Integrity violations reported by [`Mesh::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfRange { triangle: usize, index: u32, count: usize },
    #[error("Vertices {0} and {1} lie within tolerance of each other")]
    DuplicateVertex(u32, u32),
    #[error("Triangle {0} repeats a vertex index")]
    RepeatedIndex(usize),
}

/// Unique vertex positions plus index triples into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<DVec3>,
    pub indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolves triangle `i` to its positions.
    pub fn triangle(&self, i: usize) -> Triangle {
        let [a, b, c] = self.indices[i];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// Iterates over every triangle as positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.indices.len()).map(move |i| self.triangle(i))
    }

    /// Returns `(min, max)` vertex height, or `None` for a mesh without vertices.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        if self.vertices.is_empty() {
            return None;
        }
        let min = self.vertices.iter().map(|v| v.z).fold(f64::MAX, f64::min);
        let max = self.vertices.iter().map(|v| v.z).fold(f64::MIN, f64::max);
        Some((min, max))
    }

    /// Planar bounding box as `(min, max)` corners.
    pub fn planar_bounds(&self) -> Option<(glam::DVec2, glam::DVec2)> {
        let mut iter = self.vertices.iter().map(|v| v.truncate());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Area-weighted per-vertex normals.
    ///
    /// Each face contributes its unnormalized cross product to its three
    /// corners, so larger faces weigh more. Vertices touched by no face get a
    /// zero normal.
    pub fn vertex_normals(&self) -> Vec<DVec3> {
        let mut normals = vec![DVec3::ZERO; self.vertices.len()];

        for &[a, b, c] in &self.indices {
            let (pa, pb, pc) = (
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            );
            let face = (pb - pa).cross(pc - pa);
            normals[a as usize] += face;
            normals[b as usize] += face;
            normals[c as usize] += face;
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    /// Checks index bounds, repeated indices and the weld invariant.
    ///
    /// The duplicate check is quadratic; meant for tests and debugging.
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.vertices.len();
        for (t, tri) in self.indices.iter().enumerate() {
            for &index in tri {
                if index as usize >= count {
                    return Err(MeshError::IndexOutOfRange { triangle: t, index, count });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(MeshError::RepeatedIndex(t));
            }
        }

        for i in 0..count {
            for j in (i + 1)..count {
                if approx_eq(self.vertices[i], self.vertices[j]) {
                    return Err(MeshError::DuplicateVertex(i as u32, j as u32));
                }
            }
        }
        Ok(())
    }
}
