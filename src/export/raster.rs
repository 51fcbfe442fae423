//! Top-down rasterization of a terrain mesh onto a square pixel grid.

use glam::DVec2;
use rayon::prelude::*;

use crate::mesh::Mesh;

/// Barycentric slack so pixels on shared edges are not lost to rounding.
const EDGE_EPSILON: f64 = 1e-9;

/// Heights and covering triangle per pixel, row-major, row 0 at max y.
#[derive(Debug, Clone)]
pub struct TopDownRaster {
    pub resolution: u32,
    /// Interpolated height per pixel; `NaN` where no triangle covers it.
    pub heights: Vec<f64>,
    /// Index of the covering triangle per pixel.
    pub faces: Vec<Option<u32>>,
}

impl TopDownRaster {
    /// Rasterizes `mesh` over its planar bounding box.
    ///
    /// Triangles are first bucketed by the pixel rows they span, then rows are
    /// filled in parallel. Each pixel samples at its center and takes the last
    /// triangle that contains it.
    pub fn from_mesh(mesh: &Mesh, resolution: u32) -> Self {
        let res = resolution as usize;
        let mut heights = vec![f64::NAN; res * res];
        let mut faces = vec![None; res * res];

        let Some((lo, hi)) = mesh.planar_bounds().filter(|_| res > 0) else {
            return Self { resolution, heights, faces };
        };
        let size = hi - lo;
        if size.x <= 0.0 || size.y <= 0.0 {
            return Self { resolution, heights, faces };
        }
        let step = DVec2::new(size.x / resolution as f64, size.y / resolution as f64);

        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); res];
        for (t, tri) in mesh.triangles().enumerate() {
            let [a, b, c] = tri.vertices();
            let min_y = a.y.min(b.y).min(c.y);
            let max_y = a.y.max(b.y).max(c.y);
            if let Some((first, last)) = row_span(min_y, max_y, hi.y, step.y, res) {
                for bucket in &mut buckets[first..=last] {
                    bucket.push(t as u32);
                }
            }
        }

        heights
            .par_chunks_mut(res)
            .zip(faces.par_chunks_mut(res))
            .zip(buckets.par_iter())
            .enumerate()
            .for_each(|(row, ((height_row, face_row), bucket))| {
                let y = hi.y - (row as f64 + 0.5) * step.y;
                rasterize_row(mesh, bucket, y, lo.x, step.x, height_row, face_row);
            });

        Self { resolution, heights, faces }
    }

    /// Fraction of pixels covered by some triangle.
    pub fn coverage(&self) -> f64 {
        if self.faces.is_empty() {
            return 0.0;
        }
        let covered = self.faces.iter().filter(|f| f.is_some()).count();
        covered as f64 / self.faces.len() as f64
    }

    pub fn height(&self, x: u32, y: u32) -> f64 {
        debug_assert!(x < self.resolution && y < self.resolution);
        self.heights[(y * self.resolution + x) as usize]
    }

    pub fn face(&self, x: u32, y: u32) -> Option<u32> {
        debug_assert!(x < self.resolution && y < self.resolution);
        self.faces[(y * self.resolution + x) as usize]
    }
}

/// Inclusive range of rows whose sample line may cross `[min_y, max_y]`.
///
/// Row `r` samples at `top - (r + 0.5) * dy`. The range is widened by one row
/// on each side; the per-row test in `rasterize_row` stays exact.
fn row_span(min_y: f64, max_y: f64, top: f64, dy: f64, rows: usize) -> Option<(usize, usize)> {
    if rows == 0 {
        return None;
    }
    let first = ((top - max_y) / dy - 0.5).floor() - 1.0;
    let last = ((top - min_y) / dy - 0.5).ceil() + 1.0;
    let max_row = (rows - 1) as f64;
    if last < 0.0 || first > max_row {
        return None;
    }
    Some((first.max(0.0) as usize, last.min(max_row) as usize))
}

fn rasterize_row(
    mesh: &Mesh,
    bucket: &[u32],
    y: f64,
    x0: f64,
    dx: f64,
    heights: &mut [f64],
    faces: &mut [Option<u32>],
) {
    let width = heights.len();

    for &t in bucket {
        let tri = mesh.triangle(t as usize);
        let [a, b, c] = tri.vertices();
        let min_y = a.y.min(b.y).min(c.y);
        let max_y = a.y.max(b.y).max(c.y);
        if y < min_y || y > max_y {
            continue;
        }

        let (pa, pb, pc) = (a.truncate(), b.truncate(), c.truncate());
        let area = (pb - pa).perp_dot(pc - pa);
        if area.abs() < f64::EPSILON {
            continue;
        }

        let min_x = a.x.min(b.x).min(c.x);
        let max_x = a.x.max(b.x).max(c.x);
        let first = (((min_x - x0) / dx) - 0.5).floor().max(0.0) as usize;
        let last = ((((max_x - x0) / dx) - 0.5).ceil().max(0.0) as usize).min(width.saturating_sub(1));

        for px in first..=last {
            let p = DVec2::new(x0 + (px as f64 + 0.5) * dx, y);
            let wa = (pb - p).perp_dot(pc - p) / area;
            let wb = (pc - p).perp_dot(pa - p) / area;
            let wc = 1.0 - wa - wb;
            if wa < -EDGE_EPSILON || wb < -EDGE_EPSILON || wc < -EDGE_EPSILON {
                continue;
            }
            heights[px] = wa * a.z + wb * b.z + wc * c.z;
            faces[px] = Some(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn square(z: [f64; 4]) -> Mesh {
        Mesh {
            vertices: vec![
                DVec3::new(0.0, 0.0, z[0]),
                DVec3::new(1.0, 0.0, z[1]),
                DVec3::new(0.0, 1.0, z[2]),
                DVec3::new(1.0, 1.0, z[3]),
            ],
            indices: vec![[0, 1, 2], [2, 1, 3]],
        }
    }

    #[test]
    fn test_square_fully_covered() {
        let raster = TopDownRaster::from_mesh(&square([0.0; 4]), 16);
        assert_eq!(raster.heights.len(), 256);
        assert!((raster.coverage() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_plane_interpolates() {
        let raster = TopDownRaster::from_mesh(&square([0.5; 4]), 8);
        for h in &raster.heights {
            assert!((h - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_ramp_orientation() {
        // Height grows with x; row 0 is the top (max y) edge.
        let raster = TopDownRaster::from_mesh(&square([0.0, 1.0, 0.0, 1.0]), 10);
        assert!(raster.height(0, 0) < raster.height(9, 0));
        assert!((raster.height(0, 0) - 0.05).abs() < 1e-9);
        assert!((raster.height(9, 9) - 0.95).abs() < 1e-9);
        assert_eq!(raster.face(0, 9), Some(0));
        assert_eq!(raster.face(9, 0), Some(1));
    }

    #[test]
    fn test_triangle_leaves_gaps() {
        let mesh = Mesh {
            vertices: vec![
                DVec3::new(-2.0, -2.0, 0.0),
                DVec3::new(2.0, -2.0, 0.0),
                DVec3::new(0.0, 2.0, 0.0),
            ],
            indices: vec![[0, 1, 2]],
        };
        let raster = TopDownRaster::from_mesh(&mesh, 32);
        let coverage = raster.coverage();
        assert!(coverage > 0.4 && coverage < 0.6, "coverage {}", coverage);
        assert_eq!(raster.face(0, 0), None);
        assert!(raster.height(0, 0).is_nan());
    }

    #[test]
    fn test_row_span_covers_sample_rows() {
        // Ten rows over y in [0, 1]; row r samples at 0.95 - 0.1 * r.
        let (first, last) = row_span(0.42, 0.58, 1.0, 0.1, 10).unwrap();
        for r in 0..10 {
            let y = 1.0 - (r as f64 + 0.5) * 0.1;
            if (0.42..=0.58).contains(&y) {
                assert!(first <= r && r <= last, "row {} outside {}..={}", r, first, last);
            }
        }
        assert!(last - first <= 6);
        assert_eq!(row_span(2.0, 3.0, 1.0, 0.1, 10), None);
        assert_eq!(row_span(-1.0, 2.0, 1.0, 0.1, 10), Some((0, 9)));
    }

    #[test]
    fn test_bucketed_fill_matches_dense_grid() {
        // 8x8 grid of unit squares split into 128 triangles, height = x + y.
        let n = 8;
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(DVec3::new(i as f64, j as f64, (i + j) as f64));
            }
        }
        let at = |i: u32, j: u32| j * (n + 1) + i;
        let mut indices = Vec::new();
        for j in 0..n {
            for i in 0..n {
                indices.push([at(i, j), at(i + 1, j), at(i, j + 1)]);
                indices.push([at(i, j + 1), at(i + 1, j), at(i + 1, j + 1)]);
            }
        }
        let mesh = Mesh { vertices, indices };

        let raster = TopDownRaster::from_mesh(&mesh, 40);
        assert!((raster.coverage() - 1.0).abs() < 1e-12);
        for y in 0..40 {
            for x in 0..40 {
                let px = (x as f64 + 0.5) * 0.2;
                let py = 8.0 - (y as f64 + 0.5) * 0.2;
                assert!((raster.height(x, y) - (px + py)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_mesh() {
        let raster = TopDownRaster::from_mesh(&Mesh::default(), 4);
        assert_eq!(raster.coverage(), 0.0);
    }
}
