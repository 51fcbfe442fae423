//! Wavefront OBJ export with per-vertex band colors.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use glam::DVec3;
use thiserror::Error;

use crate::terrain::Landscape;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Landscape mesh is empty")]
    EmptyMesh,
}

/// Options for OBJ export.
#[derive(Debug, Clone)]
pub struct ObjExportOptions {
    /// Rotate elevation onto +Y, the convention most DCC tools import with.
    pub y_up: bool,
    /// Append band RGB after each `v` position (the common vertex-color extension).
    pub vertex_colors: bool,
    /// Emit `vn` records and reference them from faces.
    pub normals: bool,
}

impl Default for ObjExportOptions {
    fn default() -> Self {
        Self {
            y_up: true,
            vertex_colors: true,
            normals: true,
        }
    }
}

fn orient(v: DVec3, y_up: bool) -> DVec3 {
    if y_up {
        DVec3::new(v.x, v.z, -v.y)
    } else {
        v
    }
}

/// Writes `landscape` as OBJ text to `writer`.
pub fn write_obj<W: Write>(
    landscape: &Landscape,
    writer: &mut W,
    options: &ObjExportOptions,
) -> Result<(), ObjExportError> {
    let mesh = &landscape.mesh;
    if mesh.is_empty() {
        return Err(ObjExportError::EmptyMesh);
    }

    writeln!(writer, "# fractal landscape")?;
    if let Some(seed) = landscape.seed {
        writeln!(writer, "# seed {}", seed)?;
    }
    writeln!(
        writer,
        "# depth {} displacement {} sea_level {}",
        landscape.config.max_depth, landscape.config.displacement_factor, landscape.config.sea_level
    )?;
    writeln!(writer, "# {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;

    let colors = options.vertex_colors.then(|| landscape.vertex_bands());
    for (i, &v) in mesh.vertices.iter().enumerate() {
        let p = orient(v, options.y_up);
        match &colors {
            Some(bands) => {
                let [r, g, b] = bands[i].preview_rgb();
                writeln!(
                    writer,
                    "v {:.6} {:.6} {:.6} {:.4} {:.4} {:.4}",
                    p.x,
                    p.y,
                    p.z,
                    f64::from(r) / 255.0,
                    f64::from(g) / 255.0,
                    f64::from(b) / 255.0
                )?;
            }
            None => writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?,
        }
    }

    if options.normals {
        for n in mesh.vertex_normals() {
            let n = orient(n, options.y_up);
            writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }
    }

    // OBJ indices are 1-based.
    for &[a, b, c] in &mesh.indices {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if options.normals {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Exports `landscape` to an OBJ file at `path`.
pub fn export_obj(
    landscape: &Landscape,
    path: &Path,
    options: &ObjExportOptions,
) -> Result<(), ObjExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(landscape, &mut writer, options)
}
