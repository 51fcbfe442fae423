//! PNG export of top-down height and elevation-band maps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::Landscape;
use super::raster::TopDownRaster;

/// Largest accepted image edge in pixels.
pub const MAX_RESOLUTION: u32 = 8192;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f64, f64),
    #[error("Resolution must be between 1 and {max}, got {0}", max = MAX_RESOLUTION)]
    InvalidResolution(u32),
    #[error("Landscape mesh is empty")]
    EmptyMesh,
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Width and height of the image in pixels.
    pub resolution: u32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            resolution: 512,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }
}

fn rasterize(landscape: &Landscape, options: &PngExportOptions) -> Result<TopDownRaster, PngExportError> {
    if options.resolution == 0 || options.resolution > MAX_RESOLUTION {
        return Err(PngExportError::InvalidResolution(options.resolution));
    }
    if landscape.mesh.is_empty() {
        return Err(PngExportError::EmptyMesh);
    }
    let raster = TopDownRaster::from_mesh(&landscape.mesh, options.resolution);
    log::debug!(
        "rasterized {} triangles at {}px, {:.1}% coverage",
        landscape.mesh.triangle_count(),
        raster.resolution,
        raster.coverage() * 100.0
    );
    Ok(raster)
}

/// Exports the landscape as a 16-bit grayscale heightmap seen from above.
///
/// Heights are normalized to the mesh height range; pixels outside the
/// triangle footprint are written as 0.
pub fn export_height_png(
    landscape: &Landscape,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let raster = rasterize(landscape, options)?;
    let (min, max) = landscape.mesh.height_range().ok_or(PngExportError::EmptyMesh)?;
    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let resolution = raster.resolution;
    let range = max - min;

    // Create 16-bit grayscale image
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(resolution, resolution);

    for y in 0..resolution {
        for x in 0..resolution {
            let height = raster.height(x, y);
            let value = if height.is_nan() {
                0
            } else {
                let normalized = ((height - min) / range).clamp(0.0, 1.0);
                (normalized * 65535.0) as u16
            };
            img.put_pixel(x, y, Luma([value]));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());

    encoder.write_image(
        byte_slice,
        resolution,
        resolution,
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}

/// Exports per-triangle elevation bands as an RGBA map seen from above.
///
/// Uncovered pixels are fully transparent.
pub fn export_band_png(
    landscape: &Landscape,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let raster = rasterize(landscape, options)?;
    let bands = landscape.face_bands();

    let data: Vec<u8> = raster
        .faces
        .iter()
        .flat_map(|face| match face {
            Some(t) => {
                let [r, g, b] = bands[*t as usize].preview_rgb();
                [r, g, b, 255]
            }
            None => [0, 0, 0, 0],
        })
        .collect();

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(
        &data,
        raster.resolution,
        raster.resolution,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Exports both maps as `{base_name}_height.png` and `{base_name}_bands.png`.
pub fn export_landscape_png(
    landscape: &Landscape,
    output_dir: &Path,
    base_name: &str,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    std::fs::create_dir_all(output_dir)?;

    export_height_png(landscape, &output_dir.join(format!("{}_height.png", base_name)), options)?;
    export_band_png(landscape, &output_dir.join(format!("{}_bands.png", base_name)), options)?;
    Ok(())
}
