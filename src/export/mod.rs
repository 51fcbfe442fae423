//! Export module for handing landscapes to renderers and other tools.
//!
//! Supports Wavefront OBJ meshes with band-colored vertices, plus top-down
//! 16-bit height and RGBA band maps as PNG.

mod obj;
mod png;
mod raster;

pub use obj::{export_obj, write_obj, ObjExportError, ObjExportOptions};
pub use png::{
    export_band_png,
    export_height_png,
    export_landscape_png,
    PngExportError,
    PngExportOptions,
    MAX_RESOLUTION,
};
pub use raster::TopDownRaster;
