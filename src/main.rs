//! fractal-landscape CLI - midpoint-displacement terrain generator.
//!
//! Generate a triangulated landscape, classify it against sea level and
//! export it as an OBJ mesh and/or top-down PNG maps.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use fractal_landscape::config::{checked_depth, LandscapeConfig};
use fractal_landscape::elevation::{ElevationBand, Granularity};
use fractal_landscape::export::{
    export_landscape_png, export_obj, ObjExportOptions, PngExportOptions, MAX_RESOLUTION,
};
use fractal_landscape::terrain::{generate, generate_candidates, Landscape};

/// Fractal landscape generator.
#[derive(Parser)]
#[command(name = "fractal-landscape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a landscape and export it.
    Generate {
        /// Subdivision depth (0-10). Each level multiplies triangles by 4.
        #[arg(short, long, allow_negative_numbers = true)]
        depth: Option<i64>,

        /// Displacement factor controlling roughness.
        #[arg(long)]
        displacement: Option<f64>,

        /// Sea level separating water from land.
        #[arg(long, allow_negative_numbers = true)]
        sea_level: Option<f64>,

        /// Half-width of the seed triangle footprint.
        #[arg(long)]
        extent: Option<f64>,

        /// Vertical exaggeration applied to the exported mesh.
        #[arg(long)]
        height_scale: Option<f64>,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Start from a parameter preset.
        #[arg(long)]
        preset: Option<Preset>,

        /// JSON configuration file; flags given on the command line override it.
        #[arg(short, long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "landscape")]
        name: String,

        /// Export format.
        #[arg(short, long, default_value = "all")]
        format: ExportFormat,

        /// PNG map resolution in pixels.
        #[arg(short, long, default_value = "512")]
        resolution: u32,

        /// Number of candidate landscapes to generate from consecutive seeds.
        #[arg(long, default_value = "1")]
        candidates: usize,

        /// Keep elevation on Z in OBJ output instead of rotating it onto Y.
        #[arg(long)]
        z_up: bool,
    },

    /// Display counts and memory estimates for a subdivision depth.
    Info {
        /// Subdivision depth.
        #[arg(short, long, default_value = "3", allow_negative_numbers = true)]
        depth: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Wavefront OBJ mesh with band vertex colors.
    Obj,
    /// Top-down 16-bit height map and RGBA band map.
    Png,
    /// Both OBJ and PNG outputs.
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Jagged, island-heavy terrain.
    Rough,
    /// Rolling hills with little water.
    Gentle,
}

/// Parameters collected from the `generate` subcommand.
struct GenerateArgs {
    depth: Option<i64>,
    displacement: Option<f64>,
    sea_level: Option<f64>,
    extent: Option<f64>,
    height_scale: Option<f64>,
    seed: Option<u64>,
    preset: Option<Preset>,
    config: Option<PathBuf>,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    resolution: u32,
    candidates: usize,
    z_up: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            depth,
            displacement,
            sea_level,
            extent,
            height_scale,
            seed,
            preset,
            config,
            output,
            name,
            format,
            resolution,
            candidates,
            z_up,
        } => {
            run_generate(GenerateArgs {
                depth,
                displacement,
                sea_level,
                extent,
                height_scale,
                seed,
                preset,
                config,
                output,
                name,
                format,
                resolution,
                candidates,
                z_up,
            });
        }
        Commands::Info { depth } => {
            run_info(depth);
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Layers file, preset and flags into one validated configuration.
fn resolve_config(args: &GenerateArgs) -> LandscapeConfig {
    let mut config = match (&args.config, args.preset) {
        (Some(path), _) => LandscapeConfig::from_json_file(path)
            .unwrap_or_else(|e| fail(format!("loading {}: {}", path.display(), e))),
        (None, Some(Preset::Rough)) => LandscapeConfig::rough(),
        (None, Some(Preset::Gentle)) => LandscapeConfig::gentle(),
        (None, None) => LandscapeConfig::default(),
    };

    if let Some(depth) = args.depth {
        config.max_depth = checked_depth(depth).unwrap_or_else(|e| fail(e));
    }
    if let Some(v) = args.displacement {
        config.displacement_factor = v;
    }
    if let Some(v) = args.sea_level {
        config.sea_level = v;
    }
    if let Some(v) = args.extent {
        config.extent = v;
    }
    if let Some(v) = args.height_scale {
        config.height_scale = v;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate().unwrap_or_else(|e| fail(e));
    config
}

fn run_generate(args: GenerateArgs) {
    if args.resolution == 0 || args.resolution > MAX_RESOLUTION {
        fail(format!("Resolution must be between 1 and {}", MAX_RESOLUTION));
    }
    if args.candidates == 0 || args.candidates > 64 {
        fail("Number of candidates must be between 1 and 64");
    }

    let config = resolve_config(&args);

    println!("Fractal Landscape Generator");
    println!("===========================");
    println!("Depth: {} ({} triangles)", config.max_depth, config.triangle_count());
    println!("Displacement: {}", config.displacement_factor);
    println!("Sea level: {}", config.sea_level);
    println!("Output: {}", args.output.display());

    let start = Instant::now();

    println!("\nGenerating...");
    let landscapes: Vec<Landscape> = if args.candidates == 1 {
        vec![generate(&config).unwrap_or_else(|e| fail(e))]
    } else {
        let base = config.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..args.candidates as u64).map(|i| base.wrapping_add(i)).collect();
        generate_candidates(&config, &seeds).unwrap_or_else(|e| fail(e))
    };

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    for (i, landscape) in landscapes.iter().enumerate() {
        let counts = landscape.band_counts(Granularity::PerTriangle);
        let (lo, hi) = landscape.elevation_range().unwrap_or((0.0, 0.0));
        println!(
            "  [{}/{}] seed {}: {} vertices, {} triangles, height [{:.4}, {:.4}], water {:.1}%",
            i + 1,
            landscapes.len(),
            landscape.seed.map_or_else(|| "-".to_string(), |s| s.to_string()),
            landscape.mesh.vertex_count(),
            landscape.mesh.triangle_count(),
            lo,
            hi,
            counts.water_fraction() * 100.0
        );
        for band in ElevationBand::all() {
            println!("        {:<10} {:>8} faces", band.name(), counts.get(band));
        }
        if landscape.stats.degenerate_dropped > 0 {
            println!(
                "        dropped {} collapsed triangles",
                landscape.stats.degenerate_dropped
            );
        }
    }

    println!("\nExporting...");
    let export_start = Instant::now();

    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        fail(format!("creating output directory: {}", e));
    });

    for (i, landscape) in landscapes.iter().enumerate() {
        let name = if landscapes.len() == 1 {
            args.name.clone()
        } else {
            format!("{}_{:02}", args.name, i + 1)
        };
        export_one(landscape, &args, &args.output, &name);
    }

    let export_time = export_start.elapsed();
    let total_time = start.elapsed();

    println!("Export completed in {:.2?}", export_time);
    println!("\nTotal time: {:.2?}", total_time);
    println!("Done!");
}

fn export_one(landscape: &Landscape, args: &GenerateArgs, output: &Path, name: &str) {
    if matches!(args.format, ExportFormat::Obj | ExportFormat::All) {
        let options = ObjExportOptions {
            y_up: !args.z_up,
            ..Default::default()
        };
        let path = output.join(format!("{}.obj", name));
        export_obj(landscape, &path, &options)
            .unwrap_or_else(|e| fail(format!("exporting OBJ: {}", e)));
        println!("  Exported mesh: {}", path.display());
    }

    if matches!(args.format, ExportFormat::Png | ExportFormat::All) {
        let options = PngExportOptions::with_resolution(args.resolution);
        export_landscape_png(landscape, output, name, &options)
            .unwrap_or_else(|e| fail(format!("exporting PNG: {}", e)));
        println!("  Exported maps: {}_height.png, {}_bands.png", name, name);
    }
}

fn run_info(depth: i64) {
    let depth = checked_depth(depth).unwrap_or_else(|e| fail(e));
    let config = LandscapeConfig {
        max_depth: depth,
        ..Default::default()
    };

    let triangles = config.triangle_count();
    let vertices = config.vertex_count();
    let midpoints = vertices - 3;
    let spacing = config.grid_spacing();

    let bytes_triangles = triangles * 72; // 3 x DVec3
    let bytes_cache = midpoints * 24; // (i64, i64) key + f64
    let bytes_mesh = vertices * 24 + triangles * 12;
    let mb = |b: u64| b as f64 / 1024.0 / 1024.0;

    println!("Fractal Landscape - Depth Info");
    println!("==============================");
    println!();
    println!("Depth: {}", depth);
    println!("  Triangles: {:>12}", triangles);
    println!("  Vertices:  {:>12}", vertices);
    println!("  Midpoints: {:>12}", midpoints);
    println!("  Grid spacing at extent {}: {:.6}", config.extent, spacing);
    if let Err(e) = config.validate() {
        println!("  Warning: {}", e);
    }
    println!();
    println!("Memory usage (peak, in-memory):");
    println!("  Triangle list: {:>12} bytes ({:.2} MB)", bytes_triangles, mb(bytes_triangles));
    println!("  Height cache:  {:>12} bytes ({:.2} MB)", bytes_cache, mb(bytes_cache));
    println!("  Indexed mesh:  {:>12} bytes ({:.2} MB)", bytes_mesh, mb(bytes_mesh));
    let total = bytes_triangles + bytes_cache + bytes_mesh;
    println!("  Total:         {:>12} bytes ({:.2} MB)", total, mb(total));
}
