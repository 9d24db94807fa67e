use anyhow::{Context, Result};
use clap::Parser;

use meshraster::mesh::load_2dm;
use meshraster::raster::{RasterConfig, Rasterization, Rasterizer};

#[derive(Parser, Debug)]
#[command(name = "meshraster")]
#[command(about = "Rasterize a triangular surface mesh into an elevation grid")]
struct Args {
    /// Path to .2dm mesh file to load
    file: String,

    /// Distance between raster samples, in mesh units
    #[arg(long, default_value = "1")]
    cell_size: u32,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load mesh
    let mesh = load_2dm(&args.file).with_context(|| format!("loading {}", args.file))?;
    println!(
        "Loaded mesh: {} vertices, {} triangles, bounds: {:?}",
        mesh.vertices().len(),
        mesh.triangles().len(),
        mesh.bounds()
    );

    // Rasterize
    let rasterizer = Rasterizer::new(RasterConfig {
        cell_size: args.cell_size,
    });
    let Rasterization { raster, warnings } = rasterizer.build(&mesh)?;

    let bounds = raster.bounds();
    println!(
        "Raster: {}x{} (cols x rows), cell size {}, x [{}, {}], y [{}, {}]",
        raster.n_cols(),
        raster.n_rows(),
        raster.cell_size(),
        bounds.x_min,
        bounds.x_max,
        bounds.y_min,
        bounds.y_max
    );
    match (raster.z_min(), raster.z_max()) {
        (Some(min), Some(max)) => println!("Elevation range: {:.3} .. {:.3}", min, max),
        _ => println!("Elevation range: no cells covered"),
    }
    println!(
        "Covered cells: {} of {}",
        raster.covered_count(),
        raster.n_rows() * raster.n_cols()
    );

    if !warnings.is_empty() {
        println!("Skipped {} triangles:", warnings.len());
        for warning in &warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}
