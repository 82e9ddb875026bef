//! Example: Generate a world and inspect it
//!
//! Prints the partition grid, the mask and outline of region 0, and mesh
//! statistics. Set `RUST_LOG=debug` to see per-region logging.
//!
//! ```text
//! cargo run --example generate_world -- 709248357
//! ```

use std::collections::BTreeMap;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voronoi_terrain::*;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(709248357);

    let config = WorldConfigBuilder::new()
        .seed(seed)
        .world_size(80, 30)?
        .macro_size(20, 10)?
        .points_per_macro(2, 3)?
        .build()?;

    println!("Seed: {}", config.seed);
    println!(
        "World: {}x{} cells, {}x{} macro cells of {}x{}\n",
        config.width,
        config.height,
        config.macro_columns(),
        config.macro_rows(),
        config.macro_width,
        config.macro_height
    );

    let world = World::generate(config)?;
    println!("{}", world.partition());

    let mask = RegionMask::extract(world.partition(), 0)?;
    println!("Region 0 mask ({} cells):", mask.filled_count());
    println!("{}", mask);

    match world.region(0) {
        Some(region) => {
            println!(
                "Region 0: {} vertices, {} triangles ({:?}), biome {:?}",
                region.vertex_count(),
                region.triangle_count(),
                region.method,
                region.biome
            );
            println!("  Centroid: {:?}", region.centroid());
        }
        None => println!("Region 0 was skipped"),
    }

    let report = world.report();
    println!(
        "\nRegions: {} emitted, {} skipped, {} fan fallbacks",
        report.emitted, report.skipped, report.fan_fallbacks
    );

    let mut biomes = BTreeMap::new();
    for region in world.regions() {
        *biomes.entry(format!("{:?}", region.biome)).or_insert(0usize) += 1;
    }
    println!("\nBiome distribution:");
    for (biome, count) in &biomes {
        println!("  {}: {}", biome, count);
    }

    let mesh = generate_mesh(&world, &BiomePalette::default());
    println!("\nMesh:");
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Interleaved floats: {}", mesh.interleaved().len());

    Ok(())
}
