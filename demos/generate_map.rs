//! Example: Generate a Voronoi island map
//!
//! Runs the whole pipeline and prints a summary. Set `RUST_LOG=debug` to see
//! per-stage timings.

use std::collections::HashMap;

use env_logger::Env;
use voronoi_mapgen::*;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    println!("Voronoi Map Generation Example");
    println!("==============================\n");

    let config = MapConfigBuilder::new()
        .seed(42)
        .bounds(Rect::from_size(1000.0, 1000.0))
        .site_count(2000)
        .lloyd_iterations(2)
        .unwrap()
        .point_precision(10.0)
        .unwrap()
        .resolution_scale(1.0)
        .unwrap()
        .build()
        .unwrap();

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Sites: {}", config.site_count);
    println!("  Lloyd Iterations: {}", config.lloyd_iterations);
    println!("  River Density: {:.4}", config.river_density);
    println!();

    let map = VoronoiMap::generate(config).expect("Failed to generate map");
    let graph = map.graph();

    let land = graph.regions().iter().filter(|r| !r.water).count();
    let lakes = graph.regions().iter().filter(|r| r.water && !r.ocean).count();
    let river_vertices = graph.vertices().iter().filter(|v| v.river > 0).count();

    println!("Statistics:");
    println!("  Regions: {} ({} land, {} lake)", graph.regions().len(), land, lakes);
    println!("  Vertices: {} ({} on rivers)", graph.vertices().len(), river_vertices);
    println!("  Boundaries: {}", graph.boundaries().len());
    println!("  Max elevation: {:.3}", graph.max_elevation());
    println!();

    let mut biomes: HashMap<Biome, usize> = HashMap::new();
    for region in graph.regions() {
        if let Some(biome) = region.biome {
            *biomes.entry(biome).or_insert(0) += 1;
        }
    }

    println!("Biomes:");
    for biome in Biome::ALL {
        if let Some(count) = biomes.get(&biome) {
            let [r, g, b, _] = BasicColorMapper.map_color(&biome);
            println!(
                "  {:26} {:5}  #{:02x}{:02x}{:02x}{}",
                format!("{:?}", biome),
                count,
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                if biome.is_water() { "  (water)" } else { "" }
            );
        }
    }

    let center = graph.bounds().center();
    if let Some(id) = map.find_region_at(center) {
        let region = graph.region(id);
        println!(
            "\nRegion at map center: {} (elevation {:.3}, moisture {:.3}, {:?})",
            id.index(),
            region.elevation,
            region.moisture,
            region.biome
        );
    }

    println!("\nGeneration complete!");
}
