//! Example: Noisy region borders
//!
//! Splits the map into two political halves and prints how finely each kind
//! of boundary was subdivided.

use env_logger::Env;
use voronoi_mapgen::*;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = MapConfigBuilder::new()
        .seed(7)
        .bounds(Rect::from_size(800.0, 600.0))
        .site_count(1000)
        .lloyd_iterations(2)
        .unwrap()
        .point_precision(10.0)
        .unwrap()
        .resolution_scale(1.0)
        .unwrap()
        .build()
        .unwrap();

    let mut map = VoronoiMap::generate(config).expect("Failed to generate map");

    let half = map.graph().bounds().center().x;
    map.assign_political_regions(|_, region| {
        if region.water {
            None
        } else {
            Some((region.site.x > half) as u32)
        }
    });

    let edges = map
        .build_noisy_edges(NoisyEdgeOptions::default(), &CancelToken::new())
        .expect("Failed to build noisy edges");

    let graph = map.graph();
    let (mut coast, mut political, mut other) = (Vec::new(), Vec::new(), Vec::new());
    for edge in graph.boundaries().iter().filter(|e| e.is_interior()) {
        let Some((path0, path1)) = edges.paths(edge.id()) else {
            continue;
        };
        let points = path0.len() + path1.len();
        let (d0, d1) = (graph.region(edge.d0.unwrap()), graph.region(edge.d1.unwrap()));
        if d0.coast || d1.coast {
            coast.push(points);
        } else if d0.political != d1.political {
            political.push(points);
        } else {
            other.push(points);
        }
    }

    let average = |v: &[usize]| v.iter().sum::<usize>() as f64 / v.len().max(1) as f64;
    println!("Noisy Edges Demo");
    println!("{:-<48}", "");
    println!("{:20} {:>10} {:>14}", "boundary", "count", "avg points");
    println!("{:20} {:>10} {:>14.1}", "coast", coast.len(), average(&coast));
    println!("{:20} {:>10} {:>14.1}", "political", political.len(), average(&political));
    println!("{:20} {:>10} {:>14.1}", "other", other.len(), average(&other));

    if let Some(region) = graph.regions().iter().find(|r| !r.border && !r.water) {
        let outline = edges.region_outline(graph, region.id());
        println!(
            "\nRegion {} outline: {} points around {} corners",
            region.id().index(),
            outline.len(),
            region.corners.len()
        );
    }
}
