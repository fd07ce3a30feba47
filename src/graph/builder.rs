//! Graph construction from a raw Voronoi/Delaunay diagram
//!
//! Turns the diagram's (Delaunay pair, Voronoi segment) list into the
//! cross-linked [`Graph`], merging Voronoi vertices that coincide after
//! quantization, then smooths the interior corners once.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;

use rand::{Rng, RngCore};

use super::{Graph, RegionId, VertexId};
use crate::config::MapConfig;
use crate::generation::RawDiagram;
use crate::geometry::{self, Point};

/// Build the region/vertex/boundary graph for a raw diagram
///
/// # Algorithm
///
/// 1. One region per diagram site, ids in site order, each with a noise seed
///    drawn from `rng`
/// 2. For each raw edge: sites resolve to regions by exact location; Voronoi
///    endpoints resolve to vertices through a lookup keyed by
///    [`MapConfig::vertex_key`], creating (and border-flagging) a vertex on
///    first sighting
/// 3. Cross-links are populated by [`Graph::add_boundary`]
/// 4. Every non-border vertex moves to the centroid of the sites it touches,
///    then midpoints and region areas are recomputed
pub fn build_graph(diagram: &RawDiagram, config: &MapConfig, rng: &mut dyn RngCore) -> Graph {
    let start = Instant::now();
    let mut graph = Graph::new(config.bounds);

    let mut site_lookup: HashMap<(u64, u64), RegionId> =
        HashMap::with_capacity(diagram.sites.len());
    for &site in &diagram.sites {
        let id = graph.add_region(site);
        graph.region_mut(id).noise_seed = rng.gen();
        site_lookup.insert(site_key(site), id);
    }

    let mut vertex_lookup: HashMap<(i64, i64), VertexId> = HashMap::new();
    let tolerance = config.border_tolerance();

    for edge in &diagram.edges {
        let regions = edge.sites.map(|s| s.and_then(|p| site_lookup.get(&site_key(p)).copied()));
        let [a, b] = edge.vertices;
        let (a, b) = match vertex_order(a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };

        let v0 = a.map(|p| vertex_for(&mut graph, &mut vertex_lookup, config, tolerance, p));
        let v1 = b.map(|p| vertex_for(&mut graph, &mut vertex_lookup, config, tolerance, p));

        let id = graph.add_boundary(regions, [v0, v1]);
        let seed = boundary_seed(&graph, regions, id.index());
        graph.boundary_mut(id).noise_seed = seed;
    }

    for i in 0..graph.regions.len() {
        let border = graph.regions[i]
            .corners
            .iter()
            .any(|&v| graph.vertex(v).border);
        graph.regions[i].border = border;
    }

    smooth_corners(&mut graph);

    for i in 0..graph.regions.len() {
        let id = graph.regions[i].id();
        graph.regions[i].area = graph.region_area(id);
    }

    log::debug!(
        "[Graph] Built {} regions, {} vertices, {} boundaries in {:?}",
        graph.regions.len(),
        graph.vertices.len(),
        graph.boundaries.len(),
        start.elapsed()
    );

    graph
}

/// Move every non-border vertex to the centroid of the sites it touches
///
/// A single pass, distinct from Lloyd relaxation (which moves sites).
/// Boundary midpoints are refreshed afterwards.
pub fn smooth_corners(graph: &mut Graph) {
    let moved: Vec<Option<Point>> = graph
        .vertices
        .iter()
        .map(|v| {
            if v.border {
                None
            } else {
                geometry::mean(v.touches.iter().map(|&r| graph.region(r).site))
            }
        })
        .collect();

    for (vertex, location) in graph.vertices.iter_mut().zip(moved) {
        if let Some(location) = location {
            vertex.location = location;
        }
    }

    graph.refresh_midpoints();
}

fn vertex_for(
    graph: &mut Graph,
    lookup: &mut HashMap<(i64, i64), VertexId>,
    config: &MapConfig,
    tolerance: f64,
    p: Point,
) -> VertexId {
    *lookup.entry(config.vertex_key(p)).or_insert_with(|| {
        let id = graph.add_vertex(p);
        graph.vertex_mut(id).border = config.bounds.on_border(p, tolerance);
        id
    })
}

#[inline]
fn site_key(p: Point) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

/// Coordinate order of two optional vertex locations, missing sorting first
fn vertex_order(a: Option<Point>, b: Option<Point>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(p), Some(q)) => p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)),
    }
}

/// Derive a boundary's seed from its regions' seeds and its own id
///
/// Keeps every boundary's noise independent of the order in which boundaries
/// are synthesized.
fn boundary_seed(graph: &Graph, regions: [Option<RegionId>; 2], index: usize) -> u64 {
    let seeds = regions.map(|r| r.map_or(0, |r| graph.region(r).noise_seed));
    splitmix64(seeds[0].wrapping_add(seeds[1]) ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
