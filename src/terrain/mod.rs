//! Terrain shaping: corner elevations, water classification, rivers and moisture
//!
//! The shape of the land is supplied through [`TerrainShaper`]. The stages
//! that run on top of it ([`hydrology`], [`moisture`]) are fixed.

pub mod hydrology;
pub mod moisture;

pub use hydrology::{assign_region_elevations, carve_river, carve_rivers, DOWNHILL_LOWERING_FACTOR};
pub use moisture::assign_moisture;

use std::collections::VecDeque;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::{Rng, RngCore};

use crate::graph::Graph;

/// Fraction of a region's corners that must be water for it to be a lake
pub const LAKE_THRESHOLD: f64 = 0.3;

/// Hook populating elevation and water topology before hydrology runs
pub trait TerrainShaper: Send + Sync {
    /// Set `Vertex::elevation` (and `Vertex::water` as the island mask) on every vertex
    fn assign_corner_elevations(&self, graph: &mut Graph, rng: &mut dyn RngCore);

    /// Set the water/ocean/coast flags on regions and vertices
    fn assign_ocean_coast_and_land(&self, graph: &mut Graph);
}

/// Default shaper: one noise-shaped island in the middle of the map
///
/// A corner is land when fractal noise beats a threshold that rises with the
/// distance from the map center. Elevation grows with the graph distance from
/// the map border, much faster over land than over water, and land elevations
/// are finally reshaped so that low ground is more common than peaks.
#[derive(Debug, Clone, Copy)]
pub struct IslandShaper {
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Noise frequency over the normalized [-1, 1] map coordinates
    pub frequency: f64,
}

impl Default for IslandShaper {
    fn default() -> Self {
        Self {
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            frequency: 2.0,
        }
    }
}

impl IslandShaper {
    fn noise(&self, seed: u32) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(seed)
            .set_octaves(self.octaves)
            .set_persistence(self.persistence)
            .set_lacunarity(self.lacunarity)
    }
}

impl TerrainShaper for IslandShaper {
    fn assign_corner_elevations(&self, graph: &mut Graph, rng: &mut dyn RngCore) {
        let noise = self.noise(rng.gen());
        let bounds = graph.bounds();
        let center = bounds.center();

        for vertex in graph.vertices_mut() {
            let nx = 2.0 * (vertex.location.x - center.x) / bounds.width;
            let ny = 2.0 * (vertex.location.y - center.y) / bounds.height;
            let height = 0.5 + 0.5 * noise.get([nx * self.frequency, ny * self.frequency]);
            let inside = height > 0.3 + 0.3 * (nx * nx + ny * ny);
            vertex.water = vertex.border || !inside;
        }

        // Breadth-first from the border; a step between land corners climbs a full unit
        let mut elevation = vec![f64::INFINITY; graph.vertices().len()];
        let mut queue = VecDeque::new();
        for vertex in graph.vertices() {
            if vertex.border {
                elevation[vertex.id().index()] = 0.0;
                queue.push_back(vertex.id());
            }
        }

        while let Some(q) = queue.pop_front() {
            let from = graph.vertex(q);
            for &s in &from.adjacent {
                let mut next = elevation[q.index()] + 0.01;
                if !from.water && !graph.vertex(s).water {
                    next += 1.0;
                }
                if next < elevation[s.index()] {
                    elevation[s.index()] = next;
                    queue.push_back(s);
                }
            }
        }

        for (vertex, e) in graph.vertices_mut().zip(elevation) {
            vertex.elevation = if e.is_finite() { e } else { 0.0 };
        }
    }

    fn assign_ocean_coast_and_land(&self, graph: &mut Graph) {
        classify_water(graph);
        redistribute_elevations(graph);
    }
}

/// Flood ocean in from the map border, mark lakes and coasts
fn classify_water(graph: &mut Graph) {
    let mut queue = VecDeque::new();

    for id in graph.region_ids() {
        let corners = graph.region(id).corners.clone();
        if graph.region(id).border {
            graph.region_mut(id).ocean = true;
            for &v in &corners {
                graph.vertex_mut(v).water = true;
            }
            queue.push_back(id);
        }
        let wet = corners.iter().filter(|&&v| graph.vertex(v).water).count();
        let region = graph.region_mut(id);
        region.water = region.ocean || wet as f64 >= corners.len() as f64 * LAKE_THRESHOLD;
    }

    while let Some(p) = queue.pop_front() {
        for n in graph.region(p).neighbors.clone() {
            let region = graph.region_mut(n);
            if region.water && !region.ocean {
                region.ocean = true;
                queue.push_back(n);
            }
        }
    }

    for id in graph.region_ids() {
        let (ocean, land) = graph
            .region(id)
            .neighbors
            .iter()
            .fold((0, 0), |(o, l), &n| {
                let r = graph.region(n);
                (o + r.ocean as usize, l + !r.water as usize)
            });
        graph.region_mut(id).coast = ocean > 0 && land > 0;
    }

    for id in graph.vertex_ids() {
        let touches = graph.vertex(id).touches.len();
        let (ocean, land) = graph
            .vertex(id)
            .touches
            .iter()
            .fold((0, 0), |(o, l), &r| {
                let r = graph.region(r);
                (o + r.ocean as usize, l + !r.water as usize)
            });
        let vertex = graph.vertex_mut(id);
        vertex.ocean = touches > 0 && ocean == touches;
        vertex.coast = ocean > 0 && land > 0;
        vertex.water = vertex.border || (land != touches && !vertex.coast);
    }
}

/// Rescale land elevations so that the fraction of land below `x` is `1 - (1 - x)^2`
///
/// Ocean and coast corners are flattened to 0.
fn redistribute_elevations(graph: &mut Graph) {
    const SCALE_FACTOR: f64 = 1.1;

    let mut land = graph.land_vertices();
    land.sort_by(|&a, &b| {
        graph
            .vertex(a)
            .elevation
            .total_cmp(&graph.vertex(b).elevation)
            .then(a.cmp(&b))
    });

    let span = land.len().saturating_sub(1).max(1) as f64;
    for (i, &v) in land.iter().enumerate() {
        let y = i as f64 / span;
        let x = SCALE_FACTOR.sqrt() - (SCALE_FACTOR * (1.0 - y)).sqrt();
        graph.vertex_mut(v).elevation = x.min(1.0);
    }

    for vertex in graph.vertices_mut() {
        if vertex.ocean || vertex.coast {
            vertex.elevation = 0.0;
        }
    }
}
