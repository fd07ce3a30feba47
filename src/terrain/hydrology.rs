//! Region elevation and river carving

use std::collections::HashSet;
use std::time::Instant;

use rand::{Rng, RngCore};

use crate::cancel::CancelToken;
use crate::config::MapConfig;
use crate::error::Result;
use crate::graph::{Graph, VertexId};

/// Factor applied to a blocking downhill neighbor's elevation during river carving
///
/// When the lowest neighbor is not strictly lower than the current vertex it is
/// lowered to this fraction of the current elevation, so every walk descends.
/// Tunable; it is a heuristic, not a hydrological model.
pub const DOWNHILL_LOWERING_FACTOR: f64 = 0.9999;

/// Set every region's elevation to the mean of its corners' and track the maximum
///
/// Returns the highest region elevation, which is also stored on the graph.
pub fn assign_region_elevations(graph: &mut Graph) -> f64 {
    let mut max = 0.0f64;
    for id in graph.region_ids() {
        let corners = &graph.region(id).corners;
        let elevation = if corners.is_empty() {
            0.0
        } else {
            corners.iter().map(|&v| graph.vertex(v).elevation).sum::<f64>() / corners.len() as f64
        };
        graph.region_mut(id).elevation = elevation;
        max = max.max(elevation);
    }
    graph.set_max_elevation(max);
    max
}

/// Walk downhill from `start` until reaching ocean or coast
///
/// Downhill neighbors are memoized in `Vertex::downslope`. On success the river
/// count of every vertex on the path and of every boundary followed is
/// incremented. A walk fails, leaving river counts untouched, when a vertex has
/// no neighbor to descend to or when it comes back to a vertex already on the
/// path.
pub fn carve_river(graph: &mut Graph, start: VertexId) -> bool {
    let mut path: Vec<VertexId> = Vec::new();
    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut current = start;

    loop {
        let vertex = graph.vertex(current);
        if vertex.ocean || vertex.coast {
            break;
        }
        if !visited.insert(current) {
            return false;
        }

        let memoized = vertex.downslope;
        let down = match memoized {
            Some(down) => down,
            None => {
                let lowest = vertex
                    .adjacent
                    .iter()
                    .copied()
                    .filter(|&a| a != current)
                    .min_by(|&a, &b| {
                        graph
                            .vertex(a)
                            .elevation
                            .total_cmp(&graph.vertex(b).elevation)
                            .then(a.cmp(&b))
                    });
                match lowest {
                    Some(down) => {
                        graph.vertex_mut(current).downslope = Some(down);
                        down
                    }
                    None => return false,
                }
            }
        };

        let elevation = graph.vertex(current).elevation;
        if graph.vertex(down).elevation >= elevation {
            graph.vertex_mut(down).elevation = elevation * DOWNHILL_LOWERING_FACTOR;
        }

        path.push(current);
        current = down;
    }

    for v in path {
        graph.vertex_mut(v).river += 1;
        if let Some(down) = graph.vertex(v).downslope {
            if let Some(edge) = graph.boundary_between(v, down) {
                graph.boundary_mut(edge).river += 1;
            }
        }
    }
    true
}

/// Attempt `config.river_candidates(|vertices|)` rivers from uniformly random sources
///
/// Returns how many of them reached the sea.
///
/// # Errors
///
/// [`crate::MapError::Cancelled`] when `cancel` trips between two candidates.
pub fn carve_rivers(
    graph: &mut Graph,
    config: &MapConfig,
    rng: &mut dyn RngCore,
    cancel: &CancelToken,
) -> Result<usize> {
    let start = Instant::now();
    let count = graph.vertices().len();
    if count == 0 {
        return Ok(0);
    }

    let candidates = config.river_candidates(count);
    let mut carved = 0;
    for _ in 0..candidates {
        cancel.check()?;
        let source = graph.vertices()[rng.gen_range(0..count)].id();
        if carve_river(graph, source) {
            carved += 1;
        }
    }

    log::debug!(
        "[Hydrology] {} of {} candidate rivers reached the sea in {:?}",
        carved,
        candidates,
        start.elapsed()
    );

    Ok(carved)
}
