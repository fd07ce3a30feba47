//! Moisture diffusion from fresh water and rivers

use std::collections::VecDeque;
use std::time::Instant;

use crate::graph::Graph;

/// Moisture kept per step away from a wet vertex
const DIFFUSION_FACTOR: f64 = 0.9;

/// Run the whole moisture stage: diffuse, normalize land, average onto regions
pub fn assign_moisture(graph: &mut Graph) {
    let start = Instant::now();
    assign_corner_moisture(graph);
    redistribute_moisture(graph);
    assign_region_moisture(graph);
    log::debug!("[Moisture] Assigned in {:?}", start.elapsed());
}

/// Seed moisture at lakes and large rivers and diffuse it breadth-first
///
/// Ocean and coast vertices end at exactly 1.0.
pub fn assign_corner_moisture(graph: &mut Graph) {
    let mut queue = VecDeque::new();

    for vertex in graph.vertices_mut() {
        vertex.moisture = 0.0;
        if (vertex.water && !vertex.ocean) || vertex.river > 2 {
            vertex.moisture = if vertex.river > 0 {
                (0.05 * vertex.river as f64).min(3.0)
            } else {
                1.0
            };
            queue.push_back(vertex.id());
        }
    }

    while let Some(q) = queue.pop_front() {
        let spread = graph.vertex(q).moisture * DIFFUSION_FACTOR;
        for i in 0..graph.vertex(q).adjacent.len() {
            let r = graph.vertex(q).adjacent[i];
            if spread > graph.vertex(r).moisture {
                graph.vertex_mut(r).moisture = spread;
                queue.push_back(r);
            }
        }
    }

    for vertex in graph.vertices_mut() {
        if vertex.ocean || vertex.coast {
            vertex.moisture = 1.0;
        }
    }
}

/// Replace land moisture by its rank, spreading it evenly over [0, 1)
///
/// Ties are broken by vertex id.
pub fn redistribute_moisture(graph: &mut Graph) {
    let mut land = graph.land_vertices();
    land.sort_by(|&a, &b| {
        graph
            .vertex(a)
            .moisture
            .total_cmp(&graph.vertex(b).moisture)
            .then(a.cmp(&b))
    });

    let count = land.len() as f64;
    for (rank, v) in land.into_iter().enumerate() {
        graph.vertex_mut(v).moisture = rank as f64 / count;
    }
}

/// Set every region's moisture to the mean of its corners'
pub fn assign_region_moisture(graph: &mut Graph) {
    for id in graph.region_ids() {
        let corners = &graph.region(id).corners;
        let moisture = if corners.is_empty() {
            0.0
        } else {
            corners.iter().map(|&v| graph.vertex(v).moisture).sum::<f64>() / corners.len() as f64
        };
        graph.region_mut(id).moisture = moisture;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::graph::VertexId;

    /// Vertices 0..n in a line; vertex 0 is a lake, the last one ocean
    fn line(n: usize) -> (Graph, Vec<VertexId>) {
        let mut graph = Graph::new(Rect::from_size(100.0, 100.0));
        let region = graph.add_region(Point::new(50.0, 50.0));
        let ids: Vec<VertexId> = (0..n)
            .map(|i| graph.add_vertex(Point::new(i as f64, 0.0)))
            .collect();
        for pair in ids.windows(2) {
            graph.add_boundary([Some(region), None], [Some(pair[0]), Some(pair[1])]);
        }
        graph.vertex_mut(ids[0]).water = true;
        let last = ids[n - 1];
        graph.vertex_mut(last).water = true;
        graph.vertex_mut(last).ocean = true;
        (graph, ids)
    }

    #[test]
    fn test_diffusion_decays_from_lake() {
        let (mut graph, ids) = line(5);
        assign_corner_moisture(&mut graph);

        assert_eq!(graph.vertex(ids[0]).moisture, 1.0);
        assert!((graph.vertex(ids[1]).moisture - 0.9).abs() < 1e-12);
        assert!((graph.vertex(ids[2]).moisture - 0.81).abs() < 1e-12);
        assert!(graph.vertex(ids[3]).moisture < graph.vertex(ids[2]).moisture);
        assert_eq!(graph.vertex(ids[4]).moisture, 1.0, "ocean is forced to 1.0");
    }

    #[test]
    fn test_large_river_seeds_moisture() {
        let (mut graph, ids) = line(4);
        graph.vertex_mut(ids[0]).water = false;
        graph.vertex_mut(ids[1]).river = 10;
        assign_corner_moisture(&mut graph);

        assert!((graph.vertex(ids[1]).moisture - 0.5).abs() < 1e-12);
        assert!((graph.vertex(ids[0]).moisture - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_small_river_does_not_seed() {
        let (mut graph, ids) = line(3);
        graph.vertex_mut(ids[0]).water = false;
        graph.vertex_mut(ids[1]).river = 2;
        assign_corner_moisture(&mut graph);
        assert_eq!(graph.vertex(ids[0]).moisture, 0.0);
        assert_eq!(graph.vertex(ids[1]).moisture, 0.0);
    }

    #[test]
    fn test_moisture_bounds() {
        let (mut graph, ids) = line(8);
        graph.vertex_mut(ids[6]).coast = true;
        assign_moisture(&mut graph);

        for vertex in graph.vertices() {
            if vertex.ocean || vertex.coast {
                assert_eq!(vertex.moisture, 1.0);
            } else {
                assert!((0.0..1.0).contains(&vertex.moisture));
            }
        }
    }

    #[test]
    fn test_rank_preserves_order() {
        let (mut graph, ids) = line(6);
        assign_corner_moisture(&mut graph);
        let before: Vec<f64> = ids[..5].iter().map(|&v| graph.vertex(v).moisture).collect();
        redistribute_moisture(&mut graph);
        let after: Vec<f64> = ids[..5].iter().map(|&v| graph.vertex(v).moisture).collect();

        for i in 0..5 {
            for j in 0..5 {
                if before[i] < before[j] {
                    assert!(after[i] < after[j]);
                }
            }
        }
        assert_eq!(after.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
    }

    #[test]
    fn test_region_moisture_is_corner_mean() {
        let (mut graph, _) = line(4);
        for (i, vertex) in graph.vertices_mut().enumerate() {
            vertex.moisture = i as f64 * 0.1;
        }
        assign_region_moisture(&mut graph);
        assert!((graph.regions()[0].moisture - 0.15).abs() < 1e-12);
    }
}
