//! Raw Voronoi/Delaunay diagram construction
//!
//! The graph builder only needs the diagram's sites, each site's clipped cell
//! polygon and the list of (Delaunay pair, Voronoi segment) edges. Any source
//! producing those can stand in through [`DiagramSource`]; the default one
//! wraps the `voronoice` crate.

use std::collections::BTreeSet;
use std::time::Instant;

use voronoice::{BoundingBox, VoronoiBuilder};

use crate::error::{MapError, Result};
use crate::geometry::{Point, Rect};

/// A Delaunay edge paired with its dual Voronoi segment
///
/// A Voronoi endpoint is `None` when that part of the segment lies outside the
/// map bounds; both are `None` when none of it is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    pub sites: [Option<Point>; 2],
    pub vertices: [Option<Point>; 2],
}

/// Output of the diagram primitive
#[derive(Debug, Clone, Default)]
pub struct RawDiagram {
    /// Sites of the diagram (sites outside the bounds may have been dropped)
    pub sites: Vec<Point>,
    /// Cell polygon of each site, clipped to the bounds
    pub cells: Vec<Vec<Point>>,
    /// Delaunay/Voronoi edge pairs
    pub edges: Vec<RawEdge>,
}

/// Supplies the raw Voronoi diagram for a site set
pub trait DiagramSource: Send + Sync {
    fn build(&self, sites: &[Point], bounds: Rect) -> Result<RawDiagram>;
}

/// Diagram source backed by `voronoice`
///
/// Delaunay pairs come from the triangulation; the Voronoi segment of a pair
/// is the set of polygon vertices the two clipped cells have in common.
#[derive(Debug, Clone, Copy)]
pub struct VoronoiceDiagram {
    /// Distance under which two cell vertices count as the same point,
    /// relative to the bounds' half-perimeter
    pub relative_tolerance: f64,
}

impl Default for VoronoiceDiagram {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-9,
        }
    }
}

impl DiagramSource for VoronoiceDiagram {
    fn build(&self, sites: &[Point], bounds: Rect) -> Result<RawDiagram> {
        if sites.len() < 3 {
            return Err(MapError::DiagramFailed(format!(
                "at least 3 sites are required (got {})",
                sites.len()
            )));
        }

        let start = Instant::now();
        let origin = bounds.center();

        // voronoice clips against a box centered on the origin
        let centered: Vec<voronoice::Point> = sites
            .iter()
            .map(|p| voronoice::Point {
                x: p.x - origin.x,
                y: p.y - origin.y,
            })
            .collect();

        let voronoi = VoronoiBuilder::default()
            .set_sites(centered)
            .set_bounding_box(BoundingBox::new_centered(bounds.width, bounds.height))
            .build()
            .ok_or_else(|| MapError::DiagramFailed("degenerate sites".into()))?;

        let restore = |p: &voronoice::Point| Point::new(p.x + origin.x, p.y + origin.y);

        let diagram_sites: Vec<Point> = voronoi.sites().iter().map(restore).collect();
        let cells: Vec<Vec<Point>> = voronoi
            .iter_cells()
            .map(|cell| cell.iter_vertices().map(restore).collect())
            .collect();

        // Unique Delaunay pairs, ordered for deterministic output
        let triangles = &voronoi.triangulation().triangles;
        let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
        for t in 0..triangles.len() / 3 {
            let corners = [triangles[3 * t], triangles[3 * t + 1], triangles[3 * t + 2]];
            for (i, j) in [(0, 1), (1, 2), (2, 0)] {
                let (a, b) = (corners[i], corners[j]);
                if a != b {
                    pairs.insert((a.min(b), a.max(b)));
                }
            }
        }

        let tolerance = self.relative_tolerance * (bounds.width + bounds.height);
        let edges: Vec<RawEdge> = pairs
            .into_iter()
            .filter(|&(a, b)| a < cells.len() && b < cells.len())
            .map(|(a, b)| {
                let shared = shared_vertices(&cells[a], &cells[b], tolerance);
                let vertices = match shared.as_slice() {
                    [] => [None, None],
                    [only] => [Some(*only), Some(*only)],
                    [first, second, ..] => [Some(*first), Some(*second)],
                };
                RawEdge {
                    sites: [Some(diagram_sites[a]), Some(diagram_sites[b])],
                    vertices,
                }
            })
            .collect();

        log::debug!(
            "[Voronoi] {} sites -> {} cells, {} edges in {:?}",
            sites.len(),
            cells.len(),
            edges.len(),
            start.elapsed()
        );

        Ok(RawDiagram {
            sites: diagram_sites,
            cells,
            edges,
        })
    }
}

/// Vertices of `a` that also appear in `b`, in `a`'s order, without repeats
fn shared_vertices(a: &[Point], b: &[Point], tolerance: f64) -> Vec<Point> {
    let mut shared: Vec<Point> = Vec::with_capacity(2);
    for &p in a {
        let in_b = b.iter().any(|q| p.distance(*q) <= tolerance);
        let seen = shared.iter().any(|s| p.distance(*s) <= tolerance);
        if in_b && !seen {
            shared.push(p);
        }
    }
    shared
}
