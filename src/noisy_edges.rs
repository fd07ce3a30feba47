//! Noisy edge synthesis
//!
//! Every interior boundary is replaced by two jittered polylines, one from each
//! vertex to the boundary midpoint. Both regions sharing the boundary draw the
//! same two halves, so filled polygons meet without gaps.
//!
//! Each half is produced by recursively subdividing the quadrilateral spanned
//! by the vertex, the boundary midpoint and two points pulled toward the two
//! region sites. The random stream of a boundary is seeded from
//! `Boundary::noise_seed`, which depends only on the boundary and its regions,
//! so any subset of boundaries can be rebuilt in any order with the same result.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cancel::CancelToken;
use crate::config::{positive, NoisyEdgeOptions};
use crate::error::Result;
use crate::geometry::{interpolate, Point};
use crate::graph::{Boundary, BoundaryId, Graph, RegionId};

/// The two halves of one noisy boundary
#[derive(Debug, Clone, PartialEq)]
pub struct NoisyPath {
    /// From `v0` to the midpoint
    pub path0: Vec<Point>,
    /// From `v1` to the midpoint
    pub path1: Vec<Point>,
}

/// Cache of noisy paths keyed by boundary
#[derive(Debug, Clone)]
pub struct NoisyEdges {
    paths: Vec<Option<NoisyPath>>,
    options: NoisyEdgeOptions,
    resolution_scale: f64,
}

impl NoisyEdges {
    /// An empty cache; paths are built on demand by [`NoisyEdges::get_or_build`]
    ///
    /// # Errors
    ///
    /// [`crate::MapError::InvalidConfig`] for options rejected by
    /// [`NoisyEdgeOptions::validate`] or a non-positive `resolution_scale`.
    pub fn new(options: NoisyEdgeOptions, resolution_scale: f64) -> Result<Self> {
        options.validate()?;
        let resolution_scale = positive(resolution_scale, "resolution scale")?;
        Ok(Self {
            paths: Vec::new(),
            options,
            resolution_scale,
        })
    }

    /// Build the paths of every interior boundary
    ///
    /// # Errors
    ///
    /// [`crate::MapError::InvalidConfig`] as for [`NoisyEdges::new`], and
    /// [`crate::MapError::Cancelled`] when `cancel` trips; checked once per boundary.
    pub fn build(
        graph: &Graph,
        options: NoisyEdgeOptions,
        resolution_scale: f64,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let start = Instant::now();
        let mut edges = Self::new(options, resolution_scale)?;
        edges.paths = vec![None; graph.boundaries().len()];

        for edge in graph.boundaries() {
            cancel.check()?;
            edges.paths[edge.id().index()] = edges.synthesize(graph, edge);
        }

        log::debug!(
            "[NoisyEdges] {} of {} boundaries subdivided in {:?}",
            edges.len(),
            graph.boundaries().len(),
            start.elapsed()
        );

        Ok(edges)
    }

    /// Rebuild the paths around one region, e.g. after its tags changed
    pub fn rebuild_region(&mut self, graph: &Graph, region: RegionId) {
        self.fit(graph);
        for &e in &graph.region(region).borders {
            self.paths[e.index()] = self.synthesize(graph, graph.boundary(e));
        }
    }

    /// The cached path of a boundary, building it first if needed
    ///
    /// `None` for border boundaries, which are never subdivided.
    pub fn get_or_build(&mut self, graph: &Graph, boundary: BoundaryId) -> Option<&NoisyPath> {
        self.fit(graph);
        if self.paths[boundary.index()].is_none() {
            self.paths[boundary.index()] = self.synthesize(graph, graph.boundary(boundary));
        }
        self.paths[boundary.index()].as_ref()
    }

    pub fn path(&self, boundary: BoundaryId) -> Option<&NoisyPath> {
        self.paths.get(boundary.index()).and_then(Option::as_ref)
    }

    /// `(path0, path1)` of a boundary
    pub fn paths(&self, boundary: BoundaryId) -> Option<(&[Point], &[Point])> {
        self.path(boundary)
            .map(|p| (p.path0.as_slice(), p.path1.as_slice()))
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.paths.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outline of a region as one polyline, walking its boundaries around the site
    ///
    /// Cached boundaries contribute their noisy halves, the others a straight
    /// segment. Boundaries missing a vertex are skipped, so the outline of a
    /// region on the map border is open there.
    pub fn region_outline(&self, graph: &Graph, region: RegionId) -> Vec<Point> {
        let site = graph.region(region).site;

        let mut pieces: Vec<(f64, Vec<Point>)> = graph
            .region(region)
            .borders
            .iter()
            .filter_map(|&e| {
                let edge = graph.boundary(e);
                let (v0, v1) = (edge.v0?, edge.v1?);
                let (a, b) = (graph.vertex(v0).location, graph.vertex(v1).location);

                let mut piece = match self.path(e) {
                    Some(noisy) => {
                        let mut points = noisy.path0.clone();
                        points.extend(noisy.path1.iter().rev().skip(1));
                        points
                    }
                    None => vec![a, b],
                };
                // Counter-clockwise around the site
                if (a - site).perp_dot(b - site) < 0.0 {
                    piece.reverse();
                }
                let mid = edge.midpoint.unwrap_or_else(|| a.lerp(b, 0.5));
                let angle = (mid.y - site.y).atan2(mid.x - site.x);
                Some((angle, piece))
            })
            .collect();

        pieces.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut outline: Vec<Point> = Vec::new();
        for (_, piece) in pieces {
            for p in piece {
                if outline.last() != Some(&p) {
                    outline.push(p);
                }
            }
        }
        outline
    }

    fn fit(&mut self, graph: &Graph) {
        if self.paths.len() < graph.boundaries().len() {
            self.paths.resize(graph.boundaries().len(), None);
        }
    }

    fn synthesize(&self, graph: &Graph, edge: &Boundary) -> Option<NoisyPath> {
        let (d0, d1) = (edge.d0?, edge.d1?);
        let (v0, v1) = (edge.v0?, edge.v1?);
        let mid = edge.midpoint?;

        let (s0, s1) = (graph.region(d0).site, graph.region(d1).site);
        let (p0, p1) = (graph.vertex(v0).location, graph.vertex(v1).location);
        let f = self.options.tradeoff;
        let min_length = min_segment_length(graph, edge, &self.options, self.resolution_scale);

        let mut rng = ChaCha8Rng::seed_from_u64(edge.noise_seed);
        let mut subdivider = Subdivider {
            rng: &mut rng,
            min_length,
            max_depth: self.options.max_depth,
        };

        let path0 = subdivider.line(p0, interpolate(p0, s0, f), mid, interpolate(p0, s1, f));
        let path1 = subdivider.line(p1, interpolate(p1, s1, f), mid, interpolate(p1, s0, f));
        Some(NoisyPath { path0, path1 })
    }
}

/// Minimum segment length for a boundary, scaled by the map's resolution
///
/// Starts at the base length, or ten times it between two ocean regions. Each
/// of these lowers it, the smallest factor winning: different biomes (0.3),
/// different political tags (0.3), one side on the map border and the other
/// not (0.3), either side coast (0.1), a river along the boundary (0.1).
pub fn min_segment_length(
    graph: &Graph,
    edge: &Boundary,
    options: &NoisyEdgeOptions,
    resolution_scale: f64,
) -> f64 {
    let base = options.base_min_length * resolution_scale;
    let (Some(d0), Some(d1)) = (edge.d0, edge.d1) else {
        return base;
    };
    let (r0, r1) = (graph.region(d0), graph.region(d1));

    let mut factor: f64 = if r0.ocean && r1.ocean { 10.0 } else { 1.0 };
    if r0.biome != r1.biome {
        factor = factor.min(0.3);
    }
    if r0.political != r1.political {
        factor = factor.min(0.3);
    }
    if r0.border != r1.border {
        factor = factor.min(0.3);
    }
    if r0.coast || r1.coast || edge.river > 0 {
        factor = factor.min(0.1);
    }
    base * factor
}

struct Subdivider<'a> {
    rng: &'a mut ChaCha8Rng,
    min_length: f64,
    max_depth: u32,
}

impl Subdivider<'_> {
    /// Jittered polyline from `a` to `c` inside the quadrilateral `a b c d`
    fn line(&mut self, a: Point, b: Point, c: Point, d: Point) -> Vec<Point> {
        let mut points = vec![a];
        self.subdivide(a, b, c, d, 0, &mut points);
        points.push(c);
        points
    }

    fn subdivide(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        d: Point,
        depth: u32,
        points: &mut Vec<Point>,
    ) {
        if depth >= self.max_depth
            || a.distance(c) < self.min_length
            || b.distance(d) < self.min_length
        {
            return;
        }

        let p = self.rng.gen_range(0.2..=0.8);
        let q = self.rng.gen_range(0.2..=0.8);

        let e = interpolate(a, d, p);
        let f = interpolate(b, c, p);
        let g = interpolate(a, b, q);
        let i = interpolate(d, c, q);
        let h = interpolate(e, f, q);

        let s = self.rng.gen_range(-0.4..=0.4);
        let t = self.rng.gen_range(-0.4..=0.4);

        self.subdivide(a, interpolate(g, b, s), h, interpolate(e, d, t), depth + 1, points);
        points.push(h);
        self.subdivide(h, interpolate(f, c, s), c, interpolate(i, d, t), depth + 1, points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::config::MapConfigBuilder;
    use crate::error::MapError;
    use crate::generation::{generate_graph, UniformSites, VoronoiceDiagram};
    use crate::geometry::Rect;

    fn graph(seed: u64) -> Graph {
        let config = MapConfigBuilder::new()
            .seed(seed)
            .bounds(Rect::from_size(400.0, 400.0))
            .site_count(150)
            .lloyd_iterations(2)
            .unwrap()
            .point_precision(10.0)
            .unwrap()
            .resolution_scale(1.0)
            .unwrap()
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_graph(
            &config,
            &UniformSites::default(),
            &VoronoiceDiagram::default(),
            &mut rng,
        )
        .unwrap()
    }

    fn build(graph: &Graph) -> NoisyEdges {
        NoisyEdges::build(graph, NoisyEdgeOptions::default(), 1.0, &CancelToken::new()).unwrap()
    }

    #[test]
    fn test_paths_meet_at_midpoint() {
        let graph = graph(42);
        let edges = build(&graph);
        assert!(!edges.is_empty());

        for edge in graph.boundaries().iter().filter(|e| e.is_interior()) {
            let (path0, path1) = edges.paths(edge.id()).unwrap();
            let mid = edge.midpoint.unwrap();
            assert!(path0.last().unwrap().distance(mid) < 1e-9);
            assert!(path1.last().unwrap().distance(mid) < 1e-9);
            assert_eq!(path0[0], graph.vertex(edge.v0.unwrap()).location);
            assert_eq!(path1[0], graph.vertex(edge.v1.unwrap()).location);
        }
    }

    #[test]
    fn test_border_boundaries_skipped() {
        let mut graph = Graph::new(Rect::from_size(10.0, 10.0));
        let a = graph.add_region(Point::new(2.0, 5.0));
        let v0 = graph.add_vertex(Point::new(5.0, 0.0));
        let v1 = graph.add_vertex(Point::new(5.0, 10.0));
        let e = graph.add_boundary([Some(a), None], [Some(v0), Some(v1)]);

        let mut edges = build(&graph);
        assert!(edges.paths(e).is_none());
        assert!(edges.get_or_build(&graph, e).is_none());
        assert!(edges.is_empty());
    }

    #[test]
    fn test_deterministic_and_order_independent() {
        let graph = graph(7);
        let all = build(&graph);

        // Lazily build a single boundary into an empty cache
        let target = graph.boundaries().iter().rev().find(|e| e.is_interior()).unwrap().id();
        let mut lazy = NoisyEdges::new(NoisyEdgeOptions::default(), 1.0).unwrap();
        let single = lazy.get_or_build(&graph, target).cloned();

        assert_eq!(single.as_ref(), all.path(target));
        assert_eq!(build(&graph).path(target), all.path(target));
    }

    #[test]
    fn test_rebuild_region_after_retag() {
        let mut graph = graph(3);
        let mut edges = NoisyEdges::new(NoisyEdgeOptions::default(), 1.0).unwrap();
        let region = graph.regions().iter().find(|r| !r.border).unwrap().id();

        graph.region_mut(region).political = Some(1);
        edges.rebuild_region(&graph, region);

        for &e in &graph.region(region).borders {
            let edge = graph.boundary(e);
            if edge.is_interior() {
                let (path0, path1) = edges.paths(e).unwrap();
                assert_eq!(path0.last(), path1.last());
            }
        }
        // Only the retagged region's boundaries were built
        let interior = graph
            .region(region)
            .borders
            .iter()
            .filter(|&&e| graph.boundary(e).is_interior())
            .count();
        assert_eq!(edges.len(), interior);
    }

    #[test]
    fn test_threshold_table() {
        let mut graph = Graph::new(Rect::from_size(100.0, 100.0));
        let a = graph.add_region(Point::new(25.0, 50.0));
        let b = graph.add_region(Point::new(75.0, 50.0));
        let v0 = graph.add_vertex(Point::new(50.0, 0.0));
        let v1 = graph.add_vertex(Point::new(50.0, 100.0));
        let e = graph.add_boundary([Some(a), Some(b)], [Some(v0), Some(v1)]);
        let options = NoisyEdgeOptions::default();
        let length = |g: &Graph| min_segment_length(g, g.boundary(e), &options, 2.0);

        assert_eq!(length(&graph), 20.0);

        graph.region_mut(a).ocean = true;
        graph.region_mut(b).ocean = true;
        assert_eq!(length(&graph), 200.0);

        graph.region_mut(b).ocean = false;
        graph.region_mut(a).biome = Some(Biome::Ocean);
        graph.region_mut(b).biome = Some(Biome::Beach);
        assert!((length(&graph) - 6.0).abs() < 1e-9);

        graph.region_mut(b).coast = true;
        assert!((length(&graph) - 2.0).abs() < 1e-9);

        graph.region_mut(b).coast = false;
        graph.region_mut(b).biome = Some(Biome::Ocean);
        graph.boundary_mut(e).river = 1;
        assert!((length(&graph) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_outline_visits_every_corner() {
        let graph = graph(11);
        let edges = build(&graph);
        let region = graph.regions().iter().find(|r| !r.border).unwrap();

        let outline = edges.region_outline(&graph, region.id());
        for &v in &region.corners {
            let corner = graph.vertex(v).location;
            assert!(outline.iter().any(|p| p.distance(corner) < 1e-9));
        }
    }

    #[test]
    fn test_rejects_unbounded_options() {
        let graph = graph(5);
        let cancel = CancelToken::new();
        let zero_length = NoisyEdgeOptions {
            base_min_length: 0.0,
            ..NoisyEdgeOptions::default()
        };
        let nan_length = NoisyEdgeOptions {
            base_min_length: f64::NAN,
            ..NoisyEdgeOptions::default()
        };
        let wide = NoisyEdgeOptions {
            tradeoff: 1.5,
            ..NoisyEdgeOptions::default()
        };

        for options in [zero_length, nan_length, wide] {
            assert!(matches!(
                NoisyEdges::build(&graph, options, 1.0, &cancel),
                Err(MapError::InvalidConfig(_))
            ));
            assert!(NoisyEdges::new(options, 1.0).is_err());
        }
        for scale in [0.0, -2.0, f64::NAN] {
            assert!(matches!(
                NoisyEdges::build(&graph, NoisyEdgeOptions::default(), scale, &cancel),
                Err(MapError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_depth_bounds_point_count() {
        let mut graph = Graph::new(Rect::from_size(100.0, 100.0));
        let a = graph.add_region(Point::new(25.0, 50.0));
        let b = graph.add_region(Point::new(75.0, 50.0));
        let v0 = graph.add_vertex(Point::new(50.0, 0.0));
        let v1 = graph.add_vertex(Point::new(50.0, 100.0));
        let e = graph.add_boundary([Some(a), Some(b)], [Some(v0), Some(v1)]);

        let options = NoisyEdgeOptions::new(0.5, 1e-9, 4).unwrap();
        let edges = NoisyEdges::build(&graph, options, 1.0, &CancelToken::new()).unwrap();
        let (path0, path1) = edges.paths(e).unwrap();
        assert_eq!(path0.len(), (1 << 4) + 1);
        assert_eq!(path1.len(), (1 << 4) + 1);
    }

    #[test]
    fn test_build_cancelled() {
        let graph = graph(5);
        let token = CancelToken::new();
        token.cancel();
        let result = NoisyEdges::build(&graph, NoisyEdgeOptions::default(), 1.0, &token);
        assert!(matches!(result, Err(MapError::Cancelled)));
    }
}
