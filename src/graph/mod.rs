//! Region/Vertex/Boundary graph
//!
//! The Voronoi diagram and its Delaunay dual are stored as three parallel
//! arenas. Entities reference each other by typed index, and an entity's id
//! is its position in its arena: assigned once when it is added, never changed.
//!
//! - [`Region`]: a Voronoi cell around one site (a Delaunay vertex)
//! - [`Vertex`]: a Voronoi vertex where three or more regions meet
//! - [`Boundary`]: separates two regions and connects two vertices

pub mod builder;

pub use builder::build_graph;

use crate::biome::Biome;
use crate::geometry::{self, Point, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Position of the entity in its arena
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Stable identity of a [`Region`]
    RegionId
);
arena_id!(
    /// Stable identity of a [`Vertex`]
    VertexId
);
arena_id!(
    /// Stable identity of a [`Boundary`]
    BoundaryId
);

/// A Voronoi cell around one sample site
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    /// Site location (the Delaunay vertex)
    pub site: Point,

    /// Regions sharing a boundary with this one; always symmetric
    pub neighbors: Vec<RegionId>,
    /// Vertices of the cell polygon (unordered)
    pub corners: Vec<VertexId>,
    /// Boundaries of the cell (unordered)
    pub borders: Vec<BoundaryId>,

    /// Touches the map border
    pub border: bool,
    pub water: bool,
    pub ocean: bool,
    pub coast: bool,

    /// Mean elevation of the corners
    pub elevation: f64,
    /// Mean moisture of the corners
    pub moisture: f64,
    /// Area of the corner polygon (0 when degenerate)
    pub area: f64,

    pub biome: Option<Biome>,
    /// Tectonic plate tag, owned by an external collaborator
    pub plate: Option<u32>,
    /// Political region tag, owned by an external collaborator
    pub political: Option<u32>,

    /// Seed for this region's noisy edges
    pub noise_seed: u64,
}

impl Region {
    fn new(id: RegionId, site: Point) -> Self {
        Self {
            id,
            site,
            neighbors: Vec::new(),
            corners: Vec::new(),
            borders: Vec::new(),
            border: false,
            water: false,
            ocean: false,
            coast: false,
            elevation: 0.0,
            moisture: 0.0,
            area: 0.0,
            biome: None,
            plate: None,
            political: None,
            noise_seed: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Check if this region is a neighbor of another region
    #[inline]
    pub fn is_neighbor_of(&self, other: RegionId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// A Voronoi vertex shared by three or more regions
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    pub location: Point,

    /// Regions this vertex is a corner of
    pub touches: Vec<RegionId>,
    /// Vertices connected by a boundary; never contains this vertex itself
    pub adjacent: Vec<VertexId>,
    /// Boundaries ending at this vertex
    pub protrudes: Vec<BoundaryId>,

    /// Lies on a side of the map bounds
    pub border: bool,
    pub water: bool,
    pub ocean: bool,
    pub coast: bool,

    pub elevation: f64,
    pub moisture: f64,
    /// Number of carved rivers flowing through this vertex
    pub river: u32,
    /// Downhill neighbor picked by river carving
    pub downslope: Option<VertexId>,
}

impl Vertex {
    fn new(id: VertexId, location: Point) -> Self {
        Self {
            id,
            location,
            touches: Vec::new(),
            adjacent: Vec::new(),
            protrudes: Vec::new(),
            border: false,
            water: false,
            ocean: false,
            coast: false,
            elevation: 0.0,
            moisture: 0.0,
            river: 0,
            downslope: None,
        }
    }

    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Neither ocean nor coast
    #[inline]
    pub fn is_land(&self) -> bool {
        !self.ocean && !self.coast
    }
}

/// An edge of the dual graph
///
/// `d0`/`d1` are the Delaunay endpoints (regions), `v0`/`v1` the Voronoi
/// endpoints (vertices). Vertex endpoints are stored in coordinate order, a
/// missing endpoint sorting first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Boundary {
    id: BoundaryId,
    pub d0: Option<RegionId>,
    pub d1: Option<RegionId>,
    pub v0: Option<VertexId>,
    pub v1: Option<VertexId>,
    /// Midpoint of `v0`-`v1`, present when both vertices are
    pub midpoint: Option<Point>,
    /// Number of carved rivers following this boundary
    pub river: u32,
    /// Seed for the noisy edge synthesizer
    pub noise_seed: u64,
}

impl Boundary {
    #[inline]
    pub fn id(&self) -> BoundaryId {
        self.id
    }

    /// Both regions and both vertices are present
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.d0.is_some() && self.d1.is_some() && self.v0.is_some() && self.v1.is_some()
    }

    /// The region on the other side from `region`
    pub fn other_region(&self, region: RegionId) -> Option<RegionId> {
        match (self.d0, self.d1) {
            (Some(a), b) if a == region => b,
            (a, Some(b)) if b == region => a,
            _ => None,
        }
    }

    /// The vertex at the other end from `vertex`
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        match (self.v0, self.v1) {
            (Some(a), b) if a == vertex => b,
            (a, Some(b)) if b == vertex => a,
            _ => None,
        }
    }
}

/// The cross-linked region/vertex/boundary graph of one generated map
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Graph {
    bounds: Rect,
    regions: Vec<Region>,
    vertices: Vec<Vertex>,
    boundaries: Vec<Boundary>,
    max_elevation: f64,
}

impl Graph {
    /// Create an empty graph for the given map bounds
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            regions: Vec::new(),
            vertices: Vec::new(),
            boundaries: Vec::new(),
            max_elevation: 0.0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Regions in id order
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Vertices in id order
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Boundaries in id order
    #[inline]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Every region, mutably; the arena itself can only grow through `add_region`
    pub fn regions_mut(&mut self) -> std::slice::IterMut<'_, Region> {
        self.regions.iter_mut()
    }

    pub fn vertices_mut(&mut self) -> std::slice::IterMut<'_, Vertex> {
        self.vertices.iter_mut()
    }

    pub fn boundaries_mut(&mut self) -> std::slice::IterMut<'_, Boundary> {
        self.boundaries.iter_mut()
    }

    /// Region ids in order; holds no borrow of the graph
    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.regions.len()).map(RegionId)
    }

    /// Vertex ids in order; holds no borrow of the graph
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    /// Add a region; its id is the next free index
    pub fn add_region(&mut self, site: Point) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(Region::new(id, site));
        id
    }

    /// Add a vertex; its id is the next free index
    pub fn add_vertex(&mut self, location: Point) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::new(id, location));
        id
    }

    /// Add a boundary and populate every cross-link it implies
    ///
    /// Adjacency lists stay free of duplicates, and a boundary whose two
    /// vertex endpoints coincide does not make the vertex adjacent to itself.
    pub fn add_boundary(
        &mut self,
        regions: [Option<RegionId>; 2],
        vertices: [Option<VertexId>; 2],
    ) -> BoundaryId {
        let id = BoundaryId(self.boundaries.len());
        let [d0, d1] = regions;
        let [v0, v1] = vertices;
        let midpoint = self.midpoint_of(v0, v1);
        self.boundaries.push(Boundary {
            id,
            d0,
            d1,
            v0,
            v1,
            midpoint,
            river: 0,
            noise_seed: 0,
        });

        for d in [d0, d1].into_iter().flatten() {
            self.regions[d.0].borders.push(id);
        }
        for v in [v0, v1].into_iter().flatten() {
            push_unique(&mut self.vertices[v.0].protrudes, id);
        }

        if let (Some(a), Some(b)) = (d0, d1) {
            if a != b {
                push_unique(&mut self.regions[a.0].neighbors, b);
                push_unique(&mut self.regions[b.0].neighbors, a);
            }
        }
        if let (Some(a), Some(b)) = (v0, v1) {
            if a != b {
                push_unique(&mut self.vertices[a.0].adjacent, b);
                push_unique(&mut self.vertices[b.0].adjacent, a);
            }
        }

        for d in [d0, d1].into_iter().flatten() {
            for v in [v0, v1].into_iter().flatten() {
                push_unique(&mut self.regions[d.0].corners, v);
                push_unique(&mut self.vertices[v.0].touches, d);
            }
        }

        id
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.0]
    }

    #[inline]
    pub fn region_mut(&mut self, id: RegionId) -> &mut Region {
        &mut self.regions[id.0]
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.0]
    }

    #[inline]
    pub fn boundary(&self, id: BoundaryId) -> &Boundary {
        &self.boundaries[id.0]
    }

    #[inline]
    pub fn boundary_mut(&mut self, id: BoundaryId) -> &mut Boundary {
        &mut self.boundaries[id.0]
    }

    /// Look up a region by raw index, `None` when out of range
    pub fn get_region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// The boundary connecting two vertices, if any
    pub fn boundary_between(&self, a: VertexId, b: VertexId) -> Option<BoundaryId> {
        self.vertex(a).protrudes.iter().copied().find(|&e| {
            let edge = self.boundary(e);
            (edge.v0 == Some(a) && edge.v1 == Some(b)) || (edge.v0 == Some(b) && edge.v1 == Some(a))
        })
    }

    /// The boundary separating two regions, if any
    pub fn boundary_between_regions(&self, a: RegionId, b: RegionId) -> Option<BoundaryId> {
        self.region(a)
            .borders
            .iter()
            .copied()
            .find(|&e| self.boundary(e).other_region(a) == Some(b))
    }

    /// Vertices that are neither ocean nor coast, in id order
    pub fn land_vertices(&self) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.is_land())
            .map(|v| v.id)
            .collect()
    }

    /// Highest region elevation, for normalization by later stages
    #[inline]
    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    pub(crate) fn set_max_elevation(&mut self, max: f64) {
        self.max_elevation = max;
    }

    /// Corner locations of a region
    pub fn corner_locations(&self, id: RegionId) -> Vec<Point> {
        self.region(id)
            .corners
            .iter()
            .map(|&v| self.vertex(v).location)
            .collect()
    }

    /// Mean of a region's corner locations, `None` without corners
    pub fn corner_centroid(&self, id: RegionId) -> Option<Point> {
        geometry::mean(self.region(id).corners.iter().map(|&v| self.vertex(v).location))
    }

    /// Area of a region's corner polygon; 0 for fewer than 3 corners
    pub fn region_area(&self, id: RegionId) -> f64 {
        geometry::polygon_area(&self.corner_locations(id))
    }

    /// Horizontal extent of a region's corners; 0 for fewer than 2 corners
    pub fn region_width(&self, id: RegionId) -> f64 {
        let corners = self.corner_locations(id);
        if corners.len() < 2 {
            return 0.0;
        }
        let (min, max) = corners
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });
        max - min
    }

    /// Recompute every boundary midpoint from the current vertex locations
    pub fn refresh_midpoints(&mut self) {
        for i in 0..self.boundaries.len() {
            let (v0, v1) = (self.boundaries[i].v0, self.boundaries[i].v1);
            self.boundaries[i].midpoint = self.midpoint_of(v0, v1);
        }
    }

    fn midpoint_of(&self, v0: Option<VertexId>, v1: Option<VertexId>) -> Option<Point> {
        match (v0, v1) {
            (Some(a), Some(b)) => Some(self.vertex(a).location.lerp(self.vertex(b).location, 0.5)),
            _ => None,
        }
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}
