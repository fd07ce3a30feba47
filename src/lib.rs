//! Voronoi-based terrain map generation
//!
//! A standalone library that turns random sample points into a cross-linked
//! Voronoi/Delaunay graph and derives elevation, rivers, moisture, biomes and
//! noisy region borders over it. Rendering is left to the caller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_mapgen::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .bounds(Rect::from_size(1000.0, 1000.0))
//!     .site_count(2000)
//!     .lloyd_iterations(2).unwrap()
//!     .point_precision(10.0).unwrap()
//!     .resolution_scale(1.0).unwrap()
//!     .build().unwrap();
//!
//! let map = VoronoiMap::generate(config).unwrap();
//!
//! // Noisy borders for rendering
//! let edges = map.build_noisy_edges(NoisyEdgeOptions::default(), &CancelToken::new()).unwrap();
//! println!("{} regions, {} noisy boundaries", map.region_count(), edges.len());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-region lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and the graph

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod cancel;
pub mod graph;
pub mod generation;
pub mod terrain;
pub mod biome;
pub mod noisy_edges;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use config::{
    MapConfig, MapConfigBuilder, NoisyEdgeOptions, DEFAULT_RIVER_DENSITY, MAX_SUBDIVISION_DEPTH,
};
pub use geometry::{Point, Rect};
pub use cancel::CancelToken;
pub use graph::{Boundary, BoundaryId, Graph, Region, RegionId, Vertex, VertexId};
pub use generation::{
    DiagramSource, LloydOptions, RawDiagram, RawEdge, SiteGenerator, UniformSites,
    VoronoiceDiagram,
};
pub use terrain::{IslandShaper, TerrainShaper};
pub use biome::{
    BasicColorMapper, Biome, BiomeClassifier, Color, ColorMapper, CustomColorMapper,
    WhittakerClassifier,
};
pub use noisy_edges::{NoisyEdges, NoisyPath};
pub use map::{Hooks, VoronoiMap};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
