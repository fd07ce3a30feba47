//! Core Voronoi graph generation
//!
//! Sites are sampled, relaxed with Lloyd's algorithm, turned into a raw
//! Voronoi diagram and finally into the cross-linked [`Graph`].

mod lloyd;
mod sites;
mod voronoi;

pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use sites::{SiteGenerator, UniformSites};
pub use voronoi::{DiagramSource, RawDiagram, RawEdge, VoronoiceDiagram};

use rand::RngCore;

use crate::config::MapConfig;
use crate::error::Result;
use crate::graph::{build_graph, Graph};

/// Generate the bare graph (geometry and topology, no terrain) for a configuration
pub fn generate_graph(
    config: &MapConfig,
    site_generator: &dyn SiteGenerator,
    source: &dyn DiagramSource,
    rng: &mut dyn RngCore,
) -> Result<Graph> {
    // Step 1: Sample sites
    let sites = site_generator.generate(config.site_count, config.bounds, rng);

    // Step 2: Relax them
    let sites = lloyd_relaxation(sites, config.bounds, config.lloyd_iterations, source)?;

    // Step 3-4: Final diagram, then the graph on top of it
    let diagram = source.build(&sites, config.bounds)?;
    Ok(build_graph(&diagram, config, rng))
}
