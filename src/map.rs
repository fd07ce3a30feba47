//! VoronoiMap main structure

use std::collections::HashSet;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biome::{assign_biomes, Biome, BiomeClassifier, Color, ColorMapper, WhittakerClassifier};
use crate::cancel::CancelToken;
use crate::config::{MapConfig, NoisyEdgeOptions};
use crate::error::{MapError, Result};
use crate::generation::{
    generate_graph, DiagramSource, SiteGenerator, UniformSites, VoronoiceDiagram,
};
use crate::graph::{Graph, Region, RegionId};
use crate::noisy_edges::NoisyEdges;
use crate::terrain::{
    assign_moisture, assign_region_elevations, carve_rivers, IslandShaper, TerrainShaper,
};

#[cfg(feature = "spatial-index")]
use crate::geometry::Point;
#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// The pluggable stages of map generation
///
/// `Hooks::default()` gives uniform sites, the `voronoice` diagram, a noise
/// island and the Whittaker biome table.
pub struct Hooks {
    pub sites: Box<dyn SiteGenerator>,
    pub diagram: Box<dyn DiagramSource>,
    pub terrain: Box<dyn TerrainShaper>,
    pub biomes: Box<dyn BiomeClassifier>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            sites: Box::new(UniformSites::default()),
            diagram: Box::new(VoronoiceDiagram::default()),
            terrain: Box::new(IslandShaper::default()),
            biomes: Box::new(WhittakerClassifier),
        }
    }
}

/// A generated map: the finished region/vertex/boundary graph
///
/// # Examples
///
/// ```
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .bounds(Rect::from_size(600.0, 600.0))
///     .site_count(500)
///     .lloyd_iterations(2)
///     .unwrap()
///     .point_precision(10.0)
///     .unwrap()
///     .resolution_scale(1.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = VoronoiMap::generate(config).unwrap();
/// println!("Generated {} regions", map.region_count());
///
/// if let Ok(region) = map.region(0) {
///     println!("Region 0 biome: {:?}", region.biome);
/// }
/// ```
#[derive(Clone)]
pub struct VoronoiMap {
    config: MapConfig,
    graph: Graph,

    /// Position-to-region lookups (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl VoronoiMap {
    /// Generate a map with the default hooks
    pub fn generate(config: MapConfig) -> Result<Self> {
        Self::generate_with_hooks(config, &Hooks::default())
    }

    /// Generate a map with custom hooks
    pub fn generate_with_hooks(config: MapConfig, hooks: &Hooks) -> Result<Self> {
        Self::generate_with_cancel(config, hooks, &CancelToken::new())
    }

    /// Generate a map, aborting with [`MapError::Cancelled`] once `cancel` trips
    ///
    /// Stages run in order: sites and relaxation, graph build, corner
    /// elevations, ocean/coast/land, rivers, region elevations, moisture,
    /// biomes. All randomness comes from one generator seeded with
    /// `config.seed`, so equal configurations give identical maps.
    pub fn generate_with_cancel(
        config: MapConfig,
        hooks: &Hooks,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let total_start = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        // Step 1: Geometry
        let mut graph =
            generate_graph(&config, hooks.sites.as_ref(), hooks.diagram.as_ref(), &mut rng)?;
        cancel.check()?;

        // Step 2: Terrain
        let terrain_start = Instant::now();
        hooks.terrain.assign_corner_elevations(&mut graph, &mut rng);
        hooks.terrain.assign_ocean_coast_and_land(&mut graph);
        log::debug!("[Map] Terrain shaped in {:?}", terrain_start.elapsed());

        // Step 3: Hydrology
        let rivers = carve_rivers(&mut graph, &config, &mut rng, cancel)?;
        let max_elevation = assign_region_elevations(&mut graph);

        // Step 4: Moisture and biomes
        assign_moisture(&mut graph);
        assign_biomes(&mut graph, hooks.biomes.as_ref());

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let sites: Vec<Point> = graph.regions().iter().map(|r| r.site).collect();
            SpatialIndex::new(&sites)
        };

        log::info!(
            "[Map] {} regions, {} vertices, {} boundaries, {} rivers, max elevation {:.3} in {:?}",
            graph.regions().len(),
            graph.vertices().len(),
            graph.boundaries().len(),
            rivers,
            max_elevation,
            total_start.elapsed()
        );

        Ok(Self {
            config,
            graph,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn region_count(&self) -> usize {
        self.graph.regions().len()
    }

    /// Get a region by index
    ///
    /// # Errors
    ///
    /// [`MapError::RegionNotFound`] if the index is out of bounds.
    pub fn region(&self, index: usize) -> Result<&Region> {
        self.graph.get_region(index).ok_or(MapError::RegionNotFound(index))
    }

    /// Find the region containing a position (requires spatial-index feature)
    ///
    /// `None` only for an empty map. Positions outside the bounds resolve to
    /// the nearest region.
    #[cfg(feature = "spatial-index")]
    pub fn find_region_at(&self, position: Point) -> Option<RegionId> {
        self.spatial_index
            .find_nearest(position)
            .map(|i| self.graph.regions()[i].id())
    }

    /// Regions within `hops` neighbor steps of `center` (BFS), sorted by id
    ///
    /// Includes `center` itself; empty if `center` is not a region of this map.
    pub fn regions_within_hops(&self, center: RegionId, hops: usize) -> Vec<RegionId> {
        if center.index() >= self.graph.regions().len() {
            return vec![];
        }

        let mut visited = HashSet::new();
        let mut current = vec![center];
        visited.insert(center);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &id in &current {
                for &neighbor in &self.graph.region(id).neighbors {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut regions: Vec<RegionId> = visited.into_iter().collect();
        regions.sort();
        regions
    }

    /// Color of a region's biome; `None` for an unknown region
    pub fn region_color(&self, id: RegionId, mapper: &dyn ColorMapper<Biome>) -> Option<Color> {
        let region = self.graph.get_region(id.index())?;
        Some(mapper.map_color(&region.biome.unwrap_or_default()))
    }

    /// Tag every region with a political region, computed by `assign`
    ///
    /// Run before [`VoronoiMap::build_noisy_edges`]; political borders get
    /// sharper noisy edges.
    pub fn assign_political_regions<F>(&mut self, mut assign: F)
    where
        F: FnMut(&Graph, &Region) -> Option<u32>,
    {
        for id in self.graph.region_ids() {
            let tag = assign(&self.graph, self.graph.region(id));
            self.graph.region_mut(id).political = tag;
        }
    }

    /// Synthesize the noisy edges of every interior boundary
    pub fn build_noisy_edges(
        &self,
        options: NoisyEdgeOptions,
        cancel: &CancelToken,
    ) -> Result<NoisyEdges> {
        NoisyEdges::build(&self.graph, options, self.config.resolution_scale, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BasicColorMapper;
    use crate::config::MapConfigBuilder;
    use crate::geometry::Rect;

    fn config(seed: u64) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .bounds(Rect::from_size(600.0, 600.0))
            .site_count(400)
            .lloyd_iterations(2)
            .unwrap()
            .point_precision(10.0)
            .unwrap()
            .resolution_scale(1.0)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_map_generation() {
        let map = VoronoiMap::generate(config(42)).unwrap();
        assert_eq!(map.region_count(), 400);
        assert!(map.graph().max_elevation() > 0.0);
        assert!(map.graph().regions().iter().all(|r| r.biome.is_some()));
        assert!(map.graph().regions().iter().any(|r| r.ocean));
        assert!(map.graph().regions().iter().any(|r| !r.water));
    }

    #[test]
    fn test_determinism() {
        let a = VoronoiMap::generate(config(2024)).unwrap();
        let b = VoronoiMap::generate(config(2024)).unwrap();
        let (ga, gb) = (a.graph(), b.graph());

        assert_eq!(ga.regions().len(), gb.regions().len());
        assert_eq!(ga.vertices().len(), gb.vertices().len());
        assert_eq!(ga.boundaries().len(), gb.boundaries().len());
        for (ra, rb) in ga.regions().iter().zip(gb.regions()) {
            assert_eq!(ra.elevation, rb.elevation);
            assert_eq!(ra.moisture, rb.moisture);
            assert_eq!(ra.biome, rb.biome);
        }
        for (va, vb) in ga.vertices().iter().zip(gb.vertices()) {
            assert_eq!(va.elevation, vb.elevation);
            assert_eq!(va.river, vb.river);
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let map = VoronoiMap::generate(config(1)).unwrap();
        let graph = map.graph();
        for region in graph.regions() {
            for &n in &region.neighbors {
                assert!(graph.region(n).is_neighbor_of(region.id()));
            }
        }
    }

    #[test]
    fn test_river_monotonicity() {
        let map = VoronoiMap::generate(config(12345)).unwrap();
        let graph = map.graph();
        let sources: Vec<_> = graph.vertices().iter().filter(|v| v.river > 0).collect();
        assert!(!sources.is_empty(), "Some river should have formed");

        for source in sources {
            let mut seen = HashSet::new();
            let mut current = source.id();
            while let Some(down) = graph.vertex(current).downslope {
                assert!(seen.insert(current), "River path should not cycle");
                assert!(graph.vertex(down).elevation <= graph.vertex(current).elevation);
                current = down;
            }
            let mouth = graph.vertex(current);
            assert!(mouth.ocean || mouth.coast);
        }
    }

    #[test]
    fn test_moisture_bounds() {
        let map = VoronoiMap::generate(config(77)).unwrap();
        for vertex in map.graph().vertices() {
            if vertex.ocean || vertex.coast {
                assert_eq!(vertex.moisture, 1.0);
            } else {
                assert!((0.0..1.0).contains(&vertex.moisture));
            }
        }
    }

    #[test]
    fn test_cancelled_generation() {
        let token = CancelToken::new();
        token.cancel();
        let result = VoronoiMap::generate_with_cancel(config(5), &Hooks::default(), &token);
        assert!(matches!(result, Err(MapError::Cancelled)));
    }

    #[test]
    fn test_region_lookup() {
        let map = VoronoiMap::generate(config(8)).unwrap();
        assert!(map.region(0).is_ok());
        assert_eq!(map.region(400).unwrap_err(), MapError::RegionNotFound(400));
    }

    #[test]
    #[cfg(feature = "spatial-index")]
    fn test_find_region_at() {
        let map = VoronoiMap::generate(config(9)).unwrap();
        for region in map.graph().regions().iter().step_by(37) {
            assert_eq!(map.find_region_at(region.site), Some(region.id()));
        }
    }

    #[test]
    fn test_regions_within_hops() {
        let map = VoronoiMap::generate(config(10)).unwrap();
        let center = map.graph().regions()[200].id();

        assert_eq!(map.regions_within_hops(center, 0), vec![center]);

        let ring = map.regions_within_hops(center, 1);
        assert_eq!(ring.len(), map.graph().region(center).neighbors.len() + 1);
        let wider = map.regions_within_hops(center, 3);
        assert!(wider.len() > ring.len());
        assert!(ring.iter().all(|r| wider.contains(r)));
    }

    #[test]
    fn test_region_color() {
        let map = VoronoiMap::generate(config(11)).unwrap();
        let region = &map.graph().regions()[0];
        let color = map.region_color(region.id(), &BasicColorMapper).unwrap();
        assert_eq!(color, BasicColorMapper.map_color(&region.biome.unwrap()));
    }

    #[test]
    fn test_political_regions_and_noisy_edges() {
        let mut map = VoronoiMap::generate(config(13)).unwrap();
        let half = map.graph().bounds().center().x;
        map.assign_political_regions(|_, region| Some((region.site.x > half) as u32));

        assert!(map.graph().regions().iter().all(|r| r.political.is_some()));
        let edges = map
            .build_noisy_edges(NoisyEdgeOptions::default(), &CancelToken::new())
            .unwrap();
        let interior = map.graph().boundaries().iter().filter(|e| e.is_interior()).count();
        assert_eq!(edges.len(), interior);
    }
}
