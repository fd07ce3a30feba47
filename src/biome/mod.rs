//! Biome classification
//!
//! Runs once per region after elevation and moisture are final. The classifier
//! is a pure function of the region and the graph around it.

mod colors;

pub use colors::{BasicColorMapper, Color, ColorMapper, CustomColorMapper};

use crate::graph::{Graph, Region};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Biome tag of a region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Biome {
    #[default]
    Ocean,
    Lake,
    Marsh,
    Ice,
    Beach,
    Snow,
    Tundra,
    Bare,
    Scorched,
    Taiga,
    Shrubland,
    TemperateDesert,
    TemperateRainForest,
    TemperateDeciduousForest,
    Grassland,
    TropicalRainForest,
    TropicalSeasonalForest,
    SubtropicalDesert,
}

impl Biome {
    /// Every biome, in declaration order
    pub const ALL: [Biome; 18] = [
        Biome::Ocean,
        Biome::Lake,
        Biome::Marsh,
        Biome::Ice,
        Biome::Beach,
        Biome::Snow,
        Biome::Tundra,
        Biome::Bare,
        Biome::Scorched,
        Biome::Taiga,
        Biome::Shrubland,
        Biome::TemperateDesert,
        Biome::TemperateRainForest,
        Biome::TemperateDeciduousForest,
        Biome::Grassland,
        Biome::TropicalRainForest,
        Biome::TropicalSeasonalForest,
        Biome::SubtropicalDesert,
    ];

    /// Check if this biome is open water
    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::Lake | Biome::Marsh | Biome::Ice)
    }
}

/// Hook mapping a finished region to its biome
///
/// Precondition: elevation, moisture and the water flags are already set.
pub trait BiomeClassifier: Send + Sync {
    fn biome(&self, graph: &Graph, region: &Region) -> Biome;
}

/// Whittaker-style lookup on (elevation, moisture)
///
/// Elevation is normalized by the graph's tracked maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhittakerClassifier;

impl BiomeClassifier for WhittakerClassifier {
    fn biome(&self, graph: &Graph, region: &Region) -> Biome {
        let max = graph.max_elevation();
        let e = if max > 0.0 { region.elevation / max } else { region.elevation };
        let m = region.moisture;

        if region.ocean {
            Biome::Ocean
        } else if region.water {
            if e < 0.1 {
                Biome::Marsh
            } else if e > 0.8 {
                Biome::Ice
            } else {
                Biome::Lake
            }
        } else if region.coast {
            Biome::Beach
        } else if e > 0.8 {
            match m {
                m if m > 0.50 => Biome::Snow,
                m if m > 0.33 => Biome::Tundra,
                m if m > 0.16 => Biome::Bare,
                _ => Biome::Scorched,
            }
        } else if e > 0.6 {
            match m {
                m if m > 0.66 => Biome::Taiga,
                m if m > 0.33 => Biome::Shrubland,
                _ => Biome::TemperateDesert,
            }
        } else if e > 0.3 {
            match m {
                m if m > 0.83 => Biome::TemperateRainForest,
                m if m > 0.50 => Biome::TemperateDeciduousForest,
                m if m > 0.16 => Biome::Grassland,
                _ => Biome::TemperateDesert,
            }
        } else {
            match m {
                m if m > 0.66 => Biome::TropicalRainForest,
                m if m > 0.33 => Biome::TropicalSeasonalForest,
                m if m > 0.16 => Biome::Grassland,
                _ => Biome::SubtropicalDesert,
            }
        }
    }
}

/// Classify every region
pub fn assign_biomes(graph: &mut Graph, classifier: &dyn BiomeClassifier) {
    for id in graph.region_ids() {
        let biome = classifier.biome(graph, graph.region(id));
        graph.region_mut(id).biome = Some(biome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    fn region_with(graph: &mut Graph, elevation: f64, moisture: f64) -> Region {
        let id = graph.add_region(Point::new(1.0, 1.0));
        let region = graph.region_mut(id);
        region.elevation = elevation;
        region.moisture = moisture;
        region.clone()
    }

    #[test]
    fn test_water_biomes() {
        let mut graph = Graph::new(Rect::from_size(10.0, 10.0));
        let mut ocean = region_with(&mut graph, 0.0, 1.0);
        ocean.ocean = true;
        ocean.water = true;
        assert_eq!(WhittakerClassifier.biome(&graph, &ocean), Biome::Ocean);

        let mut lake = region_with(&mut graph, 0.5, 0.5);
        lake.water = true;
        assert_eq!(WhittakerClassifier.biome(&graph, &lake), Biome::Lake);

        lake.elevation = 0.05;
        assert_eq!(WhittakerClassifier.biome(&graph, &lake), Biome::Marsh);

        let mut beach = region_with(&mut graph, 0.0, 0.9);
        beach.coast = true;
        assert_eq!(WhittakerClassifier.biome(&graph, &beach), Biome::Beach);
    }

    #[test]
    fn test_land_biomes_by_band() {
        let mut graph = Graph::new(Rect::from_size(10.0, 10.0));
        let cases = [
            (0.9, 0.9, Biome::Snow),
            (0.9, 0.1, Biome::Scorched),
            (0.7, 0.7, Biome::Taiga),
            (0.7, 0.1, Biome::TemperateDesert),
            (0.5, 0.9, Biome::TemperateRainForest),
            (0.5, 0.3, Biome::Grassland),
            (0.1, 0.9, Biome::TropicalRainForest),
            (0.1, 0.0, Biome::SubtropicalDesert),
        ];
        for (elevation, moisture, expected) in cases {
            let region = region_with(&mut graph, elevation, moisture);
            assert_eq!(WhittakerClassifier.biome(&graph, &region), expected);
        }
    }

    #[test]
    fn test_elevation_normalized_by_max() {
        let mut graph = Graph::new(Rect::from_size(10.0, 10.0));
        graph.set_max_elevation(2.0);
        // 1.8 / 2.0 = 0.9, the snow band
        let region = region_with(&mut graph, 1.8, 0.9);
        assert_eq!(WhittakerClassifier.biome(&graph, &region), Biome::Snow);
    }

    #[test]
    fn test_assign_biomes_tags_every_region() {
        let mut graph = Graph::new(Rect::from_size(10.0, 10.0));
        region_with(&mut graph, 0.1, 0.9);
        region_with(&mut graph, 0.9, 0.1);
        assign_biomes(&mut graph, &WhittakerClassifier);
        assert_eq!(graph.regions()[0].biome, Some(Biome::TropicalRainForest));
        assert_eq!(graph.regions()[1].biome, Some(Biome::Scorched));
    }

    #[test]
    fn test_is_water() {
        assert!(Biome::Ocean.is_water());
        assert!(Biome::Lake.is_water());
        assert!(!Biome::Beach.is_water());
        assert!(!Biome::Grassland.is_water());
    }
}
