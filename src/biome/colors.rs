//! Color mapping for biomes

use std::collections::HashMap;

use super::Biome;

/// RGBA color type
pub type Color = [f32; 4];

/// Trait for mapping a tag (usually a [`Biome`]) to a color
pub trait ColorMapper<T> {
    /// Map a tag to an RGBA color
    fn map_color(&self, tag: &T) -> Color;
}

fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Default palette for [`Biome`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicColorMapper;

impl ColorMapper<Biome> for BasicColorMapper {
    fn map_color(&self, biome: &Biome) -> Color {
        match biome {
            Biome::Ocean => rgb(0x44447a),
            Biome::Lake => rgb(0x336699),
            Biome::Marsh => rgb(0x2f6666),
            Biome::Ice => rgb(0x99ffff),
            Biome::Beach => rgb(0xa09077),
            Biome::Snow => rgb(0xffffff),
            Biome::Tundra => rgb(0xbbbbaa),
            Biome::Bare => rgb(0x888888),
            Biome::Scorched => rgb(0x555555),
            Biome::Taiga => rgb(0x99aa77),
            Biome::Shrubland => rgb(0x889977),
            Biome::TemperateDesert => rgb(0xc9d29b),
            Biome::TemperateRainForest => rgb(0x448855),
            Biome::TemperateDeciduousForest => rgb(0x679459),
            Biome::Grassland => rgb(0x88aa55),
            Biome::TropicalRainForest => rgb(0x337755),
            Biome::TropicalSeasonalForest => rgb(0x559944),
            Biome::SubtropicalDesert => rgb(0xd2b98b),
        }
    }
}

/// Palette with per-biome overrides on top of [`BasicColorMapper`]
#[derive(Debug, Clone, Default)]
pub struct CustomColorMapper {
    pub overrides: HashMap<Biome, Color>,
}

impl CustomColorMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color of one biome
    pub fn with(mut self, biome: Biome, color: Color) -> Self {
        self.overrides.insert(biome, color);
        self
    }
}

impl ColorMapper<Biome> for CustomColorMapper {
    fn map_color(&self, biome: &Biome) -> Color {
        self.overrides
            .get(biome)
            .copied()
            .unwrap_or_else(|| BasicColorMapper.map_color(biome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_color_mapper() {
        let mapper = BasicColorMapper;

        let ocean = mapper.map_color(&Biome::Ocean);
        assert_eq!(ocean[3], 1.0);
        assert!(ocean[2] > ocean[0]); // Blue dominates

        let grass = mapper.map_color(&Biome::Grassland);
        assert_eq!(grass[3], 1.0);
        assert!(grass[1] > grass[2]); // Green dominates

        assert_eq!(mapper.map_color(&Biome::Snow), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_custom_color_mapper() {
        let custom = CustomColorMapper::new()
            .with(Biome::Ocean, [0.0, 0.2, 0.5, 1.0])
            .with(Biome::Grassland, [0.3, 0.5, 0.1, 1.0]);

        assert_eq!(custom.map_color(&Biome::Ocean), [0.0, 0.2, 0.5, 1.0]);
        assert_eq!(custom.map_color(&Biome::Grassland), [0.3, 0.5, 0.1, 1.0]);
        assert_eq!(custom.map_color(&Biome::Beach), BasicColorMapper.map_color(&Biome::Beach));
    }

    #[test]
    fn test_all_biomes_have_distinct_colors() {
        let mapper = BasicColorMapper;
        for (i, a) in Biome::ALL.iter().enumerate() {
            for b in &Biome::ALL[i + 1..] {
                assert_ne!(mapper.map_color(a), mapper.map_color(b), "{:?} vs {:?}", a, b);
            }
        }
    }
}
