//! Color mapping for biomes

use crate::terrain::{Biome, BiomeColor};

/// Trait for mapping a classification to a vertex color
///
/// Implement this to recolor a world without touching the classifier.
pub trait ColorMapper<T> {
    /// Map a value to an RGB color
    fn map_color(&self, value: &T) -> BiomeColor;
}

/// Per-biome color table, defaulting to [`Biome::color`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiomePalette {
    colors: [BiomeColor; Biome::COUNT],
}

impl BiomePalette {
    /// Replace the color of one biome
    pub fn with_color(mut self, biome: Biome, color: BiomeColor) -> Self {
        self.set_color(biome, color);
        self
    }

    pub fn set_color(&mut self, biome: Biome, color: BiomeColor) {
        self.colors[biome.index()] = color;
    }

    #[inline]
    pub fn color(&self, biome: Biome) -> BiomeColor {
        self.colors[biome.index()]
    }
}

impl Default for BiomePalette {
    fn default() -> Self {
        Self {
            colors: Biome::ALL.map(Biome::color),
        }
    }
}

impl ColorMapper<Biome> for BiomePalette {
    fn map_color(&self, biome: &Biome) -> BiomeColor {
        self.color(*biome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_matches_biome_table() {
        let palette = BiomePalette::default();
        for biome in Biome::ALL {
            assert_eq!(palette.map_color(&biome), biome.color());
        }
    }

    #[test]
    fn test_override_single_biome() {
        let palette = BiomePalette::default().with_color(Biome::Desert, [1.0, 0.0, 1.0]);

        assert_eq!(palette.map_color(&Biome::Desert), [1.0, 0.0, 1.0]);
        assert_eq!(palette.map_color(&Biome::Forest), Biome::Forest.color());
    }

    #[test]
    fn test_water_is_blue_dominant() {
        let palette = BiomePalette::default();
        for biome in Biome::ALL.into_iter().filter(|b| b.is_water()) {
            let [r, g, b] = palette.map_color(&biome);
            assert!(b >= r && b >= g, "{:?}", biome);
        }
    }
}
