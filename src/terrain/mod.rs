//! Biome sampling and classification
//!
//! Combines elevation noise, a latitude temperature gradient and precipitation
//! noise into one [`Biome`] per query point.

mod noise;

pub use noise::{NoiseConfig, NoiseField, GRADIENT_COUNT, PERMUTATION_SIZE};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;

/// RGB color type
pub type BiomeColor = [f32; 3];

const IMPASSABLE_ELEVATION: f32 = 0.67;
const MOUNTAIN_ELEVATION: f32 = 0.62;
const LAND_ELEVATION: f32 = 0.50;
const SHALLOW_SEA_ELEVATION: f32 = 0.45;
const SEA_ELEVATION: f32 = 0.40;

const ARCTIC_TEMPERATURE: f32 = 0.10;
const TUNDRA_TEMPERATURE: f32 = 0.33;
const FOREST_TEMPERATURE: f32 = 0.66;
const SAVANNAH_TEMPERATURE: f32 = 0.85;

const RAINFOREST_PRECIPITATION: f32 = 0.55;

/// Climate-derived terrain category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Biome {
    /// Highest peaks, cannot be crossed
    ImpassableMountain,
    Mountain,
    /// Frozen land near the poles
    Arctic,
    Tundra,
    Forest,
    Savannah,
    /// Hot and dry
    Desert,
    /// Hot and wet
    Rainforest,
    ShallowSea,
    Sea,
    DeepSea,
}

impl Biome {
    /// Every biome, in classification order
    pub const ALL: [Biome; 11] = [
        Biome::ImpassableMountain,
        Biome::Mountain,
        Biome::Arctic,
        Biome::Tundra,
        Biome::Forest,
        Biome::Savannah,
        Biome::Desert,
        Biome::Rainforest,
        Biome::ShallowSea,
        Biome::Sea,
        Biome::DeepSea,
    ];

    /// Number of biome variants
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this biome in [`Biome::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Fixed display color of this biome
    pub fn color(self) -> BiomeColor {
        BIOME_COLORS[self.index()]
    }

    /// Check if this biome is water
    pub fn is_water(self) -> bool {
        matches!(self, Biome::ShallowSea | Biome::Sea | Biome::DeepSea)
    }

    /// Check if this biome is land
    pub fn is_land(self) -> bool {
        !self.is_water()
    }

    /// Apply the threshold cascade to a climate sample
    ///
    /// Elevation is checked first, from the highest band down; only the land
    /// band looks at temperature, and only the hottest land band looks at
    /// precipitation.
    pub fn from_sample(sample: &BiomeSample) -> Biome {
        let BiomeSample {
            elevation,
            temperature,
            precipitation,
        } = *sample;

        if elevation >= IMPASSABLE_ELEVATION {
            Biome::ImpassableMountain
        } else if elevation >= MOUNTAIN_ELEVATION {
            Biome::Mountain
        } else if elevation >= LAND_ELEVATION {
            if temperature <= ARCTIC_TEMPERATURE {
                Biome::Arctic
            } else if temperature <= TUNDRA_TEMPERATURE {
                Biome::Tundra
            } else if temperature <= FOREST_TEMPERATURE {
                Biome::Forest
            } else if temperature <= SAVANNAH_TEMPERATURE {
                Biome::Savannah
            } else if precipitation >= RAINFOREST_PRECIPITATION {
                Biome::Rainforest
            } else {
                Biome::Desert
            }
        } else if elevation >= SHALLOW_SEA_ELEVATION {
            Biome::ShallowSea
        } else if elevation >= SEA_ELEVATION {
            Biome::Sea
        } else {
            Biome::DeepSea
        }
    }
}

/// Indexed by [`Biome::index`]
const BIOME_COLORS: [BiomeColor; Biome::COUNT] = [
    [0.392, 0.392, 0.392], // ImpassableMountain
    [0.588, 0.588, 0.588], // Mountain
    [0.921, 0.921, 0.921], // Arctic
    [0.0, 0.392, 0.0],     // Tundra
    [0.0, 0.784, 0.0],     // Forest
    [0.784, 0.725, 0.0],   // Savannah
    [1.0, 0.784, 0.0],     // Desert
    [0.0, 0.529, 0.314],   // Rainforest
    [0.392, 0.588, 0.784], // ShallowSea
    [0.392, 0.392, 0.784], // Sea
    [0.196, 0.196, 0.784], // DeepSea
];

/// Climate values at one point, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BiomeSample {
    pub elevation: f32,
    pub temperature: f32,
    pub precipitation: f32,
}

/// Temperature at render-space `y`
///
/// World rows map to negative render-space y, so the equator sits at
/// `y = -world_height / 2`. Returns 1.0 on the equator falling linearly to
/// 0.0 at the poles when `temp_mult` is 1.0.
#[inline]
pub fn temperature(y: f32, world_height: f32, temp_mult: f32) -> f32 {
    temperature_at_latitude(world_height / 2.0 + y, world_height, temp_mult)
}

/// Temperature at a signed distance `latitude` from the equator
pub fn temperature_at_latitude(latitude: f32, world_height: f32, temp_mult: f32) -> f32 {
    let equator = world_height / 2.0;
    (1.0 - (latitude.abs() * temp_mult) / equator).clamp(0.0, 1.0)
}

/// Seed of the precipitation field, derived from the world seed
///
/// One `u32` drawn from a ChaCha8 stream seeded with `seed`, so precipitation
/// is independent of elevation but still fixed by the world seed.
pub fn precipitation_seed(seed: u32) -> u32 {
    ChaCha8Rng::seed_from_u64(seed as u64).gen()
}

/// Samples climate and classifies biomes for one world
///
/// Holds two independent noise fields (elevation and precipitation). Build it
/// once per world; sampling only reads the tables.
#[derive(Debug, Clone)]
pub struct BiomeClassifier {
    elevation: NoiseField,
    precipitation: NoiseField,
    noise: NoiseConfig,
    world_height: f32,
    temp_mult: f32,
}

impl BiomeClassifier {
    /// Create a classifier with the default octave parameters
    pub fn new(seed: u32, world_height: f32, temp_mult: f32) -> Self {
        Self::with_noise(seed, world_height, temp_mult, NoiseConfig::default())
    }

    /// Create a classifier with custom octave parameters
    pub fn with_noise(seed: u32, world_height: f32, temp_mult: f32, noise: NoiseConfig) -> Self {
        Self {
            elevation: NoiseField::new(seed),
            precipitation: NoiseField::new(precipitation_seed(seed)),
            noise,
            world_height,
            temp_mult,
        }
    }

    /// Create the classifier described by a world configuration
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::with_noise(
            config.seed,
            config.height as f32,
            config.temp_mult,
            config.noise,
        )
    }

    /// Sample elevation, temperature and precipitation at render-space (x, y)
    pub fn sample(&self, x: f32, y: f32) -> BiomeSample {
        let elevation = (self.elevation.sample_fbm(x, y, &self.noise) + 1.0) / 2.0;
        let precipitation = (self.precipitation.sample_fbm(x, y, &self.noise) + 1.0) / 2.0;

        BiomeSample {
            elevation,
            temperature: temperature(y, self.world_height, self.temp_mult),
            precipitation,
        }
    }

    /// Classify the biome at render-space (x, y)
    #[inline]
    pub fn classify(&self, x: f32, y: f32) -> Biome {
        Biome::from_sample(&self.sample(x, y))
    }
}

/// Classify a single point and return its color
///
/// Builds both noise fields on every call; use [`BiomeClassifier`] when
/// classifying more than a handful of points.
pub fn classify(x: f32, y: f32, seed: u32, world_height: f32, temp_mult: f32) -> BiomeColor {
    BiomeClassifier::new(seed, world_height, temp_mult)
        .classify(x, y)
        .color()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(elevation: f32, temperature: f32, precipitation: f32) -> BiomeSample {
        BiomeSample {
            elevation,
            temperature,
            precipitation,
        }
    }

    #[test]
    fn test_equator_and_poles() {
        assert_eq!(temperature_at_latitude(0.0, 600.0, 1.0), 1.0);
        assert_eq!(temperature_at_latitude(300.0, 600.0, 1.0), 0.0);
        assert_eq!(temperature_at_latitude(-300.0, 600.0, 1.0), 0.0);

        // Render-space rows run from 0 down to -height
        assert_eq!(temperature(-300.0, 600.0, 1.0), 1.0);
        assert_eq!(temperature(0.0, 600.0, 1.0), 0.0);
        assert_eq!(temperature(-600.0, 600.0, 1.0), 0.0);
    }

    #[test]
    fn test_temperature_multiplier_cools_world() {
        let mild = temperature_at_latitude(100.0, 600.0, 1.0);
        let cold = temperature_at_latitude(100.0, 600.0, 2.0);
        assert!(cold < mild);
        assert_eq!(temperature_at_latitude(250.0, 600.0, 2.0), 0.0);
    }

    #[test]
    fn test_elevation_cascade() {
        assert_eq!(Biome::from_sample(&sample(0.9, 0.5, 0.5)), Biome::ImpassableMountain);
        assert_eq!(Biome::from_sample(&sample(0.67, 0.5, 0.5)), Biome::ImpassableMountain);
        assert_eq!(Biome::from_sample(&sample(0.62, 0.5, 0.5)), Biome::Mountain);
        assert_eq!(Biome::from_sample(&sample(0.47, 0.5, 0.5)), Biome::ShallowSea);
        assert_eq!(Biome::from_sample(&sample(0.45, 0.5, 0.5)), Biome::ShallowSea);
        assert_eq!(Biome::from_sample(&sample(0.40, 0.5, 0.5)), Biome::Sea);
        assert_eq!(Biome::from_sample(&sample(0.1, 0.5, 0.5)), Biome::DeepSea);
    }

    #[test]
    fn test_land_temperature_bands() {
        assert_eq!(Biome::from_sample(&sample(0.55, 0.05, 0.9)), Biome::Arctic);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.10, 0.9)), Biome::Arctic);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.30, 0.9)), Biome::Tundra);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.50, 0.9)), Biome::Forest);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.80, 0.9)), Biome::Savannah);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.95, 0.9)), Biome::Rainforest);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.95, 0.55)), Biome::Rainforest);
        assert_eq!(Biome::from_sample(&sample(0.55, 0.95, 0.2)), Biome::Desert);
    }

    #[test]
    fn test_precipitation_ignored_outside_hot_band() {
        for precipitation in [0.0, 0.5, 1.0] {
            assert_eq!(Biome::from_sample(&sample(0.55, 0.5, precipitation)), Biome::Forest);
            assert_eq!(Biome::from_sample(&sample(0.3, 0.99, precipitation)), Biome::DeepSea);
        }
    }

    #[test]
    fn test_colors_are_distinct() {
        for (i, a) in Biome::ALL.iter().enumerate() {
            assert_eq!(a.index(), i);
            for b in &Biome::ALL[i + 1..] {
                assert_ne!(a.color(), b.color(), "{:?} and {:?} share a color", a, b);
            }
        }
    }

    #[test]
    fn test_water_helpers() {
        assert!(Biome::DeepSea.is_water());
        assert!(Biome::ShallowSea.is_water());
        assert!(!Biome::Desert.is_water());
        assert!(Biome::Mountain.is_land());
    }

    #[test]
    fn test_sample_ranges() {
        let classifier = BiomeClassifier::new(709248357, 600.0, 1.0);
        for i in 0..200 {
            let x = i as f32 * 13.7;
            let y = -(i as f32 * 2.9);
            let s = classifier.sample(x, y);
            assert!((0.0..=1.0).contains(&s.elevation));
            assert!((0.0..=1.0).contains(&s.temperature));
            assert!((0.0..=1.0).contains(&s.precipitation));
        }
    }

    #[test]
    fn test_precipitation_field_is_independent() {
        let seed = 42;
        assert_ne!(precipitation_seed(seed), seed);
        assert_eq!(precipitation_seed(seed), precipitation_seed(seed));

        let classifier = BiomeClassifier::new(seed, 600.0, 1.0);
        let differs = (0..50).any(|i| {
            let s = classifier.sample(i as f32 * 37.1, -(i as f32) * 11.3);
            (s.elevation - s.precipitation).abs() > 1e-4
        });
        assert!(differs);
    }

    #[test]
    fn test_classify_matches_classifier() {
        let classifier = BiomeClassifier::new(77, 300.0, 1.0);
        for i in 0..20 {
            let x = i as f32 * 31.0;
            let y = -(i as f32) * 14.0;
            assert_eq!(classify(x, y, 77, 300.0, 1.0), classifier.classify(x, y).color());
        }
    }

    #[test]
    fn test_from_config_uses_world_height() {
        let config = crate::config::WorldConfigBuilder::new()
            .seed(3)
            .world_size(100, 600)
            .unwrap()
            .build()
            .unwrap();
        let classifier = BiomeClassifier::from_config(&config);
        assert_eq!(classifier.sample(10.0, -300.0).temperature, 1.0);
    }

    #[test]
    fn test_noise_settings_keep_sample_in_unit_range() {
        let alternating = NoiseConfig {
            persistence: -0.9,
            ..Default::default()
        };
        assert!(crate::config::WorldConfigBuilder::new().noise(alternating).is_err());

        // Steepest accepted settings still normalize into [0, 1]
        let rough = NoiseConfig {
            octaves: 8,
            amplitude: 5.0,
            frequency: 0.2,
            persistence: 1.5,
            lacunarity: 0.5,
        };
        let classifier = BiomeClassifier::with_noise(9, 600.0, 1.0, rough);
        for i in 0..500 {
            let s = classifier.sample(i as f32 * 7.3, -(i as f32) * 1.1);
            assert!((0.0..=1.0).contains(&s.elevation));
            assert!((0.0..=1.0).contains(&s.precipitation));
        }
    }
}
