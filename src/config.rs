//! World Configuration and Builder
//!
//! This module provides configuration types for deterministic world generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::terrain::NoiseConfig;

/// Configuration for deterministic world generation
///
/// The same configuration always produces the same partition, the same region
/// outlines and the same biomes.
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::*;
///
/// let config = WorldConfigBuilder::new()
///     .seed(42)
///     .world_size(160, 90).unwrap()
///     .build()
///     .unwrap();
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: WorldConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Random seed for feature point placement and noise tables
    pub seed: u32,

    /// World width in grid cells
    pub width: usize,

    /// World height in grid cells
    pub height: usize,

    /// Width of one macro cell in grid cells
    ///
    /// The world does not need to be a multiple of the macro size; the last
    /// column of macro cells is truncated at the world edge.
    pub macro_width: usize,

    /// Height of one macro cell in grid cells
    pub macro_height: usize,

    /// Minimum number of feature points drawn per macro cell
    pub min_points: usize,

    /// Maximum number of feature points drawn per macro cell (inclusive)
    pub max_points: usize,

    /// Octave noise parameters used for elevation and precipitation
    pub noise: NoiseConfig,

    /// Scales how fast temperature falls off away from the equator
    ///
    /// - 1.0: poles reach exactly 0.0
    /// - > 1.0: colder world, polar caps grow
    /// - < 1.0: warmer world
    pub temp_mult: f32,
}

impl WorldConfig {
    /// Number of macro cell columns, counting a truncated last column
    #[inline]
    pub fn macro_columns(&self) -> usize {
        self.width.div_ceil(self.macro_width)
    }

    /// Number of macro cell rows, counting a truncated last row
    #[inline]
    pub fn macro_rows(&self) -> usize {
        self.height.div_ceil(self.macro_height)
    }

    /// Check every field, including the ones that depend on each other
    ///
    /// Fields are public, so generation entry points re-run this before doing
    /// any work.
    pub fn validate(&self) -> Result<()> {
        validate_size("world", self.width, self.height)?;
        validate_size("macro cell", self.macro_width, self.macro_height)?;
        validate_points(self.min_points, self.max_points, self.macro_width * self.macro_height)?;
        validate_temp_mult(self.temp_mult)?;
        self.noise.validate()
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfigBuilder::new().seed(0).build().unwrap()
    }
}

/// Builder for creating WorldConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::*;
///
/// let config = WorldConfigBuilder::new()
///     .seed(709248357)
///     .world_size(80, 30)
///     .unwrap()
///     .macro_size(20, 10)
///     .unwrap()
///     .points_per_macro(2, 3)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.macro_columns(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct WorldConfigBuilder {
    seed: Option<u32>,
    width: usize,
    height: usize,
    macro_width: usize,
    macro_height: usize,
    min_points: usize,
    max_points: usize,
    noise: NoiseConfig,
    temp_mult: f32,
}

impl WorldConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - world: 80 x 30 cells
    /// - macro cells: 20 x 10 cells
    /// - points per macro cell: 2..=3
    /// - noise: `NoiseConfig::default()` (4 octaves at frequency 0.01)
    /// - temperature multiplier: 1.0
    pub fn new() -> Self {
        Self {
            seed: None,
            width: 80,
            height: 30,
            macro_width: 20,
            macro_height: 10,
            min_points: 2,
            max_points: 3,
            noise: NoiseConfig::default(),
            temp_mult: 1.0,
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the world size in grid cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero
    pub fn world_size(mut self, width: usize, height: usize) -> Result<Self> {
        validate_size("world", width, height)?;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the macro cell size in grid cells
    ///
    /// Larger macro cells give larger regions. The nearest-point search only
    /// looks one macro cell away, so macro cells should stay small relative to
    /// the spacing of the points they hold.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero
    pub fn macro_size(mut self, width: usize, height: usize) -> Result<Self> {
        validate_size("macro cell", width, height)?;
        self.macro_width = width;
        self.macro_height = height;
        Ok(self)
    }

    /// Set the inclusive range of feature points drawn per macro cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `min > max` or `max == 0`
    pub fn points_per_macro(mut self, min: usize, max: usize) -> Result<Self> {
        validate_points(min, max, usize::MAX)?;
        self.min_points = min;
        self.max_points = max;
        Ok(self)
    }

    /// Set the octave noise parameters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the noise parameters are unusable
    pub fn noise(mut self, noise: NoiseConfig) -> Result<Self> {
        noise.validate()?;
        self.noise = noise;
        Ok(self)
    }

    /// Set the temperature multiplier
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the multiplier is not a positive finite number
    pub fn temperature_multiplier(mut self, temp_mult: f32) -> Result<Self> {
        validate_temp_mult(temp_mult)?;
        self.temp_mult = temp_mult;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `max_points` cannot fit in one macro cell
    pub fn build(self) -> Result<WorldConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        let config = WorldConfig {
            seed,
            width: self.width,
            height: self.height,
            macro_width: self.macro_width,
            macro_height: self.macro_height,
            min_points: self.min_points,
            max_points: self.max_points,
            noise: self.noise,
            temp_mult: self.temp_mult,
        };
        config.validate()?;

        Ok(config)
    }
}

impl Default for WorldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_size(what: &str, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(WorldError::InvalidConfig(format!(
            "{} dimensions must be positive (got {}x{})",
            what, width, height
        )));
    }
    Ok(())
}

pub(crate) fn validate_points(min: usize, max: usize, macro_area: usize) -> Result<()> {
    if min > max {
        return Err(WorldError::InvalidConfig(format!(
            "minimum points per macro cell must be <= maximum (got {} > {})",
            min, max
        )));
    }
    if max == 0 {
        return Err(WorldError::InvalidConfig(
            "maximum points per macro cell must be positive".to_string(),
        ));
    }
    if max > macro_area {
        return Err(WorldError::InvalidConfig(format!(
            "maximum points per macro cell must fit in a macro cell (got {} for {} cells)",
            max, macro_area
        )));
    }
    Ok(())
}

fn validate_temp_mult(temp_mult: f32) -> Result<()> {
    if !temp_mult.is_finite() || temp_mult <= 0.0 {
        return Err(WorldError::InvalidConfig(format!(
            "temperature multiplier must be positive (got {})",
            temp_mult
        )));
    }
    Ok(())
}
