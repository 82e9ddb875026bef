//! 2D gradient noise
//!
//! Seeded Perlin-style noise over the world plane. Each seed builds its own
//! permutation table, so two fields with different seeds are independent.
//! Gradients are 32 unit vectors evenly spaced on the circle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Number of gradient directions on the unit circle
pub const GRADIENT_COUNT: usize = 32;

/// Number of distinct permutation entries (the table stores them twice)
pub const PERMUTATION_SIZE: usize = 256;

/// Octave parameters for fractal noise sampling
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoiseConfig {
    /// Number of noise layers
    pub octaves: usize,
    /// Amplitude of the first octave
    pub amplitude: f32,
    /// Frequency of the first octave (lower = larger features)
    pub frequency: f32,
    /// Amplitude decay per octave (controls roughness)
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            amplitude: 1.0,
            frequency: 0.01,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseConfig {
    /// Reject parameters that would make the octave sum meaningless
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(WorldError::InvalidConfig(
                "noise octaves must be at least 1".to_string(),
            ));
        }
        let finite = [self.amplitude, self.frequency, self.persistence, self.lacunarity]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.amplitude <= 0.0 || self.frequency <= 0.0 {
            return Err(WorldError::InvalidConfig(format!(
                "noise amplitude and frequency must be positive and finite (got {:?})",
                self
            )));
        }
        if self.persistence < 0.0 || self.lacunarity <= 0.0 {
            return Err(WorldError::InvalidConfig(format!(
                "noise persistence must be non-negative and lacunarity positive (got {} and {})",
                self.persistence, self.lacunarity
            )));
        }
        Ok(())
    }
}

/// Seeded 2D gradient noise sampler
///
/// Tables are built once in [`NoiseField::new`] and never change, so a field
/// can be shared by reference across threads.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u32,
    gradients: [[f32; 2]; GRADIENT_COUNT],
    permutation: [u8; PERMUTATION_SIZE * 2],
}

impl NoiseField {
    /// Build the gradient and permutation tables for `seed`
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            gradients: build_gradients(),
            permutation: build_permutation(seed),
        }
    }

    /// Seed this field was built from
    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The 512-entry permutation table (256 shuffled values, repeated)
    #[inline]
    pub fn permutation(&self) -> &[u8; PERMUTATION_SIZE * 2] {
        &self.permutation
    }

    /// Sample single-octave noise at (x, y)
    ///
    /// # Algorithm
    /// 1. Find the unit cell containing the point
    /// 2. Compute the local position inside the cell
    /// 3. Apply the fade curve on both axes
    /// 4. Dot each corner gradient with the offset to the sample
    /// 5. Bilinearly interpolate the four influences
    ///
    /// # Returns
    /// Value in range [-1, 1]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x_cell = x.floor();
        let y_cell = y.floor();

        let xf = x - x_cell;
        let yf = y - y_cell;

        // Masking the i32 keeps negative cells in 0..=255
        let x0 = (x_cell as i32 & 255) as usize;
        let y0 = (y_cell as i32 & 255) as usize;
        let x1 = (x0 + 1) & 255;
        let y1 = (y0 + 1) & 255;

        let u = fade(xf);
        let v = fade(yf);

        let g00 = self.influence(x0, y0, xf, yf);
        let g10 = self.influence(x1, y0, xf - 1.0, yf);
        let g01 = self.influence(x0, y1, xf, yf - 1.0);
        let g11 = self.influence(x1, y1, xf - 1.0, yf - 1.0);

        let near = lerp(g00, g10, u);
        let far = lerp(g01, g11, u);

        lerp(near, far, v)
    }

    /// Sample fractal noise by summing octaves
    ///
    /// The sum is divided by the total amplitude, so with a positive
    /// amplitude and non-negative persistence the result stays in [-1, 1]
    /// whatever the octave count. Returns 0.0 when no amplitude was
    /// accumulated (zero octaves or zero amplitude).
    #[allow(clippy::too_many_arguments)]
    pub fn sample_octaves(
        &self,
        x: f32,
        y: f32,
        octaves: usize,
        amplitude: f32,
        frequency: f32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        let mut amplitude = amplitude;
        let mut frequency = frequency;
        let mut total = 0.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        total / max_value
    }

    /// Sample fractal noise with parameters taken from a [`NoiseConfig`]
    #[inline]
    pub fn sample_fbm(&self, x: f32, y: f32, config: &NoiseConfig) -> f32 {
        self.sample_octaves(
            x,
            y,
            config.octaves,
            config.amplitude,
            config.frequency,
            config.persistence,
            config.lacunarity,
        )
    }

    /// Gradient influence of lattice corner (xi, yi) on a sample at offset (dx, dy)
    #[inline]
    fn influence(&self, xi: usize, yi: usize, dx: f32, dy: f32) -> f32 {
        let hash = self.permutation[self.permutation[xi] as usize + yi] as usize;
        let [gx, gy] = self.gradients[hash % GRADIENT_COUNT];
        gx * dx + gy * dy
    }
}

/// Unit vectors at angles `2π·i/32`
fn build_gradients() -> [[f32; 2]; GRADIENT_COUNT] {
    let mut gradients = [[0.0; 2]; GRADIENT_COUNT];
    for (i, gradient) in gradients.iter_mut().enumerate() {
        let angle = TAU * i as f32 / GRADIENT_COUNT as f32;
        *gradient = [angle.cos(), angle.sin()];
    }
    gradients
}

/// Shuffle 0..=255 and store the result twice
///
/// The shuffle is a descending Fisher-Yates driven by `ChaCha8Rng`, so the
/// table only depends on the seed and not on platform RNG defaults.
fn build_permutation(seed: u32) -> [u8; PERMUTATION_SIZE * 2] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

    let mut half = [0u8; PERMUTATION_SIZE];
    for (i, value) in half.iter_mut().enumerate() {
        *value = i as u8;
    }
    for i in (1..PERMUTATION_SIZE).rev() {
        let j = rng.gen_range(0..=i);
        half.swap(i, j);
    }

    let mut table = [0u8; PERMUTATION_SIZE * 2];
    table[..PERMUTATION_SIZE].copy_from_slice(&half);
    table[PERMUTATION_SIZE..].copy_from_slice(&half);
    table
}

/// Quintic smoothstep: `6t⁵ - 15t⁴ + 10t³`
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);

        for i in 0..100 {
            let x = i as f32 * 0.37 - 12.0;
            let y = i as f32 * 0.91 + 3.0;
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn test_permutation_is_shuffled_range() {
        let field = NoiseField::new(7);
        let table = field.permutation();

        let mut seen = [false; PERMUTATION_SIZE];
        for &value in &table[..PERMUTATION_SIZE] {
            seen[value as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "each value 0..=255 must appear once");
        assert_eq!(table[..PERMUTATION_SIZE], table[PERMUTATION_SIZE..]);

        let identity = (0..PERMUTATION_SIZE).all(|i| table[i] as usize == i);
        assert!(!identity, "table should be shuffled");
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        assert_ne!(a.permutation(), b.permutation());
    }

    #[test]
    fn test_gradients_are_unit_vectors() {
        for [x, y] in build_gradients() {
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let field = NoiseField::new(99);
        for x in -5..5 {
            for y in -5..5 {
                assert_eq!(field.sample(x as f32, y as f32), 0.0);
            }
        }
    }

    #[test]
    fn test_sample_bounds_over_many_seeds() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        for seed in 0..10 {
            let field = NoiseField::new(seed * 7919);
            for _ in 0..10_000 {
                let x: f32 = rng.gen_range(-5000.0..5000.0);
                let y: f32 = rng.gen_range(-5000.0..5000.0);
                let value = field.sample(x, y);
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "seed {} sample ({}, {}) = {} out of range",
                    seed,
                    x,
                    y,
                    value
                );
            }
        }
    }

    #[test]
    fn test_continuity() {
        let field = NoiseField::new(5);
        let step = 1e-3;
        let mut x = -3.0;
        while x < 3.0 {
            let a = field.sample(x, 0.4);
            let b = field.sample(x + step, 0.4);
            assert!((a - b).abs() < 0.01, "jump at x = {}", x);
            x += step;
        }
    }

    #[test]
    fn test_octaves_stay_normalized() {
        let field = NoiseField::new(11);
        let config = NoiseConfig {
            octaves: 6,
            amplitude: 3.0,
            frequency: 0.05,
            persistence: 0.7,
            lacunarity: 2.0,
        };

        for i in 0..500 {
            let value = field.sample_fbm(i as f32 * 3.3, i as f32 * -1.7, &config);
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_zero_octaves_is_zero() {
        let field = NoiseField::new(3);
        assert_eq!(field.sample_octaves(10.5, 2.5, 0, 1.0, 0.01, 0.5, 2.0), 0.0);
    }

    #[test]
    fn test_single_octave_matches_scaled_sample() {
        let field = NoiseField::new(3);
        let direct = field.sample(12.5 * 0.1, 7.25 * 0.1);
        let octave = field.sample_octaves(12.5, 7.25, 1, 2.0, 0.1, 0.5, 2.0);
        assert!((direct - octave).abs() < 1e-6);
    }

    #[test]
    fn test_noise_config_validation() {
        assert!(NoiseConfig::default().validate().is_ok());

        let no_octaves = NoiseConfig {
            octaves: 0,
            ..Default::default()
        };
        assert!(no_octaves.validate().is_err());

        let bad_frequency = NoiseConfig {
            frequency: -1.0,
            ..Default::default()
        };
        assert!(bad_frequency.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_persistence_and_lacunarity() {
        let alternating = NoiseConfig {
            persistence: -0.9,
            ..Default::default()
        };
        assert!(matches!(alternating.validate(), Err(WorldError::InvalidConfig(_))));

        for lacunarity in [0.0, -2.0] {
            let config = NoiseConfig {
                lacunarity,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        let flat = NoiseConfig {
            persistence: 0.0,
            ..Default::default()
        };
        assert!(flat.validate().is_ok());
    }
}
