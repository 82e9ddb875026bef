//! Bounded Voronoi partition of the world grid
//!
//! The world is split into macro cells. Each macro cell scatters a few feature
//! points, and every grid cell takes the id of the nearest feature point found
//! in the 3x3 block of macro cells around it.
//!
//! # Limitation
//!
//! This is a bounded Voronoi diagram (cellular noise with a search radius),
//! not an exact one: a grid cell only sees feature points of neighboring macro
//! cells. When macro cells are small compared to point spacing, the result
//! matches the exact diagram.
//!
//! # Tie-breaking
//!
//! Candidates are scanned macro row by macro row (top to bottom), left to
//! right inside a row, and in id order inside a macro cell. A candidate
//! replaces the current best only when strictly closer, so the first point
//! at the minimum distance wins.

use std::fmt;
use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{validate_points, validate_size, WorldConfig};
use crate::error::{Result, WorldError};

/// Dense region identifier, `0..region_count`
pub type RegionId = usize;

/// Seed point of one region, in world-grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaturePoint {
    pub x: usize,
    pub y: usize,
    /// Region this point defines
    pub region_id: RegionId,
    /// Index of the macro cell that generated this point
    pub macro_index: usize,
}

impl FeaturePoint {
    /// Squared distance to grid cell (x, y)
    #[inline]
    pub fn distance_squared(&self, x: usize, y: usize) -> usize {
        let dx = self.x.abs_diff(x);
        let dy = self.y.abs_diff(y);
        dx * dx + dy * dy
    }
}

/// Block of the world grid that owns a run of feature points
///
/// Macro cells on the right and bottom edges may be narrower than the
/// configured size when the world is not an exact multiple of it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MacroCell {
    /// Column in the macro grid
    pub mx: usize,
    /// Row in the macro grid
    pub my: usize,
    /// World x of the left edge
    pub x: usize,
    /// World y of the top edge
    pub y: usize,
    /// Width after truncation at the world edge
    pub width: usize,
    /// Height after truncation at the world edge
    pub height: usize,
    /// Region ids of the feature points generated inside this cell
    pub points: Range<RegionId>,
}

impl MacroCell {
    /// Number of feature points owned by this macro cell
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Check if world cell (x, y) lies inside this macro cell
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Grid of nearest-feature-point assignments
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    width: usize,
    height: usize,
    macro_width: usize,
    macro_height: usize,
    macro_columns: usize,
    macro_rows: usize,
    /// Row-major, one region id per grid cell
    cells: Vec<RegionId>,
    macro_cells: Vec<MacroCell>,
    /// Indexed by region id
    feature_points: Vec<FeaturePoint>,
    search_radius: usize,
}

impl Partition {
    /// Build the partition for a world configuration
    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        Self::build(
            config.width,
            config.height,
            config.macro_width,
            config.macro_height,
            config.seed,
            config.min_points,
            config.max_points,
        )
    }

    /// Scatter feature points and assign every grid cell to its nearest one
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - World size in grid cells
    /// * `macro_width`, `macro_height` - Macro cell size in grid cells
    /// * `seed` - Seed for the ChaCha8 point stream
    /// * `min_points`, `max_points` - Inclusive range of points per macro cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for zero sizes, `min_points > max_points`, or a
    /// maximum that cannot fit in one macro cell. Returns `GenerationFailed`
    /// if the random draws produced no feature point at all.
    pub fn build(
        width: usize,
        height: usize,
        macro_width: usize,
        macro_height: usize,
        seed: u32,
        min_points: usize,
        max_points: usize,
    ) -> Result<Self> {
        validate_size("world", width, height)?;
        validate_size("macro cell", macro_width, macro_height)?;
        validate_points(min_points, max_points, macro_width * macro_height)?;

        let macro_columns = width.div_ceil(macro_width);
        let macro_rows = height.div_ceil(macro_height);

        let mut partition = Self {
            width,
            height,
            macro_width,
            macro_height,
            macro_columns,
            macro_rows,
            cells: vec![0; width * height],
            macro_cells: Vec::with_capacity(macro_columns * macro_rows),
            feature_points: Vec::new(),
            search_radius: 1,
        };

        partition.scatter_points(seed, min_points, max_points);

        if partition.feature_points.is_empty() {
            return Err(WorldError::GenerationFailed(format!(
                "no feature points generated for seed {} with {}..={} points per macro cell",
                seed, min_points, max_points
            )));
        }

        partition.assign_cells();

        debug!(
            width,
            height,
            regions = partition.region_count(),
            macro_cells = partition.macro_cells.len(),
            search_radius = partition.search_radius,
            "built partition"
        );

        Ok(partition)
    }

    /// Generate feature points macro cell by macro cell, in row-major order
    fn scatter_points(&mut self, seed: u32, min_points: usize, max_points: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

        for my in 0..self.macro_rows {
            for mx in 0..self.macro_columns {
                let macro_index = self.macro_cells.len();
                let origin_x = mx * self.macro_width;
                let origin_y = my * self.macro_height;
                let local_width = self.macro_width.min(self.width - origin_x);
                let local_height = self.macro_height.min(self.height - origin_y);

                // Truncated cells may hold fewer distinct positions than max_points
                let count = rng
                    .gen_range(min_points..=max_points)
                    .min(local_width * local_height);

                let first = self.feature_points.len();
                while self.feature_points.len() - first < count {
                    let x = origin_x + rng.gen_range(0..local_width);
                    let y = origin_y + rng.gen_range(0..local_height);

                    let duplicate = self.feature_points[first..]
                        .iter()
                        .any(|p| p.x == x && p.y == y);
                    if duplicate {
                        continue;
                    }

                    self.feature_points.push(FeaturePoint {
                        x,
                        y,
                        region_id: self.feature_points.len(),
                        macro_index,
                    });
                }

                self.macro_cells.push(MacroCell {
                    mx,
                    my,
                    x: origin_x,
                    y: origin_y,
                    width: local_width,
                    height: local_height,
                    points: first..self.feature_points.len(),
                });
            }
        }
    }

    /// Give every grid cell the id of its nearest feature point
    fn assign_cells(&mut self) {
        let mut widest = 1;

        for y in 0..self.height {
            let my = y / self.macro_height;
            for x in 0..self.width {
                let mx = x / self.macro_width;

                // Only macro cells with zero points can leave a ring empty
                let mut ring = 1;
                let nearest = loop {
                    if let Some(id) = self.nearest_in_ring(x, y, mx, my, ring) {
                        break id;
                    }
                    ring += 1;
                };
                widest = widest.max(ring);

                self.cells[y * self.width + x] = nearest;
            }
        }

        self.search_radius = widest;
    }

    /// Nearest feature point among macro cells at most `ring` away from (mx, my)
    fn nearest_in_ring(
        &self,
        x: usize,
        y: usize,
        mx: usize,
        my: usize,
        ring: usize,
    ) -> Option<RegionId> {
        let (columns, rows) = self.macro_window(mx, my, ring);
        let mut best: Option<(usize, RegionId)> = None;

        for scan_y in rows {
            for scan_x in columns.clone() {
                let macro_cell = &self.macro_cells[scan_y * self.macro_columns + scan_x];
                for point in &self.feature_points[macro_cell.points.clone()] {
                    let distance = point.distance_squared(x, y);
                    match best {
                        Some((best_distance, _)) if distance >= best_distance => {}
                        _ => best = Some((distance, point.region_id)),
                    }
                }
            }
        }

        best.map(|(_, id)| id)
    }

    /// Macro column and row ranges within `ring` of (mx, my), clamped to the grid
    pub fn macro_window(&self, mx: usize, my: usize, ring: usize) -> (Range<usize>, Range<usize>) {
        let columns = mx.saturating_sub(ring)..(mx + ring + 1).min(self.macro_columns);
        let rows = my.saturating_sub(ring)..(my + ring + 1).min(self.macro_rows);
        (columns, rows)
    }

    /// World width in grid cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// World height in grid cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Configured macro cell width
    #[inline]
    pub fn macro_width(&self) -> usize {
        self.macro_width
    }

    /// Configured macro cell height
    #[inline]
    pub fn macro_height(&self) -> usize {
        self.macro_height
    }

    /// Number of macro cell columns
    #[inline]
    pub fn macro_columns(&self) -> usize {
        self.macro_columns
    }

    /// Number of macro cell rows
    #[inline]
    pub fn macro_rows(&self) -> usize {
        self.macro_rows
    }

    /// Number of regions (equal to the number of feature points)
    #[inline]
    pub fn region_count(&self) -> usize {
        self.feature_points.len()
    }

    /// Widest macro ring the nearest-point search needed
    ///
    /// This is 1 (the 3x3 neighborhood) unless some neighborhoods held no
    /// feature points at all.
    #[inline]
    pub fn search_radius(&self) -> usize {
        self.search_radius
    }

    /// Region id of every grid cell, row-major
    #[inline]
    pub fn cells(&self) -> &[RegionId] {
        &self.cells
    }

    /// Macro cells in row-major order
    #[inline]
    pub fn macro_cells(&self) -> &[MacroCell] {
        &self.macro_cells
    }

    /// Feature points indexed by region id
    #[inline]
    pub fn feature_points(&self) -> &[FeaturePoint] {
        &self.feature_points
    }

    /// Feature point of a region
    ///
    /// Returns `None` if the id is out of range.
    #[inline]
    pub fn feature_point(&self, id: RegionId) -> Option<&FeaturePoint> {
        self.feature_points.get(id)
    }

    /// Region covering grid cell (x, y)
    ///
    /// Returns `None` outside the world.
    pub fn region_at(&self, x: usize, y: usize) -> Option<RegionId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Macro cell containing grid cell (x, y)
    pub fn macro_cell_of(&self, x: usize, y: usize) -> Option<&MacroCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let mx = x / self.macro_width;
        let my = y / self.macro_height;
        self.macro_cells.get(my * self.macro_columns + mx)
    }

    /// Number of grid cells assigned to a region
    pub fn region_area(&self, id: RegionId) -> usize {
        self.cells.iter().filter(|&&cell| cell == id).count()
    }
}

/// Prints the grid of region ids followed by the feature point list
impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.region_count().max(1).to_string().len();

        for row in self.cells.chunks(self.width) {
            for (i, id) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", id, width = digits)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        for point in &self.feature_points {
            writeln!(
                f,
                "{}: ({}, {}) in macro cell {}",
                point.region_id, point.x, point.y, point.macro_index
            )?;
        }

        Ok(())
    }
}
