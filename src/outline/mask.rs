//! Padded membership mask of a single region

use std::fmt;

use crate::error::{Result, WorldError};
use crate::partition::{Partition, RegionId};

/// Boolean membership grid for one region
///
/// The mask covers the macro cells around the region's feature point (3x3 in
/// the normal case) plus one empty cell on every side. The padding keeps every
/// 8-neighbor probe of an interior cell inside the mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    region_id: RegionId,
    /// Padded width
    width: usize,
    /// Padded height
    height: usize,
    /// World x of the first interior column
    x_offset: usize,
    /// World y of the first interior row
    y_offset: usize,
    mask: Vec<bool>,
}

impl RegionMask {
    /// Extract the mask of `region_id` from a partition
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` if the partition has no such region.
    pub fn extract(partition: &Partition, region_id: RegionId) -> Result<Self> {
        let point = partition
            .feature_point(region_id)
            .ok_or(WorldError::RegionNotFound(region_id))?;
        let home = &partition.macro_cells()[point.macro_index];

        let (columns, rows) =
            partition.macro_window(home.mx, home.my, partition.search_radius());

        let x_offset = columns.start * partition.macro_width();
        let y_offset = rows.start * partition.macro_height();
        let x_end = (columns.end * partition.macro_width()).min(partition.width());
        let y_end = (rows.end * partition.macro_height()).min(partition.height());

        let interior_width = x_end - x_offset;
        let interior_height = y_end - y_offset;

        let mut mask = Self::empty(interior_width, interior_height, x_offset, y_offset);
        mask.region_id = region_id;

        let cells = partition.cells();
        for y in 0..interior_height {
            let row = (y_offset + y) * partition.width();
            for x in 0..interior_width {
                if cells[row + x_offset + x] == region_id {
                    mask.set(x, y, true);
                }
            }
        }

        Ok(mask)
    }

    /// Create an all-empty mask with the given interior size and world offset
    pub fn empty(interior_width: usize, interior_height: usize, x_offset: usize, y_offset: usize) -> Self {
        let width = interior_width + 2;
        let height = interior_height + 2;
        Self {
            region_id: 0,
            width,
            height,
            x_offset,
            y_offset,
            mask: vec![false; width * height],
        }
    }

    /// Build a mask from rows of interior cells, `'#'` marking a filled cell
    ///
    /// Handy for describing shapes by hand. The interior is as wide as the
    /// longest row; shorter rows are empty past their end.
    pub fn from_rows(rows: &[&str]) -> Self {
        let interior_width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut mask = Self::empty(interior_width, rows.len(), 0, 0);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Region this mask was extracted for
    #[inline]
    pub fn region_id(&self) -> RegionId {
        self.region_id
    }

    /// Padded width
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Padded height
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// World offset of the first interior cell
    #[inline]
    pub fn offset(&self) -> (usize, usize) {
        (self.x_offset, self.y_offset)
    }

    /// Padded cells, row-major
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.mask
    }

    /// Filled state of the padded cell at flat index `index`
    ///
    /// Out-of-range indices read as empty.
    #[inline]
    pub fn is_filled(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// Set interior cell (x, y), where (0, 0) is the first non-padding cell
    pub fn set(&mut self, x: usize, y: usize, filled: bool) {
        let index = (y + 1) * self.width + x + 1;
        self.mask[index] = filled;
    }

    /// Filled state of interior cell (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x + 2 >= self.width || y + 2 >= self.height {
            return false;
        }
        self.mask[(y + 1) * self.width + x + 1]
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.mask.iter().filter(|&&filled| filled).count()
    }

    /// World coordinates of every filled cell, row-major
    pub fn world_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &filled)| filled)
            .map(move |(index, _)| {
                let x = index % self.width - 1 + self.x_offset;
                let y = index / self.width - 1 + self.y_offset;
                (x, y)
            })
    }
}

/// Prints the padded mask, `#` for filled cells and `.` for empty ones
impl fmt::Display for RegionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.mask.chunks(self.width) {
            for &filled in row {
                write!(f, "{}", if filled { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
