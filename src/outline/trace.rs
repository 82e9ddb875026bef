//! Boundary tracing of a region mask
//!
//! Walks the outer boundary of the filled cells clockwise (on screen, y down)
//! and keeps one vertex per change of edge direction.
//!
//! # Algorithm
//!
//! 1. Start on the first filled cell, in raster order, that has a filled
//!    8-neighbor
//! 2. Probe the neighbor in the current direction, starting North
//! 3. Empty neighbor: rotate the probe one step clockwise
//! 4. Filled neighbor: move there. The new edge direction is the motion
//!    direction two steps counter-clockwise; when it differs from the last
//!    one, the cell we just left becomes a vertex. Probing resumes from the
//!    edge direction
//! 5. Stop when the probed neighbor is the start cell

use glam::Vec2;
use tracing::warn;

use super::mask::RegionMask;

/// Compass directions in clockwise order, as (dx, dy) with y pointing down
///
/// Index arithmetic is modulo 8: `+1` turns clockwise.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),   // East
    (1, 1),   // SouthEast
    (0, 1),   // South
    (-1, 1),  // SouthWest
    (-1, 0),  // West
    (-1, -1), // NorthWest
    (0, -1),  // North
    (1, -1),  // NorthEast
];

const NORTH: usize = 6;

/// Edge direction recorded after moving in each direction
///
/// Two steps counter-clockwise of the motion; East maps to North and
/// SouthEast to NorthEast through the wrap.
const EDGE_AFTER_MOVE: [usize; 8] = [6, 7, 0, 1, 2, 3, 4, 5];

/// Ordered boundary of one region in render space
///
/// Points run clockwise and the last point repeats the first. An empty
/// polygon means the mask had nothing to trace.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    /// Check if tracing produced nothing
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of stored points, including the closing duplicate
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the last point repeats the first
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Distinct boundary vertices (without the closing duplicate)
    pub fn vertices(&self) -> &[Vec2] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Shoelace signed area; negative for clockwise polygons in render space
    pub fn signed_area(&self) -> f32 {
        signed_area(self.vertices())
    }

    /// Average of the boundary vertices
    ///
    /// Returns `None` for an empty polygon.
    pub fn centroid(&self) -> Option<Vec2> {
        let vertices = self.vertices();
        if vertices.is_empty() {
            return None;
        }
        let sum: Vec2 = vertices.iter().copied().sum();
        Some(sum / vertices.len() as f32)
    }
}

/// Shoelace signed area of an open vertex loop
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f32 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    twice * 0.5
}

/// Trace the boundary of the filled cells of `mask`
///
/// Returns an empty polygon when no filled cell has a filled 8-neighbor.
pub fn trace(mask: &RegionMask) -> Polygon {
    let Some(start) = starting_cell(mask) else {
        return Polygon::default();
    };

    let mut points = vec![cell_to_world(mask, start)];

    let mut current = start;
    let mut direction = NORTH;
    let mut edge = NORTH;
    let mut next = neighbor(mask, current, direction);

    // Every cell can be entered from at most 8 directions, each after at most 8 probes
    let budget = mask.as_slice().len() * 64;
    let mut steps = 0;

    while next != Some(start) {
        steps += 1;
        if steps > budget {
            warn!(
                region = mask.region_id(),
                steps, "boundary walk never returned to its start, stopping"
            );
            break;
        }

        match next {
            Some(target) if mask.is_filled(target) => {
                let new_edge = EDGE_AFTER_MOVE[direction];
                if new_edge != edge && current != start {
                    points.push(cell_to_world(mask, current));
                }

                current = target;
                edge = new_edge;
                direction = edge;
            }
            _ => direction = (direction + 1) % DIRECTIONS.len(),
        }

        next = neighbor(mask, current, direction);
    }

    let last = cell_to_world(mask, current);
    if points.last() != Some(&last) {
        points.push(last);
    }
    points.push(points[0]);

    Polygon { points }
}

/// First filled cell in raster order that has at least one filled 8-neighbor
pub fn starting_cell(mask: &RegionMask) -> Option<usize> {
    (0..mask.as_slice().len()).find(|&index| {
        mask.is_filled(index)
            && (0..DIRECTIONS.len()).any(|direction| {
                neighbor(mask, index, direction).is_some_and(|n| mask.is_filled(n))
            })
    })
}

/// Index of the neighbor of `index` in `direction`, if it lies inside the mask
fn neighbor(mask: &RegionMask, index: usize, direction: usize) -> Option<usize> {
    let width = mask.width() as isize;
    let height = mask.height() as isize;
    let (dx, dy) = DIRECTIONS[direction];

    let x = (index as isize % width) + dx;
    let y = (index as isize / width) + dy;
    if x < 0 || y < 0 || x >= width || y >= height {
        return None;
    }
    Some((y * width + x) as usize)
}

/// Render-space center of padded mask cell `index`
///
/// Removes the padding, adds the world offset, moves to the cell center and
/// flips y so rows grow downward on screen.
fn cell_to_world(mask: &RegionMask, index: usize) -> Vec2 {
    let (x_offset, y_offset) = mask.offset();
    let x = (index % mask.width()) as f32 - 1.0 + x_offset as f32 + 0.5;
    let y = (index / mask.width()) as f32 - 1.0 + y_offset as f32 + 0.5;
    Vec2::new(x, -y)
}
