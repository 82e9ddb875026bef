//! Region outlines
//!
//! Turns one region of a [`Partition`](crate::partition::Partition) into a
//! padded bitmask, then walks that mask into an ordered boundary polygon.

mod mask;
mod trace;

pub use mask::RegionMask;
pub use trace::{signed_area, starting_cell, trace, Polygon};
