//! Mesh generation for generated worlds
//!
//! Turns region outlines and biomes into engine-agnostic vertex, color and
//! index buffers.

mod colors;
mod triangulate;

pub use colors::{BiomePalette, ColorMapper};
pub use triangulate::{triangle_area, triangulate, Triangulation, TriangulationMethod};

use crate::terrain::{Biome, BiomeColor};
use crate::world::{Region, World};

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any renderer:
/// - wgpu / OpenGL: upload `interleaved()` as one vertex buffer
/// - Bevy: insert `positions` and `colors` as mesh attributes
/// - Godot: convert to `ArrayMesh`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshData {
    /// Vertex positions in render space, z = 0
    pub positions: Vec<[f32; 3]>,
    /// Vertex colors (RGB)
    pub colors: Vec<BiomeColor>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions and colors interleaved as `x, y, z, r, g, b` per vertex
    pub fn interleaved(&self) -> Vec<f32> {
        self.positions
            .iter()
            .zip(&self.colors)
            .flat_map(|(p, c)| [p[0], p[1], p[2], c[0], c[1], c[2]])
            .collect()
    }

    /// Append one region, offsetting its indices past the current vertices
    fn push_region<C: ColorMapper<Biome>>(&mut self, region: &Region, color_mapper: &C) {
        let base = self.positions.len() as u32;
        let color = color_mapper.map_color(&region.biome);

        for vertex in region.vertices() {
            self.positions.push([vertex.x, vertex.y, 0.0]);
            self.colors.push(color);
        }
        self.indices.extend(region.indices.iter().map(|&i| base + i));
    }
}

/// Merge every emitted region of `world` into one mesh
///
/// All vertices of a region share the color of its biome.
pub fn generate_mesh<C>(world: &World, color_mapper: &C) -> MeshData
where
    C: ColorMapper<Biome>,
{
    let mut mesh = MeshData::default();
    for region in world.regions() {
        mesh.push_region(region, color_mapper);
    }
    mesh
}

/// Build the mesh of a single region
pub fn region_mesh<C>(region: &Region, color_mapper: &C) -> MeshData
where
    C: ColorMapper<Biome>,
{
    let mut mesh = MeshData::default();
    mesh.push_region(region, color_mapper);
    mesh
}
