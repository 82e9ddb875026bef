//! Bounded Voronoi world generation
//!
//! A standalone library for partitioning a 2D grid into Voronoi-like regions,
//! tracing each region into a polygon, triangulating it and coloring it by a
//! noise-driven biome. The output is plain vertex/index/color buffers for any
//! renderer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_terrain::*;
//!
//! // Configure a world
//! let config = WorldConfigBuilder::new()
//!     .seed(709248357)
//!     .world_size(80, 30).unwrap()
//!     .macro_size(20, 10).unwrap()
//!     .points_per_macro(2, 3).unwrap()
//!     .build().unwrap();
//!
//! let world = World::generate(config).unwrap();
//!
//! // Generate mesh for rendering
//! let mesh = generate_mesh(&world, &BiomePalette::default());
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Pipeline
//!
//! 1. [`Partition`]: feature points scattered per macro cell, every grid cell
//!    assigned to the nearest point in its 3x3 macro neighborhood
//! 2. [`RegionMask`]: padded membership grid of one region
//! 3. [`trace`]: boundary walk producing a clockwise [`Polygon`]
//! 4. [`triangulate`]: ear clipping with a flagged fan fallback
//! 5. [`BiomeClassifier`]: elevation, temperature and precipitation to [`Biome`]
//!
//! # Features
//!
//! - `parallel` (default): Processes regions on the rayon thread pool
//! - `serde`: Enables serialization support for configuration and outputs

// Modules
pub mod error;
pub mod config;
pub mod partition;
pub mod outline;
pub mod terrain;
pub mod mesh;
pub mod world;

// Re-export core types for convenience
pub use error::{WorldError, Result};
pub use config::{WorldConfig, WorldConfigBuilder};
pub use partition::{FeaturePoint, MacroCell, Partition, RegionId};
pub use outline::{trace, Polygon, RegionMask};
pub use terrain::{classify, Biome, BiomeClassifier, BiomeColor, BiomeSample, NoiseConfig, NoiseField};
pub use mesh::{
    generate_mesh, region_mesh, triangulate, BiomePalette, ColorMapper, MeshData, Triangulation,
    TriangulationMethod,
};
pub use world::{CancelToken, GenerationReport, Region, World};

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
