//! World generation
//!
//! Runs the whole pipeline: partition the grid, then outline, triangulate and
//! classify every region.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::error::{Result, WorldError};
use crate::mesh::{triangulate, TriangulationMethod};
use crate::outline::{trace, Polygon, RegionMask};
use crate::partition::{FeaturePoint, Partition, RegionId};
use crate::terrain::{Biome, BiomeClassifier};

/// Shared flag for stopping a running generation
///
/// Cloning shares the flag. Generation checks it before each region and
/// returns [`WorldError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One generated region: outline, triangles and biome
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub id: RegionId,
    pub feature_point: FeaturePoint,
    /// Closed clockwise outline in render space
    pub polygon: Polygon,
    /// Triangle indices into `polygon.vertices()`
    pub indices: Vec<u32>,
    pub method: TriangulationMethod,
    /// Biome at the feature point's cell center
    pub biome: Biome,
}

impl Region {
    /// Average of the outline vertices
    pub fn centroid(&self) -> Vec2 {
        self.polygon
            .centroid()
            .unwrap_or_else(|| cell_center(&self.feature_point))
    }

    /// Outline vertices without the closing point
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        self.polygon.vertices()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Counts gathered while generating a world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationReport {
    /// Regions with a usable outline
    pub emitted: usize,
    /// Regions whose outline had fewer than three vertices
    pub skipped: usize,
    /// Emitted regions triangulated by the fan fallback
    pub fan_fallbacks: usize,
}

/// A generated world
///
/// # Examples
///
/// ```
/// use voronoi_terrain::*;
///
/// let config = WorldConfigBuilder::new().seed(709248357).build().unwrap();
/// let world = World::generate(config).unwrap();
///
/// let report = world.report();
/// assert_eq!(report.emitted + report.skipped, world.partition().region_count());
///
/// if let Some(region) = world.region_at(10, 5) {
///     println!("region {} is {:?}", region.id, region.biome);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    partition: Partition,
    /// Emitted regions, sorted by id
    regions: Vec<Region>,
    report: GenerationReport,
}

impl World {
    /// Generate a world from a configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate and
    /// `GenerationFailed` if no feature point could be placed.
    pub fn generate(config: WorldConfig) -> Result<Self> {
        Self::generate_cancellable(config, &CancelToken::new())
    }

    /// Generate a world, stopping early once `cancel` is set
    ///
    /// # Errors
    ///
    /// Same as [`World::generate`], plus `Cancelled` when the token fires
    /// before the last region is done.
    pub fn generate_cancellable(config: WorldConfig, cancel: &CancelToken) -> Result<Self> {
        config.validate()?;

        let partition = Partition::from_config(&config)?;
        let classifier = BiomeClassifier::from_config(&config);
        let count = partition.region_count();

        #[cfg(feature = "parallel")]
        let generated: Result<Vec<Option<Region>>> = (0..count)
            .into_par_iter()
            .map(|id| generate_region(&partition, &classifier, id, cancel))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let generated: Result<Vec<Option<Region>>> = (0..count)
            .map(|id| generate_region(&partition, &classifier, id, cancel))
            .collect();

        let regions: Vec<Region> = generated?.into_iter().flatten().collect();

        let report = GenerationReport {
            emitted: regions.len(),
            skipped: count - regions.len(),
            fan_fallbacks: regions
                .iter()
                .filter(|r| r.method == TriangulationMethod::FanFallback)
                .count(),
        };

        info!(
            seed = config.seed,
            regions = count,
            emitted = report.emitted,
            skipped = report.skipped,
            fan_fallbacks = report.fan_fallbacks,
            "generated world"
        );

        Ok(Self {
            config,
            partition,
            regions,
            report,
        })
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Emitted regions, sorted by id
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[inline]
    pub fn report(&self) -> GenerationReport {
        self.report
    }

    /// Get an emitted region by id
    ///
    /// Returns `None` for unknown ids and for skipped regions.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|index| &self.regions[index])
    }

    /// Get the region owning grid cell (x, y)
    pub fn region_at(&self, x: usize, y: usize) -> Option<&Region> {
        self.partition.region_at(x, y).and_then(|id| self.region(id))
    }
}

/// Outline, triangulate and classify one region
///
/// Returns `Ok(None)` when the region's outline is too small to triangulate.
fn generate_region(
    partition: &Partition,
    classifier: &BiomeClassifier,
    id: RegionId,
    cancel: &CancelToken,
) -> Result<Option<Region>> {
    if cancel.is_cancelled() {
        return Err(WorldError::Cancelled);
    }

    let mask = RegionMask::extract(partition, id)?;
    let polygon = trace(&mask);
    if polygon.vertices().len() < 3 {
        debug!(
            region = id,
            cells = mask.filled_count(),
            "skipping region without a usable outline"
        );
        return Ok(None);
    }

    let triangulation = triangulate(&polygon.points);
    if triangulation.used_fallback() {
        warn!(
            region = id,
            vertices = polygon.vertices().len(),
            "no ear left to clip, fanned the remaining vertices"
        );
    }

    let feature_point = *partition
        .feature_point(id)
        .ok_or(WorldError::RegionNotFound(id))?;
    let center = cell_center(&feature_point);
    let biome = classifier.classify(center.x, center.y);

    debug!(
        region = id,
        vertices = polygon.vertices().len(),
        triangles = triangulation.triangle_count(),
        ?biome,
        "generated region"
    );

    Ok(Some(Region {
        id,
        feature_point,
        polygon,
        indices: triangulation.indices,
        method: triangulation.method,
        biome,
    }))
}

/// Render-space center of a feature point's grid cell
fn cell_center(point: &FeaturePoint) -> Vec2 {
    Vec2::new(point.x as f32 + 0.5, -(point.y as f32 + 0.5))
}
