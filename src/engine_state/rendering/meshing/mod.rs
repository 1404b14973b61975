//! Surface extraction for voxel volumes.
//!
//! This module turns the contents of one `Volume` into triangle geometry. Two
//! interchangeable algorithms implement [`SurfaceExtractor`]:
//!
//! * [`cubic::CubicExtractor`] emits one quad per visible voxel face. Visibility
//!   across chunk edges is resolved through the `VolumeGrid`.
//! * [`isosurface::IsoSurfaceExtractor`] polygonizes the density field with marching
//!   cubes or marching tetrahedra.
//!
//! Both produce one [`MaterialMesh`] per element type that yielded geometry.

use std::sync::Arc;

use crate::config::{EngineConfig, ExtractorKind};
use crate::engine_state::voxels::grid::VolumeGrid;
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

use super::appearance::Appearance;

pub mod cubic;
pub mod isosurface;
pub mod mesh;

pub use mesh::MaterialMesh;

/// Builds geometry for a single volume.
///
/// Implementations are pure functions of the volume and, where needed, its
/// neighbours in the grid. They never mutate volume data and may run on any thread.
pub trait SurfaceExtractor: Send + Sync {
    /// Extracts the surface of `volume`.
    ///
    /// # Arguments
    /// * `grid` - The grid `volume` belongs to, for neighbour lookups across chunk edges
    /// * `volume` - The volume to mesh
    ///
    /// # Returns
    /// One mesh per element type with at least one vertex, ordered by type.
    fn extract(&self, grid: &VolumeGrid, volume: &Volume) -> Result<Vec<MaterialMesh>>;
}

/// Creates the extractor selected in the configuration.
pub fn build_extractor(
    config: &EngineConfig,
    appearance: Arc<dyn Appearance>,
) -> Arc<dyn SurfaceExtractor> {
    match config.extractor {
        ExtractorKind::Cubic => Arc::new(cubic::CubicExtractor::new(appearance)),
        ExtractorKind::MarchingCubes => Arc::new(isosurface::IsoSurfaceExtractor::new(
            isosurface::MarchingMode::Cubes,
            config.iso_level,
            config.reuse_vertices,
            appearance,
        )),
        ExtractorKind::MarchingTetrahedra => Arc::new(isosurface::IsoSurfaceExtractor::new(
            isosurface::MarchingMode::Tetrahedra,
            config.iso_level,
            config.reuse_vertices,
            appearance,
        )),
    }
}
