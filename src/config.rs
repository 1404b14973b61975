//! # Engine Configuration
//!
//! Runtime settings for the chunk grid, the surface extractor, the worker pool and the
//! terrain loader. Configuration is plain data: it is deserialized from JSON with
//! `serde_json`, validated once, and then handed to `EngineState::new`.
//!
//! Every field has a default, so a partial document such as
//!
//! ```json
//! { "volume_size": 16, "extractor": { "kind": "marching_cubes" } }
//! ```
//!
//! is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which surface extraction algorithm turns chunk contents into triangles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Axis-aligned face culling, one quad per visible voxel face.
    Cubic,
    /// Isosurface polygonization over unit cubes.
    MarchingCubes,
    /// Isosurface polygonization over six tetrahedra per cube.
    MarchingTetrahedra,
}

/// Terrain loader selection and its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoaderConfig {
    /// Leaves every chunk empty.
    Empty,
    /// Fills every cell with one element type.
    Solid {
        /// Element type code.
        element_type: i32,
    },
    /// Alternates filled and empty cells in three dimensions.
    Checkerboard {
        /// Element type code of the filled cells.
        element_type: i32,
    },
    /// Seeded random scatter.
    Random {
        /// Base seed, mixed with the chunk origin.
        seed: u64,
        /// Probability that a cell stays empty.
        sparseness: f64,
    },
    /// Perlin noise terrain.
    Perlin {
        /// Noise seed.
        seed: u32,
        /// Scale applied to world coordinates before sampling.
        scale: f64,
        /// Cells with `|sample| > threshold` are solid.
        threshold: f64,
    },
}

/// Which appearance service resolves materials and texture coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceKind {
    /// Per-face tiles from a texture atlas.
    #[default]
    Atlas,
    /// One flat color per element type.
    Color,
}

/// Texture atlas layout used by the default appearance service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Edge length of the square atlas image in pixels.
    pub atlas_size: u32,
    /// Edge length of one square tile in pixels.
    pub tile_size: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        AtlasConfig {
            atlas_size: 512,
            tile_size: 32,
        }
    }
}

/// Top level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of a cubic chunk in voxels.
    pub volume_size: i32,
    /// Number of chunks per axis; indices run over `-n/2..=n/2`.
    pub grid_size: [i32; 3],
    /// Chunk radius streamed in around the observer.
    pub view_distance: i32,
    /// Worker thread count, `0` means one per available core.
    pub worker_threads: usize,
    /// Upper bound on nodes published per frame, at least 1.
    pub max_updates_per_frame: usize,
    /// Surface extraction algorithm.
    pub extractor: ExtractorKind,
    /// Density threshold for the isosurface extractors.
    pub iso_level: f32,
    /// Deduplicate isosurface vertices that share an exact position.
    pub reuse_vertices: bool,
    /// Appearance service.
    pub appearance: AppearanceKind,
    /// Texture atlas layout.
    pub atlas: AtlasConfig,
    /// Terrain loader.
    pub loader: LoaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            volume_size: 32,
            grid_size: [16, 4, 16],
            view_distance: 2,
            worker_threads: 0,
            max_updates_per_frame: 8,
            extractor: ExtractorKind::Cubic,
            iso_level: 0.0,
            reuse_vertices: false,
            appearance: AppearanceKind::Atlas,
            atlas: AtlasConfig::default(),
            loader: LoaderConfig::Perlin {
                seed: 0,
                scale: 0.02,
                threshold: 0.2,
            },
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the values that the rest of the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.volume_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "volume_size must be positive, got {}",
                self.volume_size
            )));
        }
        if self.grid_size.iter().any(|&n| n <= 0) {
            return Err(Error::InvalidConfig(format!(
                "grid_size must be positive on every axis, got {:?}",
                self.grid_size
            )));
        }
        if self.view_distance < 0 {
            return Err(Error::InvalidConfig(format!(
                "view_distance must not be negative, got {}",
                self.view_distance
            )));
        }
        if self.max_updates_per_frame == 0 {
            return Err(Error::InvalidConfig(
                "max_updates_per_frame must be at least 1".to_string(),
            ));
        }
        if self.atlas.tile_size == 0 || self.atlas.atlas_size % self.atlas.tile_size != 0 {
            return Err(Error::InvalidConfig(format!(
                "tile_size {} does not divide atlas_size {}",
                self.atlas.tile_size, self.atlas.atlas_size
            )));
        }
        if !self.iso_level.is_finite() {
            return Err(Error::InvalidConfig("iso_level must be finite".to_string()));
        }
        if let LoaderConfig::Random { sparseness, .. } = self.loader {
            if !(0.0..=1.0).contains(&sparseness) {
                return Err(Error::InvalidConfig(format!(
                    "sparseness must lie in 0..=1, got {sparseness}"
                )));
            }
        }
        Ok(())
    }

    /// Resolves `worker_threads`, falling back to the available parallelism.
    pub fn worker_count(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
