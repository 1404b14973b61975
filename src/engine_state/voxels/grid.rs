//! # Volume Grid Module
//!
//! The `VolumeGrid` is the spatial index of the world: a lazily populated 3D grid of
//! cubic `Volume`s. It maps world coordinates to chunks and creates and fills missing
//! chunks on first access.
//!
//! ## Addressing
//!
//! A world coordinate `c` belongs to chunk `floor(c / volume_size)`. The floor matters
//! for negatives: `-0.1` lives in chunk `-1` (origin `-volume_size`), not chunk `0`.
//! Chunk indices are bounded per axis to `-grid_size/2 ..= grid_size/2`. Asking for an
//! index outside that range is a contract violation and fails with
//! `Error::ChunkOutOfRange`; it is never clamped.
//!
//! Inside the grid, chunk index `i` is stored under `grid_size/2 - i`, which maps the
//! closed index range onto `0 ..= 2 * (grid_size/2)`.
//!
//! ## Lifetime
//!
//! Chunks are created on first resolution and kept forever. Grid storage only grows.
//!
//! ## Thread Safety
//!
//! Resolution takes a grid-wide lock. Creating and filling a missing chunk happens
//! under that lock, so two threads resolving the same missing index observe a single
//! `Volume` instance and the loader runs once per index. Each volume sits in its own
//! `MtResource` so readers of different chunks never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use cgmath::{Point3, Vector3};
use log::debug;
use web_time::Instant;

use super::element::Element;
use super::loader::Loader;
use super::volume::volume_factory::{SparseVolumeFactory, VolumeFactory};
use super::volume::Volume;
use crate::core::MtResource;
use crate::error::{Error, Result};

/// A lazily populated, bounded grid of equally sized cubic volumes.
pub struct VolumeGrid {
    /// Edge length of every volume in cells.
    volume_size: i32,
    /// Number of chunks per axis.
    grid_size: Vector3<i32>,
    /// Builds empty volumes for new chunks.
    factory: Box<dyn VolumeFactory>,
    /// Fills new volumes exactly once.
    loader: Arc<dyn Loader>,
    /// Materialized chunks keyed by storage index.
    volumes: Mutex<HashMap<Point3<u32>, MtResource<Volume>>>,
}

impl VolumeGrid {
    /// Creates a grid that builds sparse volumes.
    ///
    /// # Arguments
    /// * `volume_size` - Edge length of a chunk in cells
    /// * `grid_size` - Number of chunks per axis
    /// * `loader` - Fills each chunk when it is first resolved
    ///
    /// # Errors
    /// `Error::InvalidConfig` if any size is not positive.
    pub fn new(volume_size: i32, grid_size: [i32; 3], loader: Arc<dyn Loader>) -> Result<Self> {
        Self::with_factory(volume_size, grid_size, loader, Box::new(SparseVolumeFactory))
    }

    /// Creates a grid with a custom volume factory.
    pub fn with_factory(
        volume_size: i32,
        grid_size: [i32; 3],
        loader: Arc<dyn Loader>,
        factory: Box<dyn VolumeFactory>,
    ) -> Result<Self> {
        if volume_size <= 0 || grid_size.iter().any(|&n| n <= 0) {
            return Err(Error::InvalidConfig(format!(
                "grid needs positive sizes, got volume_size {volume_size} and grid_size {grid_size:?}"
            )));
        }
        Ok(VolumeGrid {
            volume_size,
            grid_size: grid_size.into(),
            factory,
            loader,
            volumes: Mutex::new(HashMap::new()),
        })
    }

    /// Edge length of every volume in cells.
    pub fn volume_size(&self) -> i32 {
        self.volume_size
    }

    /// Number of chunks per axis.
    pub fn grid_size(&self) -> Vector3<i32> {
        self.grid_size
    }

    /// Smallest and largest valid chunk index (both inclusive).
    pub fn index_range(&self) -> (Point3<i32>, Point3<i32>) {
        let half = self.grid_size / 2;
        (Point3::new(-half.x, -half.y, -half.z), Point3::new(half.x, half.y, half.z))
    }

    /// Whether a chunk index lies inside the configured bounds.
    pub fn contains_index(&self, index: Point3<i32>) -> bool {
        let (min, max) = self.index_range();
        (min.x..=max.x).contains(&index.x)
            && (min.y..=max.y).contains(&index.y)
            && (min.z..=max.z).contains(&index.z)
    }

    /// Chunk index owning a floating point world position.
    ///
    /// # Errors
    /// `Error::NonFinitePosition` if any coordinate is NaN or infinite.
    pub fn chunk_index_of(&self, x: f32, y: f32, z: f32) -> Result<Point3<i32>> {
        let size = self.volume_size as f32;
        world_cell(x / size, y / size, z / size).map_err(|_| Error::NonFinitePosition([x, y, z]))
    }

    /// Chunk index owning an integer world cell.
    pub fn chunk_index_of_cell(&self, world: Point3<i32>) -> Point3<i32> {
        Point3::new(
            world.x.div_euclid(self.volume_size),
            world.y.div_euclid(self.volume_size),
            world.z.div_euclid(self.volume_size),
        )
    }

    /// World origin of the chunk with the given index.
    pub fn chunk_origin(&self, index: Point3<i32>) -> Point3<i32> {
        index * self.volume_size
    }

    /// Resolves the chunk owning a world position, creating it if needed.
    ///
    /// # Errors
    /// `Error::ChunkOutOfRange` if the owning chunk lies outside the grid, or whatever
    /// the loader reports while filling a new chunk.
    pub fn resolve_by_world_position(&self, x: f32, y: f32, z: f32) -> Result<MtResource<Volume>> {
        self.resolve_by_index(self.chunk_index_of(x, y, z)?)
    }

    /// Resolves a chunk by index, creating and filling it on first access.
    ///
    /// A new chunk has origin `index * volume_size` and size `volume_size³`. If the
    /// loader fails, nothing is stored and the error is returned.
    ///
    /// # Errors
    /// `Error::ChunkOutOfRange` if the index lies outside the grid, or the loader's
    /// error.
    pub fn resolve_by_index(&self, index: Point3<i32>) -> Result<MtResource<Volume>> {
        let key = self.storage_index(index)?;
        let mut volumes = self.volumes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(volume) = volumes.get(&key) {
            return Ok(volume.clone());
        }

        let start = Instant::now();
        let size = Vector3::new(self.volume_size, self.volume_size, self.volume_size);
        let mut volume = self.factory.create(self.chunk_origin(index), size);
        self.loader.fill(&mut volume)?;
        debug!(
            "Filled chunk {:?} with {} elements in {:?}",
            index,
            volume.len(),
            start.elapsed()
        );

        let volume = MtResource::new(volume);
        volumes.insert(key, volume.clone());
        Ok(volume)
    }

    /// Returns the chunk at `index` only if it was already created.
    pub fn loaded_volume(&self, index: Point3<i32>) -> Option<MtResource<Volume>> {
        let key = self.storage_index(index).ok()?;
        self.volumes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Reads the element at a floating point world position.
    ///
    /// # Errors
    /// `Error::NonFinitePosition` for NaN or infinite coordinates, otherwise as
    /// [`VolumeGrid::element_at`].
    pub fn get_element(&self, x: f32, y: f32, z: f32) -> Result<Element> {
        self.element_at(world_cell(x, y, z)?)
    }

    /// Reads the element at an integer world cell.
    pub fn element_at(&self, world: Point3<i32>) -> Result<Element> {
        let volume = self.resolve_by_index(self.chunk_index_of_cell(world))?;
        let volume = volume.get();
        let local = volume.world_to_local(world);
        volume.get(local.x, local.y, local.z)
    }

    /// Reads a cell for boundary visibility tests.
    ///
    /// Cells in chunks beyond the grid bounds read as `Element::EMPTY`: the world is
    /// open at its edges. Every other failure propagates.
    pub fn neighbor_element(&self, world: Point3<i32>) -> Result<Element> {
        if !self.contains_index(self.chunk_index_of_cell(world)) {
            return Ok(Element::EMPTY);
        }
        self.element_at(world)
    }

    /// Writes the element at an integer world cell.
    ///
    /// Like `Volume::set`, this does not mark any node dirty.
    pub fn set_element(&self, world: Point3<i32>, element: Element) -> Result<()> {
        let volume = self.resolve_by_index(self.chunk_index_of_cell(world))?;
        let mut volume = volume.get_mut();
        let local = volume.world_to_local(world);
        volume.set(local.x, local.y, local.z, element)
    }

    /// Number of chunks created so far.
    pub fn volume_count(&self) -> usize {
        self.volumes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Maps a chunk index onto its storage key, `grid_size/2 - index` per axis.
    fn storage_index(&self, index: Point3<i32>) -> Result<Point3<u32>> {
        if !self.contains_index(index) {
            let (min, max) = self.index_range();
            return Err(Error::ChunkOutOfRange { index, min, max });
        }
        let half = self.grid_size / 2;
        Ok(Point3::new(
            (half.x - index.x) as u32,
            (half.y - index.y) as u32,
            (half.z - index.z) as u32,
        ))
    }
}

/// Floors a finite position to the integer cell containing it.
///
/// Coordinates beyond the `i32` range saturate, which later fails the grid bounds check.
fn world_cell(x: f32, y: f32, z: f32) -> Result<Point3<i32>> {
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(Error::NonFinitePosition([x, y, z]));
    }
    Ok(Point3::new(x.floor() as i32, y.floor() as i32, z.floor() as i32))
}
