//! Construction of empty volumes for the grid.

use cgmath::{Point3, Vector3};

use super::Volume;

/// Builds the empty volume the grid hands to its loader.
///
/// The grid calls `create` exactly once per chunk index, with the chunk's world origin
/// and the configured chunk size.
pub trait VolumeFactory: Send + Sync {
    /// Creates an empty volume at `origin` spanning `size` cells.
    fn create(&self, origin: Point3<i32>, size: Vector3<i32>) -> Volume;
}

/// The default factory: a sparse, bit-masked `Volume`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SparseVolumeFactory;

impl VolumeFactory for SparseVolumeFactory {
    fn create(&self, origin: Point3<i32>, size: Vector3<i32>) -> Volume {
        Volume::new(origin, size)
    }
}
