use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, lock-protected ownership of a value.
///
/// Wraps an `Arc<RwLock<T>>`. Cloning hands out another handle to the same value.
/// Volumes live in one of these so that a node's extractor can read neighbouring
/// chunks while edits take the write side.
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_mesh_engine::core::MtResource;
/// use voxel_mesh_engine::engine_state::voxels::{element::Element, volume::Volume};
///
/// let chunk = MtResource::new(Volume::new(Point3::new(0, 0, 0), Vector3::new(4, 4, 4)));
/// let writer = chunk.clone();
/// std::thread::spawn(move || writer.get_mut().set(1, 1, 1, Element::new(4, 1.0)))
///     .join()
///     .unwrap()
///     .unwrap();
/// assert_eq!(chunk.get().len(), 1);
/// ```
///
/// # Poisoning
/// A writer that panicked leaves the lock poisoned. The data behind a poisoned lock is
/// still handed out: every writer in this crate leaves the value consistent between
/// individual element writes, so there is nothing to roll back.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource`.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard for the contained value.
    ///
    /// Blocks while a writer holds the lock.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive guard for the contained value.
    ///
    /// Blocks until all readers and any other writer have released the lock.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` when both handles point at the same underlying value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + std::fmt::Debug> std::fmt::Debug for MtResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MtResource").field(&*self.get()).finish()
    }
}
