//! The externally visible geometry store.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;

use super::meshing::MaterialMesh;

/// Published geometry keyed by chunk index.
///
/// Only the consumer side of the pipeline mutates the scene. Attached geometry is
/// immutable; a republished node replaces its whole entry.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: HashMap<Point3<i32>, Arc<[MaterialMesh]>>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches geometry for a chunk, returning what it replaces.
    pub fn attach(
        &mut self,
        index: Point3<i32>,
        meshes: Arc<[MaterialMesh]>,
    ) -> Option<Arc<[MaterialMesh]>> {
        self.meshes.insert(index, meshes)
    }

    /// Removes a chunk's geometry.
    pub fn detach(&mut self, index: Point3<i32>) -> Option<Arc<[MaterialMesh]>> {
        self.meshes.remove(&index)
    }

    /// Geometry currently attached for a chunk.
    pub fn get(&self, index: Point3<i32>) -> Option<&Arc<[MaterialMesh]>> {
        self.meshes.get(&index)
    }

    /// Number of chunks with attached geometry.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Number of meshes over all chunks.
    pub fn mesh_count(&self) -> usize {
        self.meshes.values().map(|meshes| meshes.len()).sum()
    }

    /// Number of triangles over all chunks.
    pub fn triangle_count(&self) -> usize {
        self.meshes
            .values()
            .flat_map(|meshes| meshes.iter())
            .map(MaterialMesh::triangle_count)
            .sum()
    }

    /// Iterates over attached chunks and their geometry.
    pub fn iter(&self) -> impl Iterator<Item = (&Point3<i32>, &Arc<[MaterialMesh]>)> {
        self.meshes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::appearance::Material;

    fn mesh(triangles: usize) -> MaterialMesh {
        MaterialMesh {
            element_type: 1,
            material: Material::Opaque,
            vertices: Vec::new(),
            indices: vec![0; triangles * 3],
        }
    }

    #[test]
    fn attach_replaces_and_detach_removes() {
        let mut scene = Scene::new();
        let index = Point3::new(1, 0, -1);
        assert!(scene.attach(index, vec![mesh(2)].into()).is_none());
        let previous = scene.attach(index, vec![mesh(1), mesh(3)].into()).unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.mesh_count(), 2);
        assert_eq!(scene.triangle_count(), 4);
        assert!(scene.detach(index).is_some());
        assert!(scene.is_empty());
        assert!(scene.get(index).is_none());
    }
}
