use std::collections::BTreeMap;

use super::surface_mesh::SurfaceMesh;
use crate::engine_state::rendering::appearance::{Appearance, Material};
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::element::ElementTypeCode;
use crate::error::Result;

/// Finished geometry for one element type.
///
/// This is the unit of geometry publication: a volume's extraction result is an
/// ordered list of these, one per type that produced at least one vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMesh {
    /// The element type this mesh was built from
    pub element_type: ElementTypeCode,
    /// Material resolved for `element_type`
    pub material: Material,
    /// The vertex data for this mesh
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MaterialMesh {
    /// Number of triangles in this mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Collects geometry per element type while a volume is scanned.
#[derive(Debug, Default)]
pub struct MeshAccumulator {
    reuse_vertices: bool,
    meshes: BTreeMap<ElementTypeCode, SurfaceMesh>,
}

impl MeshAccumulator {
    /// Creates an empty accumulator.
    ///
    /// # Arguments
    /// * `reuse_vertices` - Passed on to every `SurfaceMesh` it creates
    pub fn new(reuse_vertices: bool) -> Self {
        MeshAccumulator {
            reuse_vertices,
            meshes: BTreeMap::new(),
        }
    }

    /// The mesh collecting geometry for `element_type`, created on first use.
    pub fn mesh_for(&mut self, element_type: ElementTypeCode) -> &mut SurfaceMesh {
        let reuse_vertices = self.reuse_vertices;
        self.meshes
            .entry(element_type)
            .or_insert_with(|| SurfaceMesh::new(reuse_vertices))
    }

    /// Total triangles over all types.
    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(SurfaceMesh::triangle_count).sum()
    }

    /// Emits one `MaterialMesh` per type with at least one vertex, ordered by type.
    ///
    /// # Errors
    /// Fails if the appearance service does not know one of the collected types.
    pub fn finish(self, appearance: &dyn Appearance) -> Result<Vec<MaterialMesh>> {
        self.meshes
            .into_iter()
            .filter(|(_, mesh)| !mesh.is_empty())
            .map(|(element_type, mesh)| -> Result<MaterialMesh> {
                Ok(MaterialMesh {
                    element_type,
                    material: appearance.material(element_type)?,
                    vertices: mesh.vertices,
                    indices: mesh.indices,
                })
            })
            .collect()
    }
}
