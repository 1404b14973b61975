//! A single growable triangle mesh.

use std::collections::HashMap;

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::element::element_side::QUAD_INDICES;

/// Vertex and index buffers for one element type.
///
/// With position reuse enabled, a vertex whose position exactly matches one already in
/// the mesh is not stored again; the earlier vertex's index is handed out instead and
/// its normal and texture coordinates win.
#[derive(Debug, Default, Clone)]
pub struct SurfaceMesh {
    /// The vertex data for this mesh
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
    reuse_vertices: bool,
    lookup: HashMap<[u32; 3], u32>,
}

impl SurfaceMesh {
    /// Creates an empty mesh.
    ///
    /// # Arguments
    /// * `reuse_vertices` - Deduplicate vertices that share an exact position
    pub fn new(reuse_vertices: bool) -> Self {
        SurfaceMesh {
            reuse_vertices,
            ..Default::default()
        }
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        if !self.reuse_vertices {
            self.vertices.push(vertex);
            return index;
        }
        // `+ 0.0` folds -0.0 into 0.0 so both hash alike.
        let key = vertex.position.map(|c| (c + 0.0).to_bits());
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(vertex);
            index
        })
    }

    /// Adds one triangle given in counter-clockwise order.
    pub fn add_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        let a = self.add_vertex(a);
        let b = self.add_vertex(b);
        let c = self.add_vertex(c);
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Adds a quad given as [ll, lr, ul, ur] as two triangles.
    pub fn add_quad(&mut self, corners: [Vertex; 4]) {
        let corners = corners.map(|v| self.add_vertex(v));
        self.indices
            .extend(QUAD_INDICES.iter().map(|&i| corners[i as usize]));
    }

    /// Removes all geometry, keeping the reuse setting.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.lookup.clear();
    }

    /// Number of stored vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if no vertex was added.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point2, Point3, Vector3};

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(Point3::new(x, y, z), Vector3::unit_y(), Point2::new(0.0, 0.0))
    }

    #[test]
    fn triangles_without_reuse_keep_every_vertex() {
        let mut mesh = SurfaceMesh::new(false);
        mesh.add_triangle(vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0));
        mesh.add_triangle(vertex(1.0, 0.0, 0.0), vertex(1.0, 1.0, 0.0), vertex(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn reuse_shares_exact_positions() {
        let mut mesh = SurfaceMesh::new(true);
        mesh.add_triangle(vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0));
        mesh.add_triangle(vertex(1.0, 0.0, 0.0), vertex(1.0, 1.0, 0.0), vertex(-0.0, 1.0, 0.0));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn quads_use_the_shared_winding() {
        let mut mesh = SurfaceMesh::new(false);
        mesh.add_vertex(vertex(9.0, 9.0, 9.0));
        mesh.add_quad([
            vertex(0.0, 0.0, 0.0),
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(1.0, 1.0, 0.0),
        ]);
        assert_eq!(mesh.indices, vec![3, 1, 2, 2, 4, 3]);
    }

    #[test]
    fn clear_forgets_reused_positions() {
        let mut mesh = SurfaceMesh::new(true);
        mesh.add_vertex(vertex(0.0, 0.0, 0.0));
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.add_vertex(vertex(0.0, 0.0, 0.0)), 0);
        assert_eq!(mesh.vertex_count(), 1);
    }
}
