//! Vertex data structures for extracted geometry.
//!
//! This module defines the vertex format shared by both surface extractors. The
//! layout is plain `#[repr(C)]` data so published meshes can be copied into a GPU
//! vertex buffer without conversion.

use cgmath::{Point2, Point3, Vector3};

/// A vertex of an extracted mesh.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Unit normal; flat per face for both extractors
    pub normal: [f32; 3],
    /// UV texture coordinates into the texture atlas
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World space position
    /// * `normal` - Surface normal
    /// * `tex_coords` - Atlas texture coordinates
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, tex_coords: Point2<f32>) -> Self {
        Vertex {
            position: position.into(),
            normal: normal.into(),
            tex_coords: tex_coords.into(),
        }
    }

    /// The position as a point.
    pub fn position(&self) -> Point3<f32> {
        self.position.into()
    }

    /// The normal as a vector.
    pub fn normal(&self) -> Vector3<f32> {
        self.normal.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let vertices = [Vertex::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::unit_y(),
            Point2::new(0.5, 0.25),
        )];
        let floats: &[f32] = bytemuck::cast_slice(&vertices);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.5, 0.25]);
    }
}
