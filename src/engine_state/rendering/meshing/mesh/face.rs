use cgmath::{EuclideanSpace, Point2, Point3};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::element::{element_side::ElementSide, ElementTypeCode};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-left,
/// upper-right) as seen from outside the cell, and carries the element type and the
/// side it belongs to so texture coordinates can be resolved per face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in world coordinates
    pub ll: Point3<f32>,
    /// Lower-right corner of the face in world coordinates
    pub lr: Point3<f32>,
    /// Upper-left corner of the face in world coordinates
    pub ul: Point3<f32>,
    /// Upper-right corner of the face in world coordinates
    pub ur: Point3<f32>,
    /// The element type code, used for texture and material lookup
    pub element_type: ElementTypeCode,
    /// Which side of the cell this face represents
    pub side: ElementSide,
}

impl Face {
    /// Creates the face of the cell at `world` on the given side.
    ///
    /// # Arguments
    /// * `world` - World coordinate of the cell's minimum corner
    /// * `element_type` - Type of the element owning the face
    /// * `side` - Which side of the cell this face represents
    pub fn new(world: Point3<i32>, element_type: ElementTypeCode, side: ElementSide) -> Self {
        let base = world.cast::<f32>().unwrap_or_else(Point3::origin);
        let [ll, lr, ul, ur] = side.corners().map(|corner| base + corner);
        Face {
            ll,
            lr,
            ul,
            ur,
            element_type,
            side,
        }
    }

    /// Generates the four vertices of this face.
    ///
    /// # Arguments
    /// * `tex_coords` - Texture coordinates in [ll, lr, ul, ur] order
    ///
    /// # Returns
    /// Vertices in [ll, lr, ul, ur] order sharing the face normal. Indexed with
    /// `QUAD_INDICES` they form two counter-clockwise triangles.
    pub fn vertices(&self, tex_coords: [Point2<f32>; 4]) -> [Vertex; 4] {
        let normal = self.side.normal();
        [
            Vertex::new(self.ll, normal, tex_coords[0]),
            Vertex::new(self.lr, normal, tex_coords[1]),
            Vertex::new(self.ul, normal, tex_coords[2]),
            Vertex::new(self.ur, normal, tex_coords[3]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn faces_sit_on_their_side_of_the_cell() {
        let world = Point3::new(-3, 4, 10);
        for side in ElementSide::all() {
            let face = Face::new(world, 1, side);
            let center = Point3::new(-2.5f32, 4.5, 10.5);
            for corner in [face.ll, face.lr, face.ul, face.ur] {
                // Every corner lies half a cell out along the normal.
                assert!(((corner - center).dot(side.normal()) - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn vertices_carry_the_side_normal() {
        let face = Face::new(Point3::new(0, 0, 0), 2, ElementSide::TOP);
        let uv = [Point2::new(0.0, 0.0); 4];
        assert!(face
            .vertices(uv)
            .iter()
            .all(|v| v.normal() == ElementSide::TOP.normal()));
    }
}
