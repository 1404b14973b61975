//! # Element Side Module
//!
//! The six axis-aligned faces of a voxel cell, with the geometry the cubic mesher
//! needs for each: outward normal, the offset to the adjacent cell, and the four quad
//! corners.

use cgmath::{Vector3, Zero};

/// Represents the six possible faces of a voxel cell.
///
/// Each variant carries a unique index which doubles as its bit position in a face
/// mask (`1 << side`).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum ElementSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl ElementSide {
    /// Returns an array containing all six faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [ElementSide; 6] {
        [
            ElementSide::FRONT,
            ElementSide::BACK,
            ElementSide::BOTTOM,
            ElementSide::TOP,
            ElementSide::LEFT,
            ElementSide::RIGHT,
        ]
    }

    /// This side's bit in a 6-bit face mask.
    pub fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Offset from a cell to the neighbour across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            ElementSide::FRONT => Vector3::unit_z(),
            ElementSide::BACK => -Vector3::unit_z(),
            ElementSide::BOTTOM => -Vector3::unit_y(),
            ElementSide::TOP => Vector3::unit_y(),
            ElementSide::LEFT => -Vector3::unit_x(),
            ElementSide::RIGHT => Vector3::unit_x(),
        }
    }

    /// Outward unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().cast::<f32>().unwrap_or_else(Vector3::zero)
    }

    /// Corners of this face on the unit cell `[0,1]³`.
    ///
    /// The order is bottom-left, bottom-right, top-left, top-right as seen from
    /// outside the cell, matching the order of texture coordinates handed out by the
    /// appearance service. Indexed as `[2, 0, 1, 1, 3, 2]` this yields two
    /// counter-clockwise triangles.
    pub fn corners(self) -> [Vector3<f32>; 4] {
        let v = Vector3::new;
        match self {
            ElementSide::FRONT => [
                v(0.0, 0.0, 1.0),
                v(1.0, 0.0, 1.0),
                v(0.0, 1.0, 1.0),
                v(1.0, 1.0, 1.0),
            ],
            ElementSide::BACK => [
                v(1.0, 0.0, 0.0),
                v(0.0, 0.0, 0.0),
                v(1.0, 1.0, 0.0),
                v(0.0, 1.0, 0.0),
            ],
            ElementSide::BOTTOM => [
                v(0.0, 0.0, 0.0),
                v(1.0, 0.0, 0.0),
                v(0.0, 0.0, 1.0),
                v(1.0, 0.0, 1.0),
            ],
            ElementSide::TOP => [
                v(0.0, 1.0, 1.0),
                v(1.0, 1.0, 1.0),
                v(0.0, 1.0, 0.0),
                v(1.0, 1.0, 0.0),
            ],
            ElementSide::LEFT => [
                v(0.0, 0.0, 0.0),
                v(0.0, 0.0, 1.0),
                v(0.0, 1.0, 0.0),
                v(0.0, 1.0, 1.0),
            ],
            ElementSide::RIGHT => [
                v(1.0, 0.0, 1.0),
                v(1.0, 0.0, 0.0),
                v(1.0, 1.0, 1.0),
                v(1.0, 1.0, 0.0),
            ],
        }
    }
}

/// Triangle indices for one quad built from `ElementSide::corners`.
pub const QUAD_INDICES: [u32; 6] = [2, 0, 1, 1, 3, 2];

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn masks_are_distinct_bits() {
        let combined = ElementSide::all()
            .iter()
            .fold(0u8, |acc, side| {
                assert_eq!(acc & side.mask(), 0);
                acc | side.mask()
            });
        assert_eq!(combined, 0b11_1111);
    }

    #[test]
    fn quad_winding_faces_outward() {
        for side in ElementSide::all() {
            let c = side.corners();
            for tri in QUAD_INDICES.chunks(3) {
                let a = c[tri[0] as usize];
                let b = c[tri[1] as usize];
                let d = c[tri[2] as usize];
                let n = (b - a).cross(d - a).normalize();
                assert!(
                    (n - side.normal()).magnitude() < 1e-6,
                    "{side:?} triangle {tri:?} has normal {n:?}"
                );
            }
        }
    }

    #[test]
    fn corners_lie_on_the_face_plane() {
        for side in ElementSide::all() {
            let normal = side.normal();
            // The face plane sits at 1 along a positive normal and 0 along a negative one.
            let plane = if normal.x + normal.y + normal.z > 0.0 { 1.0 } else { 0.0 };
            for corner in side.corners() {
                assert_eq!(corner.dot(normal).abs(), plane);
            }
        }
    }
}
