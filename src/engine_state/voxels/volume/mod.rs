//! # Volume Module
//!
//! A `Volume` is one chunk of the world: a fixed-size box of `Element`s positioned at
//! an integer world origin. Origin and size never change after construction; only the
//! element contents do.
//!
//! ## Storage
//!
//! Volumes are sparse. Two structures are kept in step:
//! - `occupancy`: a bit vector (1 bit per cell) that is set for every non-empty cell
//! - `elements`: a hash map from linear cell index to the element stored there
//!
//! Empty cells cost one bit and are never present in `elements`. The bit vector gives
//! O(1) emptiness checks and lets iteration jump straight to occupied cells.
//!
//! Cells are laid out with X varying fastest, then Y, then Z.
//!
//! ## Thread Safety
//!
//! `Volume` itself does no locking. Shared volumes are wrapped in an `MtResource`
//! by the `VolumeGrid`; readers take the read side, edits take the write side.

use std::collections::HashMap;

use bitvec::vec::BitVec;
use cgmath::{Point3, Vector3};

use super::element::Element;
use crate::error::{Error, Result};

pub mod volume_factory;
pub mod volume_iteration;

use volume_iteration::VolumeElementIterator;

/// A fixed-size, origin-positioned sparse container of elements.
#[derive(Clone, Debug)]
pub struct Volume {
    /// World position of local cell `(0, 0, 0)`.
    origin: Point3<i32>,
    /// Number of cells along each axis.
    size: Vector3<i32>,
    /// One bit per cell, set where the cell holds a non-empty element.
    occupancy: BitVec,
    /// Non-empty elements keyed by linear cell index.
    elements: HashMap<usize, Element>,
}

impl Volume {
    /// Creates an empty volume.
    ///
    /// # Arguments
    /// * `origin` - World position of local cell `(0, 0, 0)`
    /// * `size` - Number of cells along each axis; negative components are treated as zero
    pub fn new(origin: Point3<i32>, size: Vector3<i32>) -> Self {
        let size = Vector3::new(size.x.max(0), size.y.max(0), size.z.max(0));
        let cells = size.x as usize * size.y as usize * size.z as usize;
        Volume {
            origin,
            size,
            occupancy: BitVec::repeat(false, cells),
            elements: HashMap::new(),
        }
    }

    /// World position of local cell `(0, 0, 0)`.
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> Vector3<i32> {
        self.size
    }

    /// Whether a local coordinate lies inside this volume.
    pub fn contains_local(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.size.x).contains(&x) && (0..self.size.y).contains(&y) && (0..self.size.z).contains(&z)
    }

    /// Whether a world coordinate lies inside this volume.
    pub fn contains_world(&self, world: Point3<i32>) -> bool {
        let local = self.world_to_local(world);
        self.contains_local(local.x, local.y, local.z)
    }

    /// Converts a world coordinate into this volume's local frame (unchecked).
    pub fn world_to_local(&self, world: Point3<i32>) -> Point3<i32> {
        Point3::new(
            world.x - self.origin.x,
            world.y - self.origin.y,
            world.z - self.origin.z,
        )
    }

    /// Converts a local coordinate into world space (unchecked).
    pub fn local_to_world(&self, local: Point3<i32>) -> Point3<i32> {
        self.origin + Vector3::new(local.x, local.y, local.z)
    }

    /// Reads the element at a local coordinate.
    ///
    /// # Returns
    /// The stored element, or `Element::EMPTY` if the cell was never set.
    ///
    /// # Errors
    /// `Error::OutOfBounds` unless `0 <= x < size.x` (same for y and z).
    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<Element> {
        let index = self.linear_index(x, y, z)?;
        if !self.occupancy[index] {
            return Ok(Element::EMPTY);
        }
        Ok(self.elements.get(&index).copied().unwrap_or(Element::EMPTY))
    }

    /// Overwrites the element at a local coordinate.
    ///
    /// Writing `Element::EMPTY` (or any element with the empty type) removes the
    /// cell's entry. No dependent node is notified; callers mark nodes dirty.
    ///
    /// # Errors
    /// `Error::OutOfBounds` unless `0 <= x < size.x` (same for y and z).
    pub fn set(&mut self, x: i32, y: i32, z: i32, element: Element) -> Result<()> {
        let index = self.linear_index(x, y, z)?;
        if element.is_empty() {
            self.occupancy.set(index, false);
            self.elements.remove(&index);
        } else {
            self.occupancy.set(index, true);
            self.elements.insert(index, element);
        }
        Ok(())
    }

    /// Whether the cell at a local coordinate holds a non-empty element.
    pub fn is_occupied(&self, x: i32, y: i32, z: i32) -> Result<bool> {
        Ok(self.occupancy[self.linear_index(x, y, z)?])
    }

    /// Removes every element. Origin and size are unchanged.
    pub fn clear(&mut self) {
        self.occupancy.fill(false);
        self.elements.clear();
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates the non-empty cells in layout order.
    pub fn iter_occupied(&self) -> VolumeElementIterator<'_> {
        VolumeElementIterator::new(self)
    }

    fn linear_index(&self, x: i32, y: i32, z: i32) -> Result<usize> {
        if !self.contains_local(x, y, z) {
            return Err(Error::OutOfBounds {
                x,
                y,
                z,
                size: self.size.into(),
            });
        }
        Ok(x as usize + self.size.x as usize * (y as usize + self.size.y as usize * z as usize))
    }

    fn local_from_linear(&self, index: usize) -> Point3<i32> {
        let sx = self.size.x as usize;
        let sy = self.size.y as usize;
        Point3::new(
            (index % sx) as i32,
            ((index / sx) % sy) as i32,
            (index / (sx * sy)) as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cube(n: i32) -> Volume {
        Volume::new(Point3::new(0, 0, 0), Vector3::new(n, n, n))
    }

    #[test]
    fn unset_cells_read_empty() {
        let volume = cube(4);
        assert!(volume.get(3, 3, 3).unwrap().is_empty());
        assert!(volume.is_empty());
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut volume = cube(4);
        for (x, y, z) in [(-1, 0, 0), (0, -1, 0), (0, 0, -1), (4, 0, 0), (0, 4, 0), (0, 0, 4)] {
            assert!(matches!(volume.get(x, y, z), Err(Error::OutOfBounds { .. })));
            assert!(volume.set(x, y, z, Element::new(1, 1.0)).is_err());
        }
    }

    #[test]
    fn setting_empty_removes_the_cell() {
        let mut volume = cube(4);
        volume.set(1, 2, 3, Element::new(2, 0.5)).unwrap();
        assert_eq!(volume.len(), 1);
        assert!(volume.is_occupied(1, 2, 3).unwrap());
        volume.set(1, 2, 3, Element::EMPTY).unwrap();
        assert_eq!(volume.len(), 0);
        assert!(!volume.is_occupied(1, 2, 3).unwrap());
    }

    #[test]
    fn clear_keeps_origin_and_size() {
        let mut volume = Volume::new(Point3::new(-8, 0, 8), Vector3::new(2, 3, 4));
        volume.set(1, 2, 3, Element::new(1, 1.0)).unwrap();
        volume.clear();
        assert!(volume.is_empty());
        assert_eq!(volume.origin(), Point3::new(-8, 0, 8));
        assert_eq!(volume.size(), Vector3::new(2, 3, 4));
        assert!(volume.get(1, 2, 3).unwrap().is_empty());
    }

    #[test]
    fn iteration_visits_occupied_cells_in_layout_order() {
        let mut volume = Volume::new(Point3::new(10, 20, 30), Vector3::new(3, 2, 2));
        volume.set(2, 1, 1, Element::new(3, 0.0)).unwrap();
        volume.set(0, 0, 0, Element::new(1, 0.0)).unwrap();
        volume.set(1, 1, 0, Element::new(2, 0.0)).unwrap();
        let visited: Vec<_> = volume
            .iter_occupied()
            .map(|(p, e)| (p, e.element_type))
            .collect();
        assert_eq!(
            visited,
            vec![
                (Point3::new(0, 0, 0), 1),
                (Point3::new(1, 1, 0), 2),
                (Point3::new(2, 1, 1), 3),
            ]
        );
    }

    #[test]
    fn world_and_local_frames_agree() {
        let volume = Volume::new(Point3::new(-64, 0, 64), Vector3::new(64, 64, 64));
        let world = Point3::new(-1, 5, 127);
        let local = volume.world_to_local(world);
        assert_eq!(local, Point3::new(63, 5, 63));
        assert_eq!(volume.local_to_world(local), world);
        assert!(volume.contains_world(world));
        assert!(!volume.contains_world(Point3::new(0, 5, 127)));
    }

    proptest! {
        #[test]
        fn set_then_get_returns_the_element(
            (sx, sy, sz) in (1i32..12, 1i32..12, 1i32..12),
            fx in 0.0f64..1.0, fy in 0.0f64..1.0, fz in 0.0f64..1.0,
            element_type in 0i32..16,
            density in -10.0f32..10.0,
        ) {
            let mut volume = Volume::new(Point3::new(0, 0, 0), Vector3::new(sx, sy, sz));
            let x = (fx * sx as f64) as i32;
            let y = (fy * sy as f64) as i32;
            let z = (fz * sz as f64) as i32;
            let element = Element::new(element_type, density);
            volume.set(x, y, z, element).unwrap();
            prop_assert_eq!(volume.get(x, y, z).unwrap(), element);
        }

        #[test]
        fn coordinates_outside_fail(
            (sx, sy, sz) in (1i32..12, 1i32..12, 1i32..12),
            x in -20i32..20, y in -20i32..20, z in -20i32..20,
        ) {
            let mut volume = Volume::new(Point3::new(0, 0, 0), Vector3::new(sx, sy, sz));
            let inside = (0..sx).contains(&x) && (0..sy).contains(&y) && (0..sz).contains(&z);
            prop_assert_eq!(volume.get(x, y, z).is_ok(), inside);
            prop_assert_eq!(volume.set(x, y, z, Element::new(1, 1.0)).is_ok(), inside);
        }
    }
}
