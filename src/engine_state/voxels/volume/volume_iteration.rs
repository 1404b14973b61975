//! # Volume Iteration Module
//!
//! Iterator over the non-empty cells of a `Volume`.
//!
//! The iterator walks the occupancy bit vector with `iter_ones`, so runs of empty
//! cells are skipped a machine word at a time, and looks each hit up in the element
//! map. Cells come out in layout order (X fastest, then Y, then Z), which keeps mesh
//! output deterministic.

use bitvec::{order::Lsb0, slice::IterOnes};
use cgmath::Point3;

use super::Volume;
use crate::engine_state::voxels::element::Element;

/// An iterator over all non-empty cells of a volume, yielding local coordinates.
pub struct VolumeElementIterator<'a> {
    /// The volume being iterated over
    volume: &'a Volume,
    /// Remaining set bits of the occupancy mask
    ones: IterOnes<'a, usize, Lsb0>,
}

impl<'a> VolumeElementIterator<'a> {
    pub(super) fn new(volume: &'a Volume) -> Self {
        VolumeElementIterator {
            volume,
            ones: volume.occupancy.iter_ones(),
        }
    }
}

impl Iterator for VolumeElementIterator<'_> {
    type Item = (Point3<i32>, Element);

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.ones.by_ref() {
            if let Some(element) = self.volume.elements.get(&index) {
                return Some((self.volume.local_from_linear(index), *element));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ones.size_hint()
    }
}
