//! # Cubic Extractor
//!
//! Face culling mesher: every occupied cell contributes one quad for each of its six
//! faces that is visible. A face is visible when
//!
//! * the neighbouring cell is empty, or
//! * the cell is translucent and the neighbour is opaque or a different translucent
//!   type, or
//! * the cell is opaque and the neighbour is translucent.
//!
//! ## Chunk Edges
//!
//! Neighbours outside the volume are read through the grid. Across the minimum edge
//! (local coordinate `-1`) the full rule applies. Across the maximum edge (local
//! coordinate `size`) a face is emitted only if the neighbour is empty; any other
//! face on that plane is owned by the neighbouring chunk, which sees it across its
//! own minimum edge. This keeps shared planes from being meshed twice.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{Point2, Point3};
use log::debug;
use web_time::Instant;

use super::mesh::{Face, MaterialMesh, MeshAccumulator};
use super::SurfaceExtractor;
use crate::engine_state::rendering::appearance::Appearance;
use crate::engine_state::voxels::element::{element_side::ElementSide, Element, ElementTypeCode};
use crate::engine_state::voxels::grid::VolumeGrid;
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

/// Axis-aligned face culling mesher.
pub struct CubicExtractor {
    appearance: Arc<dyn Appearance>,
}

impl CubicExtractor {
    /// Creates a cubic extractor.
    pub fn new(appearance: Arc<dyn Appearance>) -> Self {
        CubicExtractor { appearance }
    }

    /// Whether `element` shows its face towards a non-empty neighbour.
    fn needs_face(&self, element: Element, translucent: bool, neighbor: Element) -> Result<bool> {
        if neighbor.is_empty() {
            return Ok(true);
        }
        let neighbor_translucent = self.appearance.is_translucent(neighbor.element_type)?;
        Ok(if translucent {
            !neighbor_translucent || neighbor.element_type != element.element_type
        } else {
            neighbor_translucent
        })
    }

    /// Computes the 6-bit mask of visible faces of the cell at `local`.
    ///
    /// Bit `side as u8` is set when `side` needs a quad.
    pub fn face_mask(
        &self,
        grid: &VolumeGrid,
        volume: &Volume,
        local: Point3<i32>,
        element: Element,
    ) -> Result<u8> {
        let translucent = self.appearance.is_translucent(element.element_type)?;
        let size = volume.size();
        let mut mask = 0;
        for side in ElementSide::all() {
            let n = local + side.offset();
            let visible = if volume.contains_local(n.x, n.y, n.z) {
                self.needs_face(element, translucent, volume.get(n.x, n.y, n.z)?)?
            } else {
                let neighbor = grid.neighbor_element(volume.local_to_world(n))?;
                if n.x >= size.x || n.y >= size.y || n.z >= size.z {
                    neighbor.is_empty()
                } else {
                    self.needs_face(element, translucent, neighbor)?
                }
            };
            if visible {
                mask |= side.mask();
            }
        }
        Ok(mask)
    }

    fn tex_coords(
        &self,
        cache: &mut HashMap<(ElementTypeCode, ElementSide), [Point2<f32>; 4]>,
        element_type: ElementTypeCode,
        side: ElementSide,
    ) -> Result<[Point2<f32>; 4]> {
        if let Some(uv) = cache.get(&(element_type, side)) {
            return Ok(*uv);
        }
        let uv = self.appearance.texture_coordinates(element_type, Some(side))?;
        cache.insert((element_type, side), uv);
        Ok(uv)
    }
}

impl SurfaceExtractor for CubicExtractor {
    fn extract(&self, grid: &VolumeGrid, volume: &Volume) -> Result<Vec<MaterialMesh>> {
        let start = Instant::now();
        let mut accumulator = MeshAccumulator::new(false);
        let mut uv_cache = HashMap::new();
        let mut faces = 0usize;

        for (local, element) in volume.iter_occupied() {
            let mask = self.face_mask(grid, volume, local, element)?;
            if mask == 0 {
                continue;
            }
            let world = volume.local_to_world(local);
            for side in ElementSide::all() {
                if mask & side.mask() == 0 {
                    continue;
                }
                let uv = self.tex_coords(&mut uv_cache, element.element_type, side)?;
                let face = Face::new(world, element.element_type, side);
                accumulator
                    .mesh_for(element.element_type)
                    .add_quad(face.vertices(uv));
                faces += 1;
            }
        }

        debug!(
            "Cubic extraction of {:?} emitted {} faces in {:?}",
            volume.origin(),
            faces,
            start.elapsed()
        );
        accumulator.finish(self.appearance.as_ref())
    }
}
