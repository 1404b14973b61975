//! Loader that samples an arbitrary scalar field.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use super::{for_each_cell, Loader};
use crate::engine_state::voxels::element::{element_kind::ElementKind, Element, ElementTypeCode};
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

/// Fills cells where a scalar field is positive.
///
/// `field` is evaluated at every world cell. Cells with a positive value become
/// elements carrying that value as density; `material` picks their type code from the
/// cell position and the density. Codes outside the palette abort the fill with
/// `Error::UnsupportedElementType`.
pub struct DensityFieldLoader<F, M> {
    field: F,
    material: M,
}

impl<F, M> DensityFieldLoader<F, M>
where
    F: Fn(Point3<f32>) -> f32 + Send + Sync,
    M: Fn(Point3<i32>, f32) -> ElementTypeCode + Send + Sync,
{
    /// Creates a loader from a field and a material mapping.
    pub fn new(field: F, material: M) -> Self {
        DensityFieldLoader { field, material }
    }
}

impl<F, M> Loader for DensityFieldLoader<F, M>
where
    F: Fn(Point3<f32>) -> f32 + Send + Sync,
    M: Fn(Point3<i32>, f32) -> ElementTypeCode + Send + Sync,
{
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        let start = Instant::now();
        for_each_cell(volume, |volume, local, world| {
            let density = (self.field)(Point3::new(world.x as f32, world.y as f32, world.z as f32));
            if density <= 0.0 {
                return Ok(());
            }
            let kind = ElementKind::from_code((self.material)(world, density))?;
            volume.set(local.x, local.y, local.z, Element::of_kind(kind, density))
        })?;
        debug!("Density field fill of {:?} took {:?}", volume.origin(), start.elapsed());
        Ok(())
    }
}
