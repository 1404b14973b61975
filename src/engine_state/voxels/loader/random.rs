//! Seeded random scatter, mostly useful for stress testing the meshers.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use super::{for_each_cell, Loader};
use crate::engine_state::voxels::element::{element_kind::ElementKind, Element};
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

/// Scatters random palette elements with random densities in `0..1`.
///
/// Each chunk draws from its own generator, seeded from the base seed and the chunk
/// origin, so the result does not depend on the order chunks are created in.
#[derive(Copy, Clone, Debug)]
pub struct RandomLoader {
    seed: u64,
    sparseness: f64,
}

impl RandomLoader {
    /// Creates a random loader.
    ///
    /// # Arguments
    /// * `seed` - Base seed
    /// * `sparseness` - Probability that a cell stays empty
    pub fn new(seed: u64, sparseness: f64) -> Self {
        RandomLoader { seed, sparseness }
    }

    fn chunk_seed(&self, origin: Point3<i32>) -> u64 {
        self.seed
            ^ (origin.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (origin.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ (origin.z as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
    }
}

impl Loader for RandomLoader {
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(volume.origin()));
        for_each_cell(volume, |volume, local, _| {
            if rng.f64() < self.sparseness {
                return Ok(());
            }
            let kind = ElementKind::random(&mut rng);
            volume.set(local.x, local.y, local.z, Element::of_kind(kind, rng.f32()))
        })?;
        debug!("Random fill of {:?} took {:?}", volume.origin(), start.elapsed());
        Ok(())
    }
}
