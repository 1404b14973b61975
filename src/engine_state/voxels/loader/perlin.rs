//! # Perlin Terrain Loader
//!
//! Generates terrain by sampling 3D Perlin noise at every cell and applying a
//! threshold band. Samples outside `-threshold..=threshold` become solid; the band
//! in between is carved out, which produces caves and overhangs.
//!
//! The element kind follows world height: stone deep down, dirt in the middle and
//! grass near the surface. The stored density is the magnitude of the noise sample,
//! so it is at least `threshold` in every solid cell and grows away from the carved
//! band.

use cgmath::Point3;
use log::debug;
use noise::{NoiseFn, Perlin};
use web_time::Instant;

use super::{for_each_cell, Loader};
use crate::engine_state::voxels::element::{element_kind::ElementKind, Element};
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

/// World height below which solid cells are stone.
pub const STONE_LEVEL: i32 = -8;
/// World height below which solid cells are dirt; above it they are grass.
pub const DIRT_LEVEL: i32 = 4;

/// Perlin noise terrain.
#[derive(Clone, Debug)]
pub struct PerlinTerrainLoader {
    perlin: Perlin,
    scale: f64,
    threshold: f64,
}

impl PerlinTerrainLoader {
    /// Creates a terrain loader.
    ///
    /// # Arguments
    /// * `seed` - Noise seed
    /// * `scale` - Factor applied to world coordinates before sampling
    /// * `threshold` - Half width of the carved band around zero
    pub fn new(seed: u32, scale: f64, threshold: f64) -> Self {
        PerlinTerrainLoader {
            perlin: Perlin::new(seed),
            scale,
            threshold,
        }
    }

    /// Samples the raw noise value at a world cell.
    pub fn sample(&self, world: Point3<i32>) -> f64 {
        self.perlin.get([
            world.x as f64 * self.scale,
            world.y as f64 * self.scale,
            world.z as f64 * self.scale,
        ])
    }

    fn kind_at_height(y: i32) -> ElementKind {
        if y < STONE_LEVEL {
            ElementKind::Stone
        } else if y < DIRT_LEVEL {
            ElementKind::Dirt
        } else {
            ElementKind::Grass
        }
    }
}

impl Loader for PerlinTerrainLoader {
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        let start = Instant::now();
        for_each_cell(volume, |volume, local, world| {
            let sample = self.sample(world);
            if (-self.threshold..=self.threshold).contains(&sample) {
                return Ok(());
            }
            let element = Element::of_kind(Self::kind_at_height(world.y), sample.abs() as f32);
            volume.set(local.x, local.y, local.z, element)
        })?;
        debug!(
            "Perlin fill of {:?} produced {} elements in {:?}",
            volume.origin(),
            volume.len(),
            start.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn fill_matches_the_threshold_band() {
        let loader = PerlinTerrainLoader::new(0, 0.05, 0.2);
        let mut volume = Volume::new(Point3::new(-8, -16, 8), Vector3::new(8, 8, 8));
        loader.fill(&mut volume).unwrap();
        for z in 0..8 {
            for y in 0..8 {
                for x in 0..8 {
                    let world = volume.local_to_world(Point3::new(x, y, z));
                    let solid = loader.sample(world).abs() > 0.2;
                    assert_eq!(!volume.get(x, y, z).unwrap().is_empty(), solid);
                }
            }
        }
    }

    #[test]
    fn kinds_follow_height() {
        assert_eq!(PerlinTerrainLoader::kind_at_height(-20), ElementKind::Stone);
        assert_eq!(PerlinTerrainLoader::kind_at_height(0), ElementKind::Dirt);
        assert_eq!(PerlinTerrainLoader::kind_at_height(10), ElementKind::Grass);
    }

    #[test]
    fn fill_is_deterministic() {
        let loader = PerlinTerrainLoader::new(7, 0.1, 0.1);
        let mut a = Volume::new(Point3::new(0, 0, 0), Vector3::new(6, 6, 6));
        let mut b = a.clone();
        loader.fill(&mut a).unwrap();
        loader.fill(&mut b).unwrap();
        assert!(a.iter_occupied().eq(b.iter_occupied()));
    }
}
