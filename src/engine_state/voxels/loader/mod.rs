//! # Loader Module
//!
//! Loaders populate freshly created volumes. The grid calls `Loader::fill` exactly once
//! per chunk, synchronously, while it holds its creation lock. A loader sees an empty
//! volume whose origin and size are already set.
//!
//! ## Determinism
//!
//! Every loader here derives its output from the volume's origin, its size and a seed
//! only. Filling the same chunk twice produces the same contents.
//!
//! ## Available Loaders
//!
//! - `EmptyLoader`: leaves chunks empty
//! - `SolidLoader`: fills every cell with one element type
//! - `CheckerboardLoader`: a 3D checkerboard aligned to world coordinates
//! - `RandomLoader`: a seeded random scatter (see `random`)
//! - `PerlinTerrainLoader`: Perlin noise terrain (see `perlin`)
//! - `DensityFieldLoader`: samples an arbitrary scalar field (see `density_field`)
//!
//! Any `Fn(&mut Volume) -> Result<()>` closure is a loader as well.

use std::sync::Arc;

use cgmath::Point3;

use super::element::{element_kind::ElementKind, Element, ElementTypeCode};
use super::volume::Volume;
use crate::config::LoaderConfig;
use crate::error::Result;

pub mod density_field;
pub mod perlin;
pub mod random;

pub use density_field::DensityFieldLoader;
pub use perlin::PerlinTerrainLoader;
pub use random::RandomLoader;

/// Populates a newly created volume.
pub trait Loader: Send + Sync {
    /// Fills `volume` in place.
    ///
    /// # Errors
    /// `Error::UnsupportedElementType` if the generation input names an element type
    /// outside the palette, or any error raised while writing cells.
    fn fill(&self, volume: &mut Volume) -> Result<()>;
}

impl<F> Loader for F
where
    F: Fn(&mut Volume) -> Result<()> + Send + Sync,
{
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        self(volume)
    }
}

/// Builds the loader described by a configuration entry.
///
/// # Errors
/// `Error::UnsupportedElementType` if the configuration names an unknown element type.
pub fn from_config(config: &LoaderConfig) -> Result<Arc<dyn Loader>> {
    Ok(match *config {
        LoaderConfig::Empty => Arc::new(EmptyLoader),
        LoaderConfig::Solid { element_type } => Arc::new(SolidLoader::new(element_type)?),
        LoaderConfig::Checkerboard { element_type } => {
            Arc::new(CheckerboardLoader::new(element_type)?)
        }
        LoaderConfig::Random { seed, sparseness } => Arc::new(RandomLoader::new(seed, sparseness)),
        LoaderConfig::Perlin {
            seed,
            scale,
            threshold,
        } => Arc::new(PerlinTerrainLoader::new(seed, scale, threshold)),
    })
}

/// Calls `f` with the local and world coordinate of every cell, Z outermost.
pub(crate) fn for_each_cell(
    volume: &mut Volume,
    mut f: impl FnMut(&mut Volume, Point3<i32>, Point3<i32>) -> Result<()>,
) -> Result<()> {
    let size = volume.size();
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                let local = Point3::new(x, y, z);
                let world = volume.local_to_world(local);
                f(volume, local, world)?;
            }
        }
    }
    Ok(())
}

/// Leaves every chunk empty.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyLoader;

impl Loader for EmptyLoader {
    fn fill(&self, _volume: &mut Volume) -> Result<()> {
        Ok(())
    }
}

/// Fills every cell with the same element.
#[derive(Copy, Clone, Debug)]
pub struct SolidLoader {
    element: Element,
}

impl SolidLoader {
    /// Creates a loader for a palette element type with density `1.0`.
    ///
    /// # Errors
    /// `Error::UnsupportedElementType` for codes outside the palette.
    pub fn new(element_type: ElementTypeCode) -> Result<Self> {
        let kind = ElementKind::from_code(element_type)?;
        Ok(SolidLoader {
            element: Element::of_kind(kind, 1.0),
        })
    }
}

impl Loader for SolidLoader {
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        for_each_cell(volume, |volume, local, _| {
            volume.set(local.x, local.y, local.z, self.element)
        })
    }
}

/// Fills cells whose world coordinates sum to an even number.
///
/// The pattern is aligned to world space, so it continues seamlessly across chunk
/// borders and every filled cell has six empty neighbours.
#[derive(Copy, Clone, Debug)]
pub struct CheckerboardLoader {
    element: Element,
}

impl CheckerboardLoader {
    /// Creates a checkerboard of a palette element type.
    ///
    /// # Errors
    /// `Error::UnsupportedElementType` for codes outside the palette.
    pub fn new(element_type: ElementTypeCode) -> Result<Self> {
        let kind = ElementKind::from_code(element_type)?;
        Ok(CheckerboardLoader {
            element: Element::of_kind(kind, 1.0),
        })
    }
}

impl Loader for CheckerboardLoader {
    fn fill(&self, volume: &mut Volume) -> Result<()> {
        for_each_cell(volume, |volume, local, world| {
            if (world.x + world.y + world.z).rem_euclid(2) == 0 {
                volume.set(local.x, local.y, local.z, self.element)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use cgmath::Vector3;

    fn volume_at(x: i32, y: i32, z: i32, n: i32) -> Volume {
        Volume::new(Point3::new(x, y, z), Vector3::new(n, n, n))
    }

    #[test]
    fn solid_fills_every_cell() {
        let mut volume = volume_at(0, 0, 0, 4);
        SolidLoader::new(4).unwrap().fill(&mut volume).unwrap();
        assert_eq!(volume.len(), 64);
        assert_eq!(volume.get(3, 3, 3).unwrap(), Element::new(4, 1.0));
    }

    #[test]
    fn unknown_types_are_rejected_up_front() {
        assert!(matches!(SolidLoader::new(42), Err(Error::UnsupportedElementType(42))));
        assert!(matches!(CheckerboardLoader::new(0), Err(Error::UnsupportedElementType(0))));
        assert!(from_config(&LoaderConfig::Solid { element_type: -1 }).is_err());
    }

    #[test]
    fn checkerboard_is_world_aligned() {
        let loader = CheckerboardLoader::new(1).unwrap();
        let mut a = volume_at(0, 0, 0, 3);
        let mut b = volume_at(3, 0, 0, 3);
        loader.fill(&mut a).unwrap();
        loader.fill(&mut b).unwrap();
        assert!(!a.get(0, 0, 0).unwrap().is_empty());
        assert!(!a.get(2, 0, 0).unwrap().is_empty());
        // World x = 3 is odd, so the first cell of the next chunk is empty.
        assert!(b.get(0, 0, 0).unwrap().is_empty());
        assert!(!b.get(1, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn closures_are_loaders() {
        let loader = |volume: &mut Volume| -> Result<()> { volume.set(0, 0, 0, Element::new(2, 0.5)) };
        let mut volume = volume_at(0, 0, 0, 2);
        loader.fill(&mut volume).unwrap();
        assert_eq!(volume.len(), 1);
    }

    #[test]
    fn config_builds_each_loader() {
        for config in [
            LoaderConfig::Empty,
            LoaderConfig::Solid { element_type: 1 },
            LoaderConfig::Checkerboard { element_type: 2 },
            LoaderConfig::Random { seed: 1, sparseness: 0.5 },
            LoaderConfig::Perlin { seed: 0, scale: 0.02, threshold: 0.2 },
        ] {
            let loader = from_config(&config).unwrap();
            let mut volume = volume_at(0, 0, 0, 4);
            loader.fill(&mut volume).unwrap();
        }
    }
}
