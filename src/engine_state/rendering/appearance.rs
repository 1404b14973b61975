//! # Appearance Module
//!
//! Resolves how an element type looks: which material it renders with, which texture
//! atlas tile each of its faces shows, and whether it is translucent. Both surface
//! extractors consult this service; it never touches volume data.
//!
//! ## Texture Atlas
//!
//! `AtlasAppearance` assumes a square atlas of square tiles, numbered row by row
//! from the bottom-left corner. The default layout is a 512 pixel atlas of 32 pixel
//! tiles (16 x 16 tiles). Tile numbers per face come from a compile-time `phf` map.
//!
//! ## Flat Colors
//!
//! `ColorAppearance` skips textures entirely: every type gets one RGBA color and each
//! face spans the whole (blank) image. Useful for debugging extractors.

use cgmath::Point2;

use crate::config::AtlasConfig;
use crate::engine_state::voxels::element::{
    element_kind::ElementKind, element_side::ElementSide, ElementTypeCode,
};
use crate::error::{Error, Result};

/// How a mesh is rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    /// Depth-tested and written, no blending.
    Opaque,
    /// Alpha blended, drawn after opaque geometry.
    Translucent,
}

/// Appearance resolution keyed by element type and face.
pub trait Appearance: Send + Sync {
    /// The material used for meshes of this type.
    fn material(&self, element_type: ElementTypeCode) -> Result<Material>;

    /// Texture coordinates for one face of this type.
    ///
    /// The four corners are ordered bottom-left, bottom-right, top-left, top-right.
    /// `side` is `None` for faces that are not axis-aligned.
    fn texture_coordinates(
        &self,
        element_type: ElementTypeCode,
        side: Option<ElementSide>,
    ) -> Result<[Point2<f32>; 4]>;

    /// Whether this type lets light through.
    fn is_translucent(&self, element_type: ElementTypeCode) -> Result<bool>;
}

/// Atlas tile per face, in `ElementSide` order: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT].
///
/// Kinds missing from this table are textured with the whole atlas image.
static ATLAS_TILES: phf::Map<i32, [u16; 6]> = phf::phf_map! {
    1i32 => [1, 1, 1, 1, 1, 1],
    2i32 => [2, 2, 1, 3, 2, 2],
    3i32 => [5, 5, 5, 5, 5, 5],
    4i32 => [6, 6, 6, 6, 6, 6],
    5i32 => [0, 0, 4, 4, 0, 0],
    6i32 => [7, 7, 7, 7, 7, 7],
};

/// Texture atlas backed appearance for the built-in element palette.
#[derive(Copy, Clone, Debug)]
pub struct AtlasAppearance {
    /// Number of tiles along one edge of the atlas.
    tiles_per_row: u16,
    /// Edge length of one tile in UV units.
    tile_uv: f32,
}

impl AtlasAppearance {
    /// Creates an appearance for the given atlas layout.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the tile size is zero or does not divide the atlas.
    pub fn new(atlas: AtlasConfig) -> Result<Self> {
        if atlas.tile_size == 0 || atlas.atlas_size % atlas.tile_size != 0 {
            return Err(Error::InvalidConfig(format!(
                "tile_size {} does not divide atlas_size {}",
                atlas.tile_size, atlas.atlas_size
            )));
        }
        let tiles_per_row = (atlas.atlas_size / atlas.tile_size).min(u16::MAX as u32) as u16;
        Ok(AtlasAppearance {
            tiles_per_row,
            tile_uv: atlas.tile_size as f32 / atlas.atlas_size as f32,
        })
    }

    fn kind(element_type: ElementTypeCode) -> Result<ElementKind> {
        ElementKind::from_code(element_type).map_err(|_| Error::UnregisteredElementType(element_type))
    }

    fn tile_corners(&self, tile: u16) -> [Point2<f32>; 4] {
        let s = self.tile_uv;
        let x = (tile % self.tiles_per_row) as f32 * s;
        let y = (tile / self.tiles_per_row) as f32 * s;
        [
            Point2::new(x, y),
            Point2::new(x + s, y),
            Point2::new(x, y + s),
            Point2::new(x + s, y + s),
        ]
    }
}

impl Default for AtlasAppearance {
    fn default() -> Self {
        AtlasAppearance {
            tiles_per_row: 16,
            tile_uv: 32.0 / 512.0,
        }
    }
}

impl Appearance for AtlasAppearance {
    fn material(&self, element_type: ElementTypeCode) -> Result<Material> {
        Ok(if Self::kind(element_type)?.is_translucent() {
            Material::Translucent
        } else {
            Material::Opaque
        })
    }

    fn texture_coordinates(
        &self,
        element_type: ElementTypeCode,
        side: Option<ElementSide>,
    ) -> Result<[Point2<f32>; 4]> {
        let kind = Self::kind(element_type)?;
        let Some(tiles) = ATLAS_TILES.get(&kind.code()) else {
            return Ok([
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
            ]);
        };
        let side = side.unwrap_or(ElementSide::TOP);
        Ok(self.tile_corners(tiles[side as usize]))
    }

    fn is_translucent(&self, element_type: ElementTypeCode) -> Result<bool> {
        Ok(Self::kind(element_type)?.is_translucent())
    }
}

/// Flat color per element type, as 8-bit RGB.
static ELEMENT_COLORS: phf::Map<i32, [u8; 3]> = phf::phf_map! {
    1i32 => [134, 96, 67],
    2i32 => [89, 166, 52],
    3i32 => [219, 207, 163],
    4i32 => [125, 125, 125],
    5i32 => [102, 81, 51],
    6i32 => [47, 88, 198],
    7i32 => [200, 230, 240],
};

/// Untextured appearance with one color per element type.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorAppearance;

impl ColorAppearance {
    /// Linear RGBA color of `element_type`. Alpha is always `1.0`; translucency is
    /// carried by the material.
    ///
    /// # Errors
    /// `Error::UnregisteredElementType` for types without a color.
    pub fn color(&self, element_type: ElementTypeCode) -> Result<[f32; 4]> {
        let [r, g, b] = ELEMENT_COLORS
            .get(&element_type)
            .ok_or(Error::UnregisteredElementType(element_type))?;
        Ok([*r as f32 / 255.0, *g as f32 / 255.0, *b as f32 / 255.0, 1.0])
    }
}

impl Appearance for ColorAppearance {
    fn material(&self, element_type: ElementTypeCode) -> Result<Material> {
        Ok(if self.is_translucent(element_type)? {
            Material::Translucent
        } else {
            Material::Opaque
        })
    }

    fn texture_coordinates(
        &self,
        element_type: ElementTypeCode,
        _side: Option<ElementSide>,
    ) -> Result<[Point2<f32>; 4]> {
        self.color(element_type)?;
        Ok([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        ])
    }

    fn is_translucent(&self, element_type: ElementTypeCode) -> Result<bool> {
        self.color(element_type)?;
        Ok(AtlasAppearance::kind(element_type)?.is_translucent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_types_are_unregistered() {
        let appearance = AtlasAppearance::default();
        assert!(matches!(
            appearance.material(42),
            Err(Error::UnregisteredElementType(42))
        ));
        assert!(appearance.is_translucent(-1).is_err());
        assert!(appearance.texture_coordinates(0, None).is_err());
    }

    #[test]
    fn translucency_follows_the_palette() {
        let appearance = AtlasAppearance::default();
        assert!(appearance.is_translucent(ElementKind::Water.code()).unwrap());
        assert!(!appearance.is_translucent(ElementKind::Stone.code()).unwrap());
        assert_eq!(
            appearance.material(ElementKind::Glass.code()).unwrap(),
            Material::Translucent
        );
    }

    #[test]
    fn tiles_map_into_the_atlas() {
        let appearance = AtlasAppearance::default();
        let s = 32.0 / 512.0;
        // Grass top is tile 3.
        let uv = appearance
            .texture_coordinates(ElementKind::Grass.code(), Some(ElementSide::TOP))
            .unwrap();
        assert_eq!(uv[0], Point2::new(3.0 * s, 0.0));
        assert_eq!(uv[3], Point2::new(4.0 * s, s));
        // Non axis-aligned faces use the top tile.
        assert_eq!(
            appearance
                .texture_coordinates(ElementKind::Grass.code(), None)
                .unwrap(),
            uv
        );
    }

    #[test]
    fn tiles_wrap_to_the_next_row() {
        let appearance = AtlasAppearance::new(AtlasConfig {
            atlas_size: 64,
            tile_size: 32,
        })
        .unwrap();
        // Stone is tile 6: column 0, row 3 with two tiles per row.
        let uv = appearance
            .texture_coordinates(ElementKind::Stone.code(), Some(ElementSide::FRONT))
            .unwrap();
        assert_eq!(uv[0], Point2::new(0.0, 1.5));
    }

    #[test]
    fn unmapped_kinds_use_the_whole_image() {
        let appearance = AtlasAppearance::default();
        let uv = appearance
            .texture_coordinates(ElementKind::Glass.code(), Some(ElementSide::LEFT))
            .unwrap();
        assert_eq!(
            uv,
            [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0)
            ]
        );
    }

    #[test]
    fn colors_cover_the_palette() {
        let appearance = ColorAppearance;
        for kind in ElementKind::ALL {
            let [r, g, b, a] = appearance.color(kind.code()).unwrap();
            assert!([r, g, b].iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(a, 1.0);
            assert_eq!(
                appearance.is_translucent(kind.code()).unwrap(),
                matches!(kind, ElementKind::Water | ElementKind::Glass)
            );
            assert_eq!(
                appearance
                    .texture_coordinates(kind.code(), Some(ElementSide::TOP))
                    .unwrap()[3],
                Point2::new(1.0, 1.0)
            );
        }
        assert_eq!(
            appearance.material(ElementKind::Water.code()).unwrap(),
            Material::Translucent
        );
        assert_eq!(
            appearance.material(ElementKind::Sand.code()).unwrap(),
            Material::Opaque
        );
        assert!(matches!(
            appearance.color(8),
            Err(Error::UnregisteredElementType(8))
        ));
        assert!(appearance.texture_coordinates(0, None).is_err());
    }

    #[test]
    fn misaligned_atlas_is_rejected() {
        assert!(AtlasAppearance::new(AtlasConfig {
            atlas_size: 100,
            tile_size: 32
        })
        .is_err());
    }
}
