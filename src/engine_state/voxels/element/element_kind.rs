//! # Element Kind Module
//!
//! The palette of element type codes the built-in loaders and the default appearance
//! service understand.

use num_derive::FromPrimitive;

use super::ElementTypeCode;
use crate::error::{Error, Result};

/// Enumerates the element kinds known to the engine.
///
/// The discriminants are the type codes stored in `Element::element_type`. The
/// `FromPrimitive` derive allows conversion from those integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum ElementKind {
    /// Plain dirt.
    Dirt = 1,
    /// Dirt with a grass top.
    Grass = 2,
    /// Sand.
    Sand = 3,
    /// Stone.
    Stone = 4,
    /// Wood with bark on the sides.
    Wood = 5,
    /// Water, translucent.
    Water = 6,
    /// Glass, translucent.
    Glass = 7,
}

impl ElementKind {
    /// Every kind, in type code order.
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Dirt,
        ElementKind::Grass,
        ElementKind::Sand,
        ElementKind::Stone,
        ElementKind::Wood,
        ElementKind::Water,
        ElementKind::Glass,
    ];

    /// Converts a type code into a kind.
    ///
    /// # Errors
    /// `Error::UnsupportedElementType` if the code is not in the palette.
    pub fn from_code(code: ElementTypeCode) -> Result<Self> {
        num::FromPrimitive::from_i32(code).ok_or(Error::UnsupportedElementType(code))
    }

    /// The type code of this kind.
    pub fn code(self) -> ElementTypeCode {
        self as ElementTypeCode
    }

    /// Whether light passes through elements of this kind.
    pub fn is_translucent(self) -> bool {
        matches!(self, ElementKind::Water | ElementKind::Glass)
    }

    /// Picks a random kind (opaque or translucent) from the given generator.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::ALL[rng.usize(..Self::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_code() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_code(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        for code in [-1, 0, 8, 1000] {
            assert!(matches!(
                ElementKind::from_code(code),
                Err(Error::UnsupportedElementType(c)) if c == code
            ));
        }
    }

    #[test]
    fn only_water_and_glass_are_translucent() {
        let translucent: Vec<_> = ElementKind::ALL
            .into_iter()
            .filter(|k| k.is_translucent())
            .collect();
        assert_eq!(translucent, vec![ElementKind::Water, ElementKind::Glass]);
    }
}
