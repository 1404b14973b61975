//! # Element Module
//!
//! The smallest unit of volume data. An `Element` pairs an integer type code with a
//! scalar density. The type drives material lookup and face culling in the cubic
//! mesher; the density is the scalar field sampled by the isosurface mesher.
//!
//! The distinguished `Element::EMPTY` (type `-1`) marks a cell with no material.
//! Emptiness is decided by the type code alone, never by comparing densities.

use element_kind::ElementKind;

pub mod element_kind;
pub mod element_side;

/// The underlying integer type used for element type codes.
pub type ElementTypeCode = i32;

/// Type code reserved for empty cells.
pub const EMPTY_TYPE: ElementTypeCode = -1;

/// A single cell of volume data.
///
/// Elements are small `Copy` values. The `#[repr(C)]` layout lets whole slices of
/// elements be viewed as bytes with `bytemuck`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Element {
    /// The element type code, `EMPTY_TYPE` for empty cells.
    pub element_type: ElementTypeCode,
    /// Scalar density used by the isosurface extractors.
    pub density: f32,
}

impl Element {
    /// The "no material here" sentinel.
    pub const EMPTY: Element = Element {
        element_type: EMPTY_TYPE,
        density: 0.0,
    };

    /// Creates an element from a raw type code and density.
    pub const fn new(element_type: ElementTypeCode, density: f32) -> Self {
        Element {
            element_type,
            density,
        }
    }

    /// Creates an element of a known kind.
    pub fn of_kind(kind: ElementKind, density: f32) -> Self {
        Element::new(kind as ElementTypeCode, density)
    }

    /// Returns `true` for the empty sentinel, whatever its density.
    pub fn is_empty(&self) -> bool {
        self.element_type == EMPTY_TYPE
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_ignores_density() {
        assert!(Element::EMPTY.is_empty());
        assert!(Element::new(EMPTY_TYPE, 0.7).is_empty());
        assert!(!Element::new(0, 0.0).is_empty());
        assert!(!Element::of_kind(ElementKind::Stone, 1.0).is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(Element::default(), Element::EMPTY);
    }

    #[test]
    fn elements_cast_to_bytes() {
        let elements = [Element::new(4, 1.5), Element::EMPTY];
        let bytes: &[u8] = bytemuck::cast_slice(&elements);
        assert_eq!(bytes.len(), 16);
    }
}
