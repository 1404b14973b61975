//! Geometry production for the voxel engine.
//!
//! This module turns volumes into triangle meshes and keeps track of what has been
//! published. Nothing here talks to a GPU; consumers read finished meshes out of the
//! `Scene`.
//!
//! * `appearance` maps element types to materials and atlas texture coordinates
//! * `meshing` holds the surface extractors and the mesh builders
//! * `volume_node` drives one chunk through the Dirty, Calculated, UpToDate cycle
//! * `scene` stores the published geometry per chunk

pub mod appearance;
pub mod meshing;
pub mod scene;
mod vertex;
pub mod volume_node;

pub use vertex::Vertex;
