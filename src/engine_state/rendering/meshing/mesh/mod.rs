//! Mesh buffers produced by the surface extractors.
//!
//! # Architecture
//! - [`Face`]: one axis-aligned quad of a voxel cell, used by the cubic extractor
//! - [`SurfaceMesh`]: vertex and index buffers for one element type, with optional
//!   reuse of vertices that share an exact position
//! - [`MeshAccumulator`]: a `SurfaceMesh` per element type, finished into
//!   [`MaterialMesh`]es once a volume has been scanned
//!
//! # Usage
//! ```
//! use cgmath::{Point2, Point3, Vector3};
//! use voxel_mesh_engine::engine_state::rendering::{
//!     appearance::AtlasAppearance, meshing::mesh::MeshAccumulator, Vertex,
//! };
//!
//! let v = |x: f32| Vertex::new(Point3::new(x, 0.0, 0.0), Vector3::unit_z(), Point2::new(0.0, 0.0));
//! let mut accumulator = MeshAccumulator::new(false);
//! accumulator.mesh_for(1).add_triangle(v(0.0), v(1.0), v(2.0));
//! let meshes = accumulator.finish(&AtlasAppearance::default()).unwrap();
//! assert_eq!(meshes[0].indices, vec![0, 1, 2]);
//! ```

mod accumulator;
mod face;
mod surface_mesh;

pub use accumulator::{MaterialMesh, MeshAccumulator};
pub use face::Face;
pub use surface_mesh::SurfaceMesh;
