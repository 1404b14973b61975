//! # Core Module
//!
//! Concurrency primitives shared across the engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking.
//!   Volumes are stored in one so that the grid, the owning node and neighbouring
//!   nodes all see the same chunk.

pub mod mt_resource;

pub use mt_resource::MtResource;
