//! # Voxel Data
//!
//! Everything that stores or produces voxel contents. Meshing lives in `rendering`.
//!
//! ## Architecture
//!
//! * **Element**: a type code plus a density, the value stored per cell
//! * **Volume**: a cubic chunk of elements with an occupancy mask
//! * **Grid**: chunks addressed by integer index, created lazily on first access
//! * **Loader**: fills a freshly created chunk (solid, checkerboard, random, noise)
//!
//! ## Coordinates
//!
//! World cells map to chunk index `floor(cell / volume_size)` on every axis, so
//! negative coordinates land in negative chunks (`-1` is the last cell of chunk `-1`).
//! Local coordinates inside a chunk always lie in `0..volume_size`.
//!
//! ## Thread Safety
//!
//! * Each volume sits behind its own read-write lock
//! * The grid's chunk map sits behind a mutex held only while looking up or creating
//!   a chunk, never while meshing

pub mod element;
pub mod grid;
pub mod loader;
pub mod volume;
