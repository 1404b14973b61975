//! Error types for the voxel mesh engine.

use cgmath::Point3;
use thiserror::Error;

/// The main error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A local coordinate fell outside a volume.
    #[error("local coordinate ({x}, {y}, {z}) outside volume of size {size:?}")]
    OutOfBounds {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// Local z.
        z: i32,
        /// Volume dimensions.
        size: [i32; 3],
    },

    /// A chunk index fell outside the configured grid bounds.
    #[error("chunk index {index:?} outside grid range {min:?}..={max:?}")]
    ChunkOutOfRange {
        /// The rejected index.
        index: Point3<i32>,
        /// Smallest valid index.
        min: Point3<i32>,
        /// Largest valid index.
        max: Point3<i32>,
    },

    /// A world position had a NaN or infinite coordinate.
    #[error("world position {0:?} is not finite")]
    NonFinitePosition([f32; 3]),

    /// The appearance service has no entry for this element type.
    #[error("element type {0} is not registered")]
    UnregisteredElementType(i32),

    /// A loader was asked to place an element type it does not know.
    #[error("unsupported element type {0} in generation input")]
    UnsupportedElementType(i32),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The task pipeline has been shut down.
    #[error("task pipeline is closed")]
    PipelineClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
