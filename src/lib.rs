#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesh Engine
//!
//! A chunked voxel world with background surface extraction.
//!
//! The world is a grid of fixed-size chunks (`Volume`s) filled lazily by a terrain
//! loader. Each chunk gets a `VolumeNode` that a worker pool meshes off the caller's
//! thread, either with cubic face culling or with an isosurface polygonizer (marching
//! cubes or marching tetrahedra). Finished geometry is published to a `Scene` on the
//! thread that owns the `EngineState`.
//!
//! ## Key Modules
//!
//! * `config` - JSON-backed engine settings
//! * `core` - Shared concurrency primitives
//! * `engine_state` - The world coordinator, voxel storage, meshing and the worker pool
//! * `error` - Error and result types
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_mesh_engine::{config::EngineConfig, engine_state::EngineState};
//!
//! let mut engine = EngineState::from_config(EngineConfig::default())?;
//! let stats = engine.update(Point3::new(0.0, 0.0, 0.0))?;
//! println!("scheduled {} chunks", stats.scheduled);
//! # Ok::<(), voxel_mesh_engine::error::Error>(())
//! ```

use std::time::Duration;

use cgmath::Point3;
use log::info;
use web_time::Instant;

use config::EngineConfig;
use engine_state::EngineState;
use error::Result;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "VOXEL_CONFIG";

/// Frames the headless driver walks the observer through.
const DEMO_FRAMES: usize = 4;

/// Runs the engine headless: streams chunks along a short walk and logs the result.
///
/// Logging is configured from `RUST_LOG`. The configuration is read from the file
/// named by `VOXEL_CONFIG`, or defaults are used.
///
/// # Errors
/// Configuration, loader or pipeline failures.
pub fn run() -> Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            EngineConfig::from_path(path)?
        }
        None => EngineConfig::default(),
    };
    let step = config.volume_size as f32;
    let mut engine = EngineState::from_config(config)?;

    let start = Instant::now();
    for frame in 0..DEMO_FRAMES {
        let observer = Point3::new(frame as f32 * step, 0.0, 0.0);
        let stats = engine.update(observer)?;
        info!("Frame {frame} at {:?}: {:?}", observer, stats);
        drain(&mut engine, observer)?;
    }

    info!(
        "Meshed {} chunks into {} meshes, {} triangles in {:?} ({} failures)",
        engine.scene().len(),
        engine.scene().mesh_count(),
        engine.scene().triangle_count(),
        start.elapsed(),
        engine.failure_count()
    );
    Ok(())
}

/// Keeps stepping frames until nothing is left in flight.
fn drain(engine: &mut EngineState, observer: Point3<f32>) -> Result<()> {
    while engine.pending() > 0 {
        engine.update(observer)?;
        std::thread::sleep(Duration::from_millis(1));
    }
    Ok(())
}
