//! # Voxel Mesh Engine Entry Point
//!
//! Runs the headless driver from the library.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_CONFIG=world.json cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_mesh_engine::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
