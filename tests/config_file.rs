use std::fs;

use voxel_mesh_engine::config::{EngineConfig, ExtractorKind, LoaderConfig};
use voxel_mesh_engine::engine_state::EngineState;
use voxel_mesh_engine::error::Error;

#[test]
fn configuration_file_drives_the_engine() {
    let path = std::env::temp_dir().join(format!("voxel-config-{}.json", std::process::id()));
    fs::write(
        &path,
        r#"{
            "volume_size": 8,
            "grid_size": [2, 2, 2],
            "view_distance": 1,
            "worker_threads": 1,
            "extractor": { "kind": "marching_cubes" },
            "iso_level": 0.5,
            "reuse_vertices": true,
            "loader": { "kind": "perlin", "seed": 7, "scale": 0.1, "threshold": 0.3 }
        }"#,
    )
    .unwrap();
    let config = EngineConfig::from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.extractor, ExtractorKind::MarchingCubes);
    assert!(config.reuse_vertices);
    assert_eq!(
        config.loader,
        LoaderConfig::Perlin {
            seed: 7,
            scale: 0.1,
            threshold: 0.3
        }
    );

    let engine = EngineState::from_config(config.clone()).unwrap();
    assert_eq!(engine.config(), &config);
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn configuration_survives_a_json_round_trip() {
    let config = EngineConfig {
        extractor: ExtractorKind::MarchingTetrahedra,
        loader: LoaderConfig::Checkerboard { element_type: 5 },
        ..EngineConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn invalid_configuration_never_starts_workers() {
    let config = EngineConfig {
        view_distance: -1,
        ..EngineConfig::default()
    };
    assert!(matches!(
        EngineState::from_config(config),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn a_zero_frame_budget_is_rejected_before_streaming() {
    let config = EngineConfig {
        max_updates_per_frame: 0,
        ..EngineConfig::default()
    };
    assert!(matches!(
        EngineState::from_config(config),
        Err(Error::InvalidConfig(_))
    ));
}
