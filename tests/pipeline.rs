use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cgmath::{InnerSpace, MetricSpace, Point3};
use voxel_mesh_engine::config::{AppearanceKind, EngineConfig, ExtractorKind, LoaderConfig};
use voxel_mesh_engine::engine_state::rendering::appearance::{AtlasAppearance, Material};
use voxel_mesh_engine::engine_state::rendering::volume_node::NodeStatus;
use voxel_mesh_engine::engine_state::voxels::element::Element;
use voxel_mesh_engine::engine_state::voxels::loader::{EmptyLoader, Loader, SolidLoader};
use voxel_mesh_engine::engine_state::voxels::volume::Volume;
use voxel_mesh_engine::engine_state::EngineState;
use voxel_mesh_engine::error::{Error, Result};

fn config(volume_size: i32, grid_size: [i32; 3], view_distance: i32) -> EngineConfig {
    EngineConfig {
        volume_size,
        grid_size,
        view_distance,
        worker_threads: 2,
        ..EngineConfig::default()
    }
}

fn engine(config: EngineConfig, loader: Arc<dyn Loader>) -> EngineState {
    EngineState::new(config, loader, Arc::new(AtlasAppearance::default())).unwrap()
}

/// Steps frames until every scheduled node has been published or dropped.
fn settle(engine: &mut EngineState, observer: Point3<f32>) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        engine.update(observer).unwrap();
        if engine.pending() == 0 {
            return;
        }
        assert!(Instant::now() < deadline, "pipeline did not settle");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn solid_chunk_is_published_as_its_outer_shell() {
    let mut engine = engine(config(4, [1, 1, 1], 1), Arc::new(SolidLoader::new(1).unwrap()));
    let origin = Point3::new(0.0, 0.0, 0.0);
    let stats = engine.update(origin).unwrap();
    // Only index (0, 0, 0) exists in a 1x1x1 grid.
    assert_eq!(stats.scheduled, 1);

    settle(&mut engine, origin);
    let node = engine.node(Point3::new(0, 0, 0)).unwrap();
    assert_eq!(node.status(), NodeStatus::UpToDate);
    // 6 sides of 4x4 quads, two triangles each.
    assert_eq!(engine.scene().triangle_count(), 6 * 16 * 2);
    assert_eq!(engine.scene().mesh_count(), 1);
    assert_eq!(engine.failure_count(), 0);
}

#[test]
fn streaming_follows_the_observer() {
    let mut engine = engine(config(8, [8, 1, 8], 1), Arc::new(EmptyLoader));
    let stats = engine.update(Point3::new(0.0, 0.0, 0.0)).unwrap();
    assert_eq!(stats.scheduled, 9);
    assert_eq!(engine.node_count(), 9);

    // Less than half a chunk of movement does not re-stream.
    let stats = engine.update(Point3::new(3.0, 0.0, 0.0)).unwrap();
    assert_eq!(stats.scheduled, 0);

    // Two chunks along x adds the columns at x = 2 and x = 3.
    let stats = engine.update(Point3::new(16.0, 0.0, 0.0)).unwrap();
    assert_eq!(stats.scheduled, 6);
    assert_eq!(engine.node_count(), 15);
    assert!(engine.node(Point3::new(3, 0, 1)).is_some());
    assert!(engine.node(Point3::new(4, 0, 0)).is_none());

    settle(&mut engine, Point3::new(16.0, 0.0, 0.0));
    assert_eq!(engine.scene().len(), 15);
    assert_eq!(engine.scene().triangle_count(), 0);
}

#[test]
fn streaming_stops_at_the_grid_bounds() {
    let mut engine = engine(config(8, [2, 2, 2], 3), Arc::new(EmptyLoader));
    engine.update(Point3::new(0.0, 0.0, 0.0)).unwrap();
    // Indices run over -1..=1 on every axis.
    assert_eq!(engine.node_count(), 27);
    let (min, max) = engine.grid().index_range();
    assert_eq!(min, Point3::new(-1, -1, -1));
    assert_eq!(max, Point3::new(1, 1, 1));
}

#[test]
fn publication_is_bounded_per_frame() {
    let mut config = config(4, [4, 1, 4], 2);
    config.max_updates_per_frame = 2;
    let mut engine = engine(config, Arc::new(SolidLoader::new(4).unwrap()));
    let origin = Point3::new(0.0, 0.0, 0.0);
    let first = engine.update(origin).unwrap();
    assert_eq!(first.scheduled, 25);
    assert!(first.published <= 2);

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut published = first.published;
    while engine.pending() > 0 {
        assert!(Instant::now() < deadline);
        let stats = engine.update(origin).unwrap();
        assert!(stats.published <= 2);
        published += stats.published;
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(published, 25);
    assert_eq!(engine.scene().len(), 25);
}

#[test]
fn unknown_element_types_are_counted_as_failures() {
    let loader = Arc::new(|volume: &mut Volume| -> Result<()> {
        volume.set(1, 1, 1, Element::new(42, 1.0))
    });
    let mut engine = engine(config(4, [1, 1, 1], 0), loader);
    let origin = Point3::new(0.0, 0.0, 0.0);
    settle(&mut engine, origin);

    assert_eq!(engine.failure_count(), 1);
    assert!(engine.scene().is_empty());
    assert_eq!(
        engine.node(Point3::new(0, 0, 0)).unwrap().status(),
        NodeStatus::Dirty
    );
}

/// Density is the distance to the chunk center, so `density <= 2.5` is a ball.
fn ball(volume: &mut Volume) -> Result<()> {
    let size = volume.size();
    let center = Point3::new(4.0f32, 4.0, 4.0);
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                let distance = Point3::new(x as f32, y as f32, z as f32).distance(center);
                volume.set(x, y, z, Element::new(3, distance))?;
            }
        }
    }
    Ok(())
}

fn isosurface_engine(kind: ExtractorKind) -> EngineState {
    let mut config = config(9, [1, 1, 1], 0);
    config.extractor = kind;
    config.iso_level = 2.5;
    engine(config, Arc::new(ball))
}

#[test]
fn isosurface_extractors_enclose_the_ball() {
    for kind in [ExtractorKind::MarchingCubes, ExtractorKind::MarchingTetrahedra] {
        let mut engine = isosurface_engine(kind);
        settle(&mut engine, Point3::new(0.0, 0.0, 0.0));

        let meshes = engine.scene().get(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(meshes.len(), 1, "{kind:?}");
        let mesh = &meshes[0];
        assert_eq!(mesh.element_type, 3);
        assert!(mesh.triangle_count() > 0, "{kind:?}");
        assert_eq!(mesh.indices.len() % 3, 0);

        let center = Point3::new(4.0f32, 4.0, 4.0);
        for vertex in &mesh.vertices {
            // Vertices sit on edges crossing the surface, at most a cube diagonal away.
            let distance = vertex.position().distance(center);
            assert!((0.75..=4.25).contains(&distance), "{kind:?}: {distance}");
            let length = vertex.normal().magnitude();
            assert!((length - 1.0).abs() < 1e-4, "{kind:?}: normal length {length}");
        }
    }
}

#[test]
fn engine_builds_from_configuration() {
    let config = EngineConfig {
        loader: LoaderConfig::Checkerboard { element_type: 2 },
        ..config(4, [1, 1, 1], 0)
    };
    let mut engine = EngineState::from_config(config).unwrap();
    settle(&mut engine, Point3::new(0.0, 0.0, 0.0));
    // 32 isolated cubes, nothing hides anything.
    assert_eq!(engine.scene().triangle_count(), 32 * 12);

    let bad = EngineConfig {
        loader: LoaderConfig::Solid { element_type: 99 },
        ..EngineConfig::default()
    };
    assert!(matches!(
        EngineState::from_config(bad),
        Err(Error::UnsupportedElementType(99))
    ));
}

#[test]
fn default_iso_level_publishes_only_triangles_with_area() {
    for loader in [
        EngineConfig::default().loader,
        LoaderConfig::Checkerboard { element_type: 4 },
    ] {
        let config = EngineConfig {
            extractor: ExtractorKind::MarchingCubes,
            loader: loader.clone(),
            ..config(16, [1, 1, 1], 0)
        };
        assert_eq!(config.iso_level, 0.0);
        let mut engine = EngineState::from_config(config).unwrap();
        settle(&mut engine, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(engine.failure_count(), 0);

        let meshes = engine.scene().get(Point3::new(0, 0, 0)).unwrap();
        for mesh in meshes.iter() {
            for vertex in &mesh.vertices {
                let length = vertex.normal().magnitude();
                assert!((length - 1.0).abs() < 1e-4, "{loader:?}: normal length {length}");
            }
        }
        if let LoaderConfig::Checkerboard { .. } = loader {
            // Every cut lands on an empty corner, so nothing has area.
            assert_eq!(engine.scene().triangle_count(), 0);
        }
    }
}

#[test]
fn observers_must_have_finite_positions() {
    let mut engine = engine(config(8, [2, 2, 2], 1), Arc::new(EmptyLoader));
    assert!(matches!(
        engine.update(Point3::new(f32::NAN, 0.0, 0.0)),
        Err(Error::NonFinitePosition(_))
    ));
    assert_eq!(engine.node_count(), 0);

    // Far outside the grid is valid, there is just nothing to stream.
    let stats = engine.update(Point3::new(1e30, 0.0, -1e30)).unwrap();
    assert_eq!(stats.scheduled, 0);
    assert_eq!(engine.node_count(), 0);

    let stats = engine.update(Point3::new(0.0, 0.0, 0.0)).unwrap();
    assert_eq!(stats.scheduled, 27);
}

#[test]
fn flat_colors_span_the_whole_image() {
    let config = EngineConfig {
        appearance: AppearanceKind::Color,
        loader: LoaderConfig::Solid { element_type: 6 },
        ..config(4, [1, 1, 1], 0)
    };
    let mut engine = EngineState::from_config(config).unwrap();
    settle(&mut engine, Point3::new(0.0, 0.0, 0.0));

    let meshes = engine.scene().get(Point3::new(0, 0, 0)).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].material, Material::Translucent);
    assert_eq!(meshes[0].triangle_count(), 6 * 16 * 2);
    for vertex in &meshes[0].vertices {
        let [u, v] = vertex.tex_coords;
        assert!(u == 0.0 || u == 1.0);
        assert!(v == 0.0 || v == 1.0);
    }
}
