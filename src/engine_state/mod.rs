//! # Engine State Module
//!
//! The world coordinator. `EngineState` ties the subsystems together:
//!
//! * `voxels` - element data, volumes, the chunk grid and terrain loaders
//! * `rendering` - appearance, surface extraction, volume nodes and the scene
//! * `task_management` - the worker pool that runs extraction off the caller's thread
//!
//! ## Frame Step
//!
//! Each call to `EngineState::update` is one frame on the consumer side:
//!
//! 1. If the observer moved more than half a chunk since the last streaming pass,
//!    every chunk within `view_distance` that has no node yet gets one and is
//!    scheduled, nearest first.
//! 2. At most `max_updates_per_frame` finished nodes are published to the scene.
//!
//! Scene mutation happens only here, on the thread that owns the `EngineState`.
//!
//! ## Edits
//!
//! `set_element` writes through the grid and reschedules the owning node plus every
//! loaded node whose chunk shares a face with the edited cell.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{MetricSpace, Point3, Vector3};
use log::{debug, info};

use crate::config::{AppearanceKind, EngineConfig};
use crate::error::Result;
use rendering::appearance::{Appearance, AtlasAppearance, ColorAppearance};
use rendering::meshing::{build_extractor, SurfaceExtractor};
use rendering::scene::Scene;
use rendering::volume_node::VolumeNode;
use task_management::TaskManager;
use voxels::element::Element;
use voxels::grid::VolumeGrid;
use voxels::loader::{self, Loader};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Counters for one frame step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes created and scheduled by streaming this frame.
    pub scheduled: usize,
    /// Nodes whose geometry reached the scene this frame.
    pub published: usize,
    /// Total pipeline failures since start.
    pub failures: usize,
}

/// The main state container for the voxel world.
pub struct EngineState {
    config: EngineConfig,
    grid: Arc<VolumeGrid>,
    extractor: Arc<dyn SurfaceExtractor>,
    nodes: HashMap<Point3<i32>, Arc<VolumeNode>>,
    scene: Scene,
    task_manager: TaskManager<VolumeNode>,
    /// Observer position at the last streaming pass.
    last_streamed_at: Option<Point3<f32>>,
}

impl EngineState {
    /// Creates an engine with explicit collaborators.
    ///
    /// # Arguments
    /// * `config` - Validated before anything is built
    /// * `loader` - Fills each chunk on first access
    /// * `appearance` - Materials, texture coordinates and translucency per type
    ///
    /// # Errors
    /// `Error::InvalidConfig` for a bad configuration, `Error::Io` if the worker pool
    /// cannot start.
    pub fn new(
        config: EngineConfig,
        loader: Arc<dyn Loader>,
        appearance: Arc<dyn Appearance>,
    ) -> Result<Self> {
        config.validate()?;
        let grid = Arc::new(VolumeGrid::new(
            config.volume_size,
            config.grid_size,
            loader,
        )?);
        let extractor = build_extractor(&config, appearance);
        let task_manager = TaskManager::new(config.worker_count())?;
        info!(
            "Engine ready: {:?} extractor, chunks of {}³, grid {:?}",
            config.extractor, config.volume_size, config.grid_size
        );
        Ok(EngineState {
            config,
            grid,
            extractor,
            nodes: HashMap::new(),
            scene: Scene::new(),
            task_manager,
            last_streamed_at: None,
        })
    }

    /// Creates an engine with the loader and appearance service named in `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let loader = loader::from_config(&config.loader)?;
        let appearance: Arc<dyn Appearance> = match config.appearance {
            AppearanceKind::Atlas => Arc::new(AtlasAppearance::new(config.atlas)?),
            AppearanceKind::Color => Arc::new(ColorAppearance),
        };
        Self::new(config, loader, appearance)
    }

    /// Runs one frame step for an observer at `observer`.
    ///
    /// # Errors
    /// `Error::NonFinitePosition` for a NaN or infinite observer, loader failures while
    /// creating chunks, or `Error::PipelineClosed`.
    pub fn update(&mut self, observer: Point3<f32>) -> Result<FrameStats> {
        let center = self.grid.chunk_index_of(observer.x, observer.y, observer.z)?;
        let mut stats = FrameStats::default();
        if self.needs_streaming(observer) {
            stats.scheduled = self.stream_around(center)?;
            self.last_streamed_at = Some(observer);
        }
        stats.published = self
            .task_manager
            .process_completed_tasks(&mut self.scene, Some(self.config.max_updates_per_frame));
        stats.failures = self.task_manager.failure_count();
        Ok(stats)
    }

    fn needs_streaming(&self, observer: Point3<f32>) -> bool {
        match self.last_streamed_at {
            None => true,
            Some(last) => last.distance(observer) > self.config.volume_size as f32 / 2.0,
        }
    }

    /// Creates and schedules nodes for every missing chunk in view.
    fn stream_around(&mut self, center: Point3<i32>) -> Result<usize> {
        let d = self.config.view_distance;
        let (min, max) = self.grid.index_range();
        let span = |axis: usize| {
            center[axis].saturating_sub(d).max(min[axis])..=center[axis].saturating_add(d).min(max[axis])
        };
        let mut missing = Vec::new();
        for x in span(0) {
            for y in span(1) {
                for z in span(2) {
                    let index = Point3::new(x, y, z);
                    if !self.nodes.contains_key(&index) {
                        missing.push(index);
                    }
                }
            }
        }
        missing.sort_by_key(|index| {
            let offset = *index - center;
            offset.x * offset.x + offset.y * offset.y + offset.z * offset.z
        });

        for &index in &missing {
            let volume = self.grid.resolve_by_index(index)?;
            let node = Arc::new(VolumeNode::new(
                index,
                volume,
                self.grid.clone(),
                self.extractor.clone(),
            ));
            self.task_manager.publish_task(node.clone())?;
            self.nodes.insert(index, node);
        }
        if !missing.is_empty() {
            info!(
                "Streamed {} chunks around {:?} ({} loaded)",
                missing.len(),
                center,
                self.nodes.len()
            );
        }
        Ok(missing.len())
    }

    /// Writes an element and reschedules every node whose geometry it can change.
    ///
    /// # Errors
    /// `Error::ChunkOutOfRange` outside the grid, `Error::PipelineClosed` if the
    /// pipeline is gone.
    pub fn set_element(&mut self, world: Point3<i32>, element: Element) -> Result<()> {
        self.grid.set_element(world, element)?;

        let size = self.grid.volume_size();
        let index = self.grid.chunk_index_of_cell(world);
        let local = Point3::new(
            world.x.rem_euclid(size),
            world.y.rem_euclid(size),
            world.z.rem_euclid(size),
        );
        let affected = std::iter::once(index).chain(
            neighbor_chunks_touching(local, size)
                .into_iter()
                .map(|offset| index + offset),
        );
        for index in affected {
            if let Some(node) = self.nodes.get(&index) {
                node.mark_dirty();
                self.task_manager.publish_task(node.clone())?;
                debug!("Rescheduled chunk {:?} after edit at {:?}", index, world);
            }
        }
        Ok(())
    }

    /// Empties a cell. Same invalidation as `set_element`.
    pub fn remove_element(&mut self, world: Point3<i32>) -> Result<()> {
        self.set_element(world, Element::EMPTY)
    }

    /// Reads the element at a world cell, creating its chunk if needed.
    pub fn element_at(&self, world: Point3<i32>) -> Result<Element> {
        self.grid.element_at(world)
    }

    /// The node for a chunk index, if it was streamed in.
    pub fn node(&self, index: Point3<i32>) -> Option<&Arc<VolumeNode>> {
        self.nodes.get(&index)
    }

    /// Number of nodes streamed in so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Geometry published so far.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The chunk grid.
    pub fn grid(&self) -> &Arc<VolumeGrid> {
        &self.grid
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Nodes scheduled and not yet published or dropped.
    pub fn pending(&self) -> usize {
        self.task_manager.in_flight()
    }

    /// Pipeline failures since start.
    pub fn failure_count(&self) -> usize {
        self.task_manager.failure_count()
    }
}

/// Offsets of the chunks sharing a face with the cell at `local`.
///
/// A cell on the low face of its chunk along an axis touches the chunk at `-1` on
/// that axis; a cell on the high face touches the chunk at `+1`. With `size == 1`
/// both apply.
pub fn neighbor_chunks_touching(local: Point3<i32>, size: i32) -> Vec<Vector3<i32>> {
    let mut offsets = Vec::new();
    for (axis, unit) in [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()]
        .into_iter()
        .enumerate()
    {
        if local[axis] == 0 {
            offsets.push(-unit);
        }
        if local[axis] == size - 1 {
            offsets.push(unit);
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::element::element_side::ElementSide;
    use std::collections::HashSet;

    #[test]
    fn touching_chunks_match_face_neighbours_exhaustively() {
        for size in 1..=5 {
            for x in 0..size {
                for y in 0..size {
                    for z in 0..size {
                        let local = Point3::new(x, y, z);
                        let expected: HashSet<Vector3<i32>> = ElementSide::all()
                            .into_iter()
                            .map(|side| local + side.offset())
                            .filter(|n| {
                                !(0..size).contains(&n.x)
                                    || !(0..size).contains(&n.y)
                                    || !(0..size).contains(&n.z)
                            })
                            .map(|n| {
                                Vector3::new(
                                    n.x.div_euclid(size),
                                    n.y.div_euclid(size),
                                    n.z.div_euclid(size),
                                )
                            })
                            .collect();
                        let offsets = neighbor_chunks_touching(local, size);
                        let actual: HashSet<_> = offsets.iter().copied().collect();
                        assert_eq!(actual, expected, "cell {local:?} in chunk of {size}");
                        assert_eq!(actual.len(), offsets.len());
                    }
                }
            }
        }
    }

    #[test]
    fn interior_cells_touch_no_other_chunk() {
        assert!(neighbor_chunks_touching(Point3::new(1, 2, 3), 8).is_empty());
        assert_eq!(
            neighbor_chunks_touching(Point3::new(0, 4, 7), 8),
            vec![-Vector3::unit_x(), Vector3::unit_z()]
        );
    }
}
