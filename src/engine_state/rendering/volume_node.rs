//! # Volume Node
//!
//! A `VolumeNode` turns one chunk into published geometry in two phases:
//!
//! 1. `calculate` runs the surface extractor (any thread) and parks the result.
//! 2. `update` publishes the parked result to the scene (consumer thread only).
//!
//! ## States
//!
//! ```text
//!  new ──► Dirty ──calculate──► Calculated ──update──► UpToDate
//!            ▲                      │                     │
//!            └──────mark_dirty──────┴─────────────────────┘
//! ```
//!
//! Calling a phase in the wrong state is a no-op returning `false`. Every
//! `mark_dirty` bumps a generation counter; a `calculate` that started before the
//! bump drops its result when it finishes instead of publishing stale geometry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use super::meshing::{MaterialMesh, SurfaceExtractor};
use super::scene::Scene;
use crate::core::MtResource;
use crate::engine_state::voxels::grid::VolumeGrid;
use crate::engine_state::voxels::volume::Volume;
use crate::error::Result;

/// Life cycle state of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    /// Geometry must be recomputed.
    Dirty,
    /// Geometry is computed but not yet published.
    Calculated,
    /// The published geometry matches the volume.
    UpToDate,
}

struct NodeState {
    status: NodeStatus,
    generation: u64,
    geometry: Vec<MaterialMesh>,
    published: Arc<[MaterialMesh]>,
}

/// Geometry producer for a single chunk.
pub struct VolumeNode {
    index: Point3<i32>,
    volume: MtResource<Volume>,
    grid: Arc<VolumeGrid>,
    extractor: Arc<dyn SurfaceExtractor>,
    state: Mutex<NodeState>,
}

impl VolumeNode {
    /// Creates a dirty node.
    ///
    /// # Arguments
    /// * `index` - Chunk index of `volume` in `grid`
    /// * `volume` - The chunk this node meshes
    /// * `grid` - Grid used for neighbour lookups across chunk edges
    /// * `extractor` - Surface extraction algorithm
    pub fn new(
        index: Point3<i32>,
        volume: MtResource<Volume>,
        grid: Arc<VolumeGrid>,
        extractor: Arc<dyn SurfaceExtractor>,
    ) -> Self {
        VolumeNode {
            index,
            volume,
            grid,
            extractor,
            state: Mutex::new(NodeState {
                status: NodeStatus::Dirty,
                generation: 0,
                geometry: Vec::new(),
                published: Arc::from(Vec::new()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Chunk index of this node.
    pub fn index(&self) -> Point3<i32> {
        self.index
    }

    /// The chunk this node meshes.
    pub fn volume(&self) -> &MtResource<Volume> {
        &self.volume
    }

    /// Current life cycle state.
    pub fn status(&self) -> NodeStatus {
        self.state().status
    }

    /// Geometry handed to the scene by the last successful `update`.
    pub fn published(&self) -> Arc<[MaterialMesh]> {
        self.state().published.clone()
    }

    /// Forces recomputation after the volume (or a neighbour) changed.
    pub fn mark_dirty(&self) {
        let mut state = self.state();
        state.status = NodeStatus::Dirty;
        state.generation += 1;
        state.geometry.clear();
    }

    /// Extracts geometry if the node is dirty.
    ///
    /// Holds the volume's read lock for the duration of the extraction. The node's
    /// own state lock is not held while extracting.
    ///
    /// # Returns
    /// `true` if new geometry is ready for `update`, `false` if the node was not
    /// dirty or was marked dirty again while extracting.
    ///
    /// # Errors
    /// Whatever the extractor reports; the node stays dirty.
    pub fn calculate(&self) -> Result<bool> {
        let generation = {
            let state = self.state();
            if state.status != NodeStatus::Dirty {
                return Ok(false);
            }
            state.generation
        };

        let start = Instant::now();
        let geometry = {
            let volume = self.volume.get();
            self.extractor.extract(&self.grid, &volume)?
        };

        let mut state = self.state();
        if state.generation != generation || state.status != NodeStatus::Dirty {
            debug!("Dropping stale geometry for chunk {:?}", self.index);
            return Ok(false);
        }
        debug!(
            "Calculated chunk {:?}: {} meshes in {:?}",
            self.index,
            geometry.len(),
            start.elapsed()
        );
        state.geometry = geometry;
        state.status = NodeStatus::Calculated;
        Ok(true)
    }

    /// Publishes calculated geometry to the scene.
    ///
    /// # Returns
    /// `true` if geometry was published, `false` if the node was not calculated.
    pub fn update(&self, scene: &mut Scene) -> bool {
        let mut state = self.state();
        if state.status != NodeStatus::Calculated {
            return false;
        }
        let published: Arc<[MaterialMesh]> = std::mem::take(&mut state.geometry).into();
        state.published = published.clone();
        state.status = NodeStatus::UpToDate;
        drop(state);

        scene.attach(self.index, published);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::appearance::AtlasAppearance;
    use crate::engine_state::rendering::meshing::cubic::CubicExtractor;
    use crate::engine_state::voxels::element::Element;
    use crate::engine_state::voxels::loader::EmptyLoader;
    use crate::error::Error;

    fn node() -> (Arc<VolumeGrid>, VolumeNode) {
        let grid = Arc::new(VolumeGrid::new(4, [3, 3, 3], Arc::new(EmptyLoader)).unwrap());
        grid.set_element(Point3::new(1, 1, 1), Element::new(1, 1.0))
            .unwrap();
        let index = Point3::new(0, 0, 0);
        let volume = grid.resolve_by_index(index).unwrap();
        let extractor = Arc::new(CubicExtractor::new(Arc::new(AtlasAppearance::default())));
        let node = VolumeNode::new(index, volume, grid.clone(), extractor);
        (grid, node)
    }

    #[test]
    fn calculate_is_idempotent() {
        let (_grid, node) = node();
        assert_eq!(node.status(), NodeStatus::Dirty);
        assert!(node.calculate().unwrap());
        assert!(!node.calculate().unwrap());
        assert_eq!(node.status(), NodeStatus::Calculated);
    }

    #[test]
    fn update_requires_calculate() {
        let (_grid, node) = node();
        let mut scene = Scene::new();
        assert!(!node.update(&mut scene));
        assert!(scene.is_empty());

        node.calculate().unwrap();
        assert!(node.update(&mut scene));
        assert!(!node.update(&mut scene));
        assert_eq!(node.status(), NodeStatus::UpToDate);
        assert_eq!(scene.triangle_count(), 12);
        assert_eq!(node.published().len(), 1);
    }

    #[test]
    fn edits_reach_the_scene_after_mark_dirty() {
        let (grid, node) = node();
        let mut scene = Scene::new();
        node.calculate().unwrap();
        node.update(&mut scene);

        grid.set_element(Point3::new(2, 1, 1), Element::new(1, 1.0))
            .unwrap();
        // Without invalidation the node keeps its geometry.
        assert!(!node.calculate().unwrap());

        node.mark_dirty();
        assert!(node.calculate().unwrap());
        assert!(node.update(&mut scene));
        assert_eq!(scene.triangle_count(), 20);
    }

    #[test]
    fn mark_dirty_discards_unpublished_geometry() {
        let (_grid, node) = node();
        let mut scene = Scene::new();
        node.calculate().unwrap();
        node.mark_dirty();
        assert!(!node.update(&mut scene));
        assert_eq!(node.status(), NodeStatus::Dirty);
    }

    #[test]
    fn failed_extraction_leaves_the_node_dirty() {
        let (grid, node) = node();
        grid.set_element(Point3::new(2, 2, 2), Element::new(99, 1.0))
            .unwrap();
        assert!(matches!(
            node.calculate(),
            Err(Error::UnregisteredElementType(99))
        ));
        assert_eq!(node.status(), NodeStatus::Dirty);
    }

    struct MarkingExtractor {
        node: std::sync::OnceLock<Arc<VolumeNode>>,
        inner: CubicExtractor,
    }

    impl SurfaceExtractor for MarkingExtractor {
        fn extract(&self, grid: &VolumeGrid, volume: &Volume) -> Result<Vec<MaterialMesh>> {
            // Simulates an edit landing while a worker is extracting.
            if let Some(node) = self.node.get() {
                node.mark_dirty();
            }
            self.inner.extract(grid, volume)
        }
    }

    #[test]
    fn stale_results_are_dropped() {
        let grid = Arc::new(VolumeGrid::new(4, [1, 1, 1], Arc::new(EmptyLoader)).unwrap());
        let index = Point3::new(0, 0, 0);
        let extractor = Arc::new(MarkingExtractor {
            node: std::sync::OnceLock::new(),
            inner: CubicExtractor::new(Arc::new(AtlasAppearance::default())),
        });
        let node = Arc::new(VolumeNode::new(
            index,
            grid.resolve_by_index(index).unwrap(),
            grid.clone(),
            extractor.clone(),
        ));
        let _ = extractor.node.set(node.clone());

        assert!(!node.calculate().unwrap());
        assert_eq!(node.status(), NodeStatus::Dirty);
    }
}
