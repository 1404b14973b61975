//! # Task System Core Traits
//!
//! A task is a unit of work split across two threads:
//!
//! 1. A `Task` is scheduled via `TaskManager::publish_task()`
//! 2. Its `process()` method runs on a worker thread
//! 3. If `process()` reports a result, the task is handed back to the consumer
//! 4. Its `handle_result()` runs on the consumer thread with exclusive access to
//!    the task's context (for volume nodes, the scene)
//!
//! ## Thread Safety
//! - Tasks are shared as `Arc<T>` and must be `Send + Sync`
//! - Only `handle_result` may touch the context; workers never see it

use crate::engine_state::rendering::{scene::Scene, volume_node::VolumeNode};
use crate::error::Result;

/// A unit of background work with a consumer-side completion step.
pub trait Task: Send + Sync + 'static {
    /// State mutated only on the consumer side.
    type Context;

    /// Does the work on a worker thread.
    ///
    /// # Returns
    /// `true` if there is a result for `handle_result`, `false` if the task had
    /// nothing to do.
    fn process(&self) -> Result<bool>;

    /// Applies the result on the consumer thread.
    ///
    /// # Returns
    /// `true` if the context changed.
    fn handle_result(&self, context: &mut Self::Context) -> Result<bool>;
}

impl Task for VolumeNode {
    type Context = Scene;

    fn process(&self) -> Result<bool> {
        self.calculate()
    }

    fn handle_result(&self, scene: &mut Scene) -> Result<bool> {
        Ok(self.update(scene))
    }
}
