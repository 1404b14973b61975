//! # Task Management System
//!
//! A fixed pool of worker threads runs `Task::process` off the consumer thread, and
//! the consumer applies finished work with `Task::handle_result`.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the worker pool and both queues
//! - `Task`: a unit of work with a worker half and a consumer half
//!
//! Two unbounded `crossbeam-channel` queues connect the sides. Every worker holds a
//! clone of the input receiver, so an idle worker picks up the next task as soon as
//! it is published; there is no per-worker assignment. A worker blocks while the
//! input queue is empty.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. A worker takes the task and calls `process()`
//! 3. Tasks reporting a result go onto the output queue; the rest are dropped
//! 4. The consumer drains the output queue in `process_completed_tasks()`, at most a
//!    bounded number per call, and calls `handle_result()` on each
//!
//! ## Failures
//!
//! A task whose `process()` returns an error or panics is logged and dropped. The
//! worker keeps running. Failures (including consumer-side `handle_result` errors)
//! are counted and exposed through `failure_count()`.
//!
//! ## Shutdown
//! Dropping the input sender wakes every blocked worker with a disconnect, after
//! which the workers are joined. `shutdown()` does this explicitly; `Drop` does it
//! implicitly.

pub mod task;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info, warn};

use crate::error::{Error, Result};
use task::Task;

/// Manages a pool of worker threads and the queues between them and the consumer.
pub struct TaskManager<T: Task> {
    task_sender: Option<Sender<Arc<T>>>,
    result_receiver: Receiver<Arc<T>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create, at least one is started
    ///
    /// # Errors
    /// `Error::Io` if a worker thread cannot be spawned.
    pub fn new(num_workers: usize) -> Result<Self> {
        let num_workers = num_workers.max(1);
        let (task_tx, task_rx) = unbounded::<Arc<T>>();
        let (result_tx, result_rx) = unbounded::<Arc<T>>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(num_workers);
        for worker_index in 0..num_workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let in_flight = in_flight.clone();
            let failures = failures.clone();

            let worker = thread::Builder::new()
                .name(format!("mesh-worker-{worker_index}"))
                .spawn(move || {
                    while let Ok(task) = task_rx.recv() {
                        match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
                            Ok(Ok(true)) => {
                                if result_tx.send(task).is_err() {
                                    in_flight.fetch_sub(1, Ordering::AcqRel);
                                    break;
                                }
                                continue;
                            }
                            Ok(Ok(false)) => {}
                            Ok(Err(err)) => {
                                error!("Worker {worker_index} dropped a task: {err}");
                                failures.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(_) => {
                                error!("Worker {worker_index} dropped a task that panicked");
                                failures.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        in_flight.fetch_sub(1, Ordering::AcqRel);
                    }
                    info!("Worker {worker_index} stopped");
                })?;
            workers.push(worker);
        }

        info!(
            "Started {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        Ok(TaskManager {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            workers,
            in_flight,
            failures,
        })
    }

    /// Publishes a task for background processing.
    ///
    /// Never blocks. The same task may be published again while it is in flight;
    /// the task itself decides whether a second `process()` has anything to do.
    ///
    /// # Errors
    /// `Error::PipelineClosed` after `shutdown()`.
    pub fn publish_task(&self, task: Arc<T>) -> Result<()> {
        let sender = self.task_sender.as_ref().ok_or(Error::PipelineClosed)?;
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if sender.send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(Error::PipelineClosed);
        }
        Ok(())
    }

    /// Applies finished tasks on the calling thread.
    ///
    /// Never blocks on an empty queue.
    ///
    /// # Arguments
    /// * `context` - Passed to every `handle_result()`
    /// * `max` - Upper bound on tasks handled by this call, `None` drains the queue
    ///
    /// # Returns
    /// The number of tasks whose `handle_result()` reported a change.
    pub fn process_completed_tasks(&self, context: &mut T::Context, max: Option<usize>) -> usize {
        let mut changed = 0;
        let limit = max.unwrap_or(usize::MAX);
        for task in self.result_receiver.try_iter().take(limit) {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            match task.handle_result(context) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!("Dropped a finished task: {err}");
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        changed
    }

    /// Tasks published but not yet dropped by a worker or handled by the consumer.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Tasks lost to errors or panics so far.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Number of worker threads still owned by this manager.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops accepting work and joins every worker.
    ///
    /// Workers finish the task they are running and whatever is still queued.
    /// Results that were never handled are discarded, so `in_flight()` reads zero
    /// afterwards.
    pub fn shutdown(&mut self) {
        if self.task_sender.take().is_none() {
            return;
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("A worker thread terminated abnormally");
            }
        }
        let discarded = self.result_receiver.try_iter().count();
        self.in_flight.fetch_sub(discarded, Ordering::AcqRel);
        info!("Task manager shut down, {discarded} unhandled results discarded");
    }
}

impl<T: Task> Drop for TaskManager<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
