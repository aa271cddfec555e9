//! The shared server aggregate.
//!
//! Registry and work queue are the only shared mutable state in the
//! process. Instead of globals they live in one explicitly-owned
//! aggregate, cloned by `Arc` into every session handler and worker.

use std::sync::Arc;

use crate::models::Submission;
use crate::queue::WorkQueue;
use crate::registry::Registry;

/// Shared state injected into sessions and workers.
#[derive(Debug, Default)]
pub struct ServerState {
    registry: Registry,
    queue: WorkQueue,
}

impl ServerState {
    /// Creates a fresh aggregate with an empty registry and queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            queue: WorkQueue::new(),
        }
    }

    /// The persistent submission registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The transient work queue.
    #[must_use]
    pub const fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Creates a submission and hands its tasks to the work queue.
    ///
    /// This is the `pingSites` entry point: allocate a handle, register
    /// the submission, enqueue its tasks as one batch, and return
    /// immediately. Completion happens asynchronously in the worker pool.
    pub fn submit(&self, urls: &[String]) -> Arc<Submission> {
        let submission = self.registry.create_submission(urls);
        self.queue.enqueue_many(submission.tasks());
        submission
    }
}
