//! Submission model: one client batch request and its tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::Task;

/// Maximum number of URLs retained per submission.
///
/// Excess URLs are silently dropped at creation. This is documented
/// client-visible behavior, not an error.
pub const MAX_URLS_PER_SUBMISSION: usize = 10;

/// A client's batch request: a handle plus its ordered tasks.
///
/// The task list is fixed at creation; tasks are never added afterwards
/// and never dropped while the submission exists. Submissions live for the
/// remainder of the process so later status queries always resolve.
#[derive(Debug)]
pub struct Submission {
    handle: u64,
    tasks: Vec<Arc<Task>>,
    /// Tasks that have not yet reached a terminal status.
    pending: AtomicUsize,
}

impl Submission {
    /// Builds a submission from an ordered URL list.
    ///
    /// Only the first [`MAX_URLS_PER_SUBMISSION`] URLs are retained;
    /// insertion order matches the request order. Handle allocation is the
    /// registry's job, so the handle arrives pre-assigned.
    #[must_use]
    pub fn new(handle: u64, urls: &[String]) -> Self {
        let tasks: Vec<Arc<Task>> = urls
            .iter()
            .take(MAX_URLS_PER_SUBMISSION)
            .map(|url| Arc::new(Task::new(handle, url)))
            .collect();
        let pending = AtomicUsize::new(tasks.len());
        Self {
            handle,
            tasks,
            pending,
        }
    }

    /// The submission's unique handle.
    #[must_use]
    pub const fn handle(&self) -> u64 {
        self.handle
    }

    /// The tasks, in original request order.
    #[must_use]
    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    /// Number of tasks that have not reached a terminal status.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns true once every task has a terminal status.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending() == 0
    }

    /// Records that one task reached a terminal status.
    ///
    /// The count only decreases and floors at zero; a stray extra call
    /// cannot wrap it around.
    pub fn task_finished(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}
