//! Shared FIFO work queue with blocking dequeue.
//!
//! One queue serves every submission: tasks enter in submission-arrival
//! order, then intra-submission order, and workers drain them one at a
//! time. The empty-queue wait is a genuine suspension (semaphore permit
//! acquire), never a poll loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;
use tokio::sync::Semaphore;

use crate::models::Task;

/// Transient FIFO of tasks awaiting a worker.
///
/// The deque holds the tasks; the semaphore's permit count is the
/// pending-task counter. Permits are only added after tasks are appended
/// and only consumed before a task is popped, so a worker holding a permit
/// is guaranteed to find a task at the head. Draining the queue removes
/// tasks from here only; the registry keeps them for status queries.
#[derive(Debug)]
pub struct WorkQueue {
    inner: Mutex<VecDeque<Arc<Task>>>,
    ready: Semaphore,
}

impl WorkQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            ready: Semaphore::new(0),
        }
    }

    /// Appends a batch of tasks to the tail as one atomic unit.
    ///
    /// The whole batch goes in under a single lock acquisition, so tasks
    /// of one submission are always contiguous in FIFO order. Wake permits
    /// are released after the lock drops, one per task.
    pub fn enqueue_many(&self, tasks: &[Arc<Task>]) {
        if tasks.is_empty() {
            return;
        }
        let mut queue = self.lock();
        queue.extend(tasks.iter().cloned());
        drop(queue);
        self.ready.add_permits(tasks.len());
        counter!("siteq.tasks.enqueued").increment(tasks.len() as u64);
    }

    /// Removes and returns the head task, suspending while the queue is
    /// empty.
    ///
    /// The returned task is already marked `InProgress`: the flip happens
    /// before the queue lock is released, so no other worker can observe
    /// it as `Queued` and re-claim it. Popping is the claim point; a task
    /// is reachable from the queue or from one worker, never both.
    pub async fn dequeue_one(&self) -> Arc<Task> {
        // The semaphore is never closed, so acquire cannot fail.
        let permit = self
            .ready
            .acquire()
            .await
            .expect("work queue semaphore closed");
        permit.forget();

        let mut queue = self.lock();
        // A permit is only released after its task is appended.
        let task = queue.pop_front().expect("permit issued without a task");
        task.claim();
        drop(queue);

        counter!("siteq.tasks.claimed").increment(1);
        task
    }

    /// Number of tasks currently waiting (claimed tasks excluded).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no task is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Task>>> {
        self.inner.lock().expect("work queue lock poisoned")
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
