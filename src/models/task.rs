//! Task model: one URL's reachability check.

use std::sync::{Mutex, MutexGuard};

/// Maximum URL payload carried per task, in bytes.
///
/// Longer URLs are truncated on a character boundary at task creation.
/// This is a protocol-level cap, not a validation error.
pub const URL_MAX_BYTES: usize = 49;

/// Represents the status of a task.
///
/// Tasks progress through states: `Queued` -> `InProgress` -> one of the
/// terminal states `InvalidUrl`/`Blocked`/`Complete`. No other transition
/// is legal, and a terminal status is never overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task is waiting in the work queue.
    Queued,
    /// Task has been claimed by a worker and is being probed.
    InProgress,
    /// The site was unreachable, or the probe tooling failed.
    InvalidUrl,
    /// The site exists but its ping replies are filtered or synthetic.
    Blocked,
    /// Probe finished with latency statistics.
    Complete,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl TaskStatus {
    /// All status variants, in lifecycle order.
    pub const ALL: &'static [Self] = &[
        Self::Queued,
        Self::InProgress,
        Self::InvalidUrl,
        Self::Blocked,
        Self::Complete,
    ];

    /// Wire rendering used in status tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::InProgress => "IN_PROGRESS",
            Self::InvalidUrl => "INVALID_URL",
            Self::Blocked => "BLOCKED",
            Self::Complete => "COMPLETE",
        }
    }

    /// Returns true if this status ends the task's lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidUrl | Self::Blocked | Self::Complete)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round-trip latency statistics in whole milliseconds.
///
/// `-1` is the "no data yet" sentinel: tasks carry it until a probe
/// completes, and non-`Complete` terminal tasks carry it forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStats {
    /// Minimum observed round-trip time.
    pub min_ms: i64,
    /// Average observed round-trip time.
    pub avg_ms: i64,
    /// Maximum observed round-trip time.
    pub max_ms: i64,
}

impl ProbeStats {
    /// The unset sentinel value.
    pub const UNSET: i64 = -1;

    /// Stats with all three fields unset.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            min_ms: Self::UNSET,
            avg_ms: Self::UNSET,
            max_ms: Self::UNSET,
        }
    }

    /// Returns true if all three samples are exactly zero.
    ///
    /// Zeroed statistics from a reachable host indicate filtered or
    /// synthetic replies rather than a genuine sub-millisecond link.
    #[must_use]
    pub const fn is_all_zero(&self) -> bool {
        self.min_ms == 0 && self.avg_ms == 0 && self.max_ms == 0
    }
}

impl Default for ProbeStats {
    fn default() -> Self {
        Self::unset()
    }
}

/// Snapshot of a task's mutable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Latency statistics, unset until a probe completes.
    pub stats: ProbeStats,
}

/// One URL's reachability check.
///
/// The identity fields (owning handle, URL) are immutable. The mutable
/// fields live behind a per-task mutex: after the claim transition exactly
/// one worker writes them, while any number of status queries read them.
/// The per-task lock keeps reads coherent without touching the queue lock.
#[derive(Debug)]
pub struct Task {
    handle: u64,
    url: String,
    state: Mutex<TaskState>,
}

impl Task {
    /// Creates a queued task for `url` owned by submission `handle`.
    ///
    /// The URL is truncated to [`URL_MAX_BYTES`] on a character boundary.
    #[must_use]
    pub fn new(handle: u64, url: &str) -> Self {
        Self {
            handle,
            url: truncate_to_boundary(url, URL_MAX_BYTES),
            state: Mutex::new(TaskState {
                status: TaskStatus::Queued,
                stats: ProbeStats::unset(),
            }),
        }
    }

    /// The handle of the owning submission (back-reference, not ownership).
    #[must_use]
    pub const fn handle(&self) -> u64 {
        self.handle
    }

    /// The URL under test.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Snapshot of the task's current status and statistics.
    #[must_use]
    pub fn state(&self) -> TaskState {
        *self.lock_state()
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.lock_state().status
    }

    /// Marks the task claimed: `Queued` -> `InProgress`.
    ///
    /// Returns false if the task was not `Queued` (already claimed or
    /// finished), in which case nothing changes. The work queue calls this
    /// before releasing its lock, so the flip is the exclusivity point.
    pub fn claim(&self) -> bool {
        let mut state = self.lock_state();
        if state.status != TaskStatus::Queued {
            return false;
        }
        state.status = TaskStatus::InProgress;
        true
    }

    /// Records a terminal outcome: `InProgress` -> `status`.
    ///
    /// Returns false without changing anything if `status` is not terminal
    /// or the task already carries a terminal status.
    pub fn finish(&self, status: TaskStatus, stats: ProbeStats) -> bool {
        if !status.is_terminal() {
            return false;
        }
        let mut state = self.lock_state();
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        state.stats = stats;
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, TaskState> {
        // Writers hold tiny critical sections; a poisoned lock means a
        // worker panicked mid-write and the state cannot be trusted.
        self.state.lock().expect("task state lock poisoned")
    }
}

/// Truncates `s` to at most `max` bytes without splitting a character.
fn truncate_to_boundary(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
