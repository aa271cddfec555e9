//! Process-lifetime registry of all submissions.
//!
//! The registry is one of the two pieces of shared mutable state (the
//! other is the work queue). It owns every submission ever created, keyed
//! by handle, in creation order. Nothing is ever removed: completed work
//! stays queryable until the process exits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;

use crate::models::Submission;

/// The first handle ever issued.
pub const FIRST_HANDLE: u64 = 1;

/// Thread-safe store of all submissions, keyed by handle.
///
/// Handle allocation happens under the registry lock, so handles are
/// unique, strictly increasing from [`FIRST_HANDLE`], never reused and
/// never skipped, no matter how many sessions submit concurrently.
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    next_handle: u64,
    /// O(1) status lookup.
    by_handle: HashMap<u64, Arc<Submission>>,
    /// Creation-order enumeration for `showHandleStatus` without argument.
    order: Vec<u64>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_handle: FIRST_HANDLE,
                by_handle: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Creates and registers a submission for `urls`.
    ///
    /// Only the first 10 URLs are retained (silent drop, see
    /// [`crate::models::MAX_URLS_PER_SUBMISSION`]); each retained URL is
    /// copied verbatim with no validation, since validation happens at
    /// probe time. Returns synchronously without waiting for any probe.
    pub fn create_submission(&self, urls: &[String]) -> Arc<Submission> {
        let mut inner = self.lock();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        let submission = Arc::new(Submission::new(handle, urls));
        inner.by_handle.insert(handle, Arc::clone(&submission));
        inner.order.push(handle);
        drop(inner);
        counter!("siteq.submissions.created").increment(1);
        submission
    }

    /// Looks up a submission by handle.
    #[must_use]
    pub fn get(&self, handle: u64) -> Option<Arc<Submission>> {
        self.lock().by_handle.get(&handle).cloned()
    }

    /// All issued handles, in creation order.
    #[must_use]
    pub fn handles(&self) -> Vec<u64> {
        self.lock().order.clone()
    }

    /// Number of submissions ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    /// Returns true if no submission has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().expect("registry lock poisoned")
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
