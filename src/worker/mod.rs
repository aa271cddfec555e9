//! Worker pool: dequeue, probe, record.
//!
//! A fixed set of workers started once at process startup, each running
//! forever. There is no graceful drain: process termination is the only
//! stop condition.

use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::probe::Prober;
use crate::state::ServerState;

/// Default number of workers in the pool.
pub const DEFAULT_WORKERS: usize = 5;

/// Spawns `count` workers draining the state's work queue.
///
/// The returned join handles are only useful to keep alive; workers never
/// exit on their own.
pub fn spawn_pool(
    count: usize,
    state: Arc<ServerState>,
    prober: Arc<dyn Prober>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let state = Arc::clone(&state);
            let prober = Arc::clone(&prober);
            tokio::spawn(async move { run_worker(id, &state, prober.as_ref()).await })
        })
        .collect()
}

/// One worker's forever-loop: block on the queue, probe, record, repeat.
///
/// After `dequeue_one` the task is exclusively owned by this worker, so
/// recording results needs no queue lock; the per-task lock makes the
/// write visible to concurrent status queries. Probe tooling failures are
/// recorded as `INVALID_URL` and logged; they never end the loop.
async fn run_worker(id: usize, state: &ServerState, prober: &dyn Prober) {
    tracing::debug!(worker = id, "worker started");
    loop {
        let task = state.queue().dequeue_one().await;
        tracing::debug!(
            worker = id,
            handle = task.handle(),
            url = %task.url(),
            "claimed task"
        );

        let report = match prober.probe(task.url()).await {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(
                    worker = id,
                    handle = task.handle(),
                    url = %task.url(),
                    error = %error,
                    "probe tooling failure, recording INVALID_URL"
                );
                counter!("siteq.probes.tooling_failures").increment(1);
                crate::probe::ProbeReport::InvalidUrl
            }
        };

        task.finish(report.status(), report.stats());
        if let Some(submission) = state.registry().get(task.handle()) {
            submission.task_finished();
        }

        counter!("siteq.tasks.finished").increment(1);
        tracing::debug!(
            worker = id,
            handle = task.handle(),
            url = %task.url(),
            status = %report.status(),
            "task finished"
        );
    }
}
