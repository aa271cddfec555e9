//! siteq - batch website reachability check service.
//!
//! Clients connect over a line-oriented TCP protocol, submit groups of
//! website checks with `pingSites`, and poll per-submission status by the
//! handle assigned at submit time. A fixed worker pool drains the checks
//! from a shared FIFO queue and runs reachability/latency probes against
//! the network. All state is in-memory and lives for the process lifetime.

pub mod cli;
pub mod config;
pub mod models;
pub mod probe;
pub mod queue;
pub mod registry;
pub mod server;
pub mod state;
pub mod worker;

pub use config::ServerConfig;
pub use models::{ProbeStats, Submission, Task, TaskState, TaskStatus, MAX_URLS_PER_SUBMISSION};
pub use probe::{PingProber, ProbeError, ProbeReport, Prober};
pub use queue::WorkQueue;
pub use registry::Registry;
pub use state::ServerState;
pub use worker::spawn_pool;
