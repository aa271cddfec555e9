//! Data model for website checks.
//!
//! - `Task` - one URL's check, with latency results and a terminal status
//! - `TaskStatus` - closed lifecycle enum
//! - `ProbeStats` - min/avg/max round-trip times with a `-1` unset sentinel
//! - `Submission` - one client batch request owning its tasks

mod submission;
mod task;


pub use submission::{Submission, MAX_URLS_PER_SUBMISSION};
pub use task::{ProbeStats, Task, TaskState, TaskStatus, URL_MAX_BYTES};
