//! Runtime configuration.
//!
//! There is no configuration file and no persisted state: everything is
//! in-memory and lost on restart, a documented limitation of the service.
//! The few tunables arrive on the command line.

use crate::probe::DEFAULT_SAMPLES;
use crate::server::DEFAULT_PORT;
use crate::worker::DEFAULT_WORKERS;

/// Server tunables, resolved from CLI flags with built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP listen port.
    pub port: u16,
    /// Worker pool size; fixed for the process lifetime.
    pub workers: usize,
    /// Latency samples per reachable site.
    pub samples: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            samples: DEFAULT_SAMPLES,
        }
    }
}
