//! CLI for the siteq server binary.

use clap::Parser;

use crate::config::ServerConfig;
use crate::probe::DEFAULT_SAMPLES;
use crate::server::DEFAULT_PORT;
use crate::worker::DEFAULT_WORKERS;

/// siteq - batch website reachability check server
#[derive(Parser, Debug)]
#[command(name = "siteq", version, about = "Batch website reachability check server")]
pub struct Cli {
    /// TCP port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of probe workers (fixed for the process lifetime)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Latency samples taken per reachable site
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: u32,
}

impl Cli {
    /// Resolves the CLI flags into a [`ServerConfig`].
    #[must_use]
    pub const fn to_config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            workers: self.workers,
            samples: self.samples,
        }
    }
}
