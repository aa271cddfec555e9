//! siteq server binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use siteq::cli::Cli;
use siteq::probe::PingProber;
use siteq::state::ServerState;
use siteq::{server, worker};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().to_config();

    let state = Arc::new(ServerState::new());
    let prober = Arc::new(PingProber::new(config.samples));
    let workers = worker::spawn_pool(config.workers, Arc::clone(&state), prober);

    // Bind/listen failure is fatal: exit with a diagnostic before
    // accepting anything.
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind TCP port {}", config.port))?;

    tracing::info!(
        port = config.port,
        workers = workers.len(),
        samples = config.samples,
        "siteq listening, awaiting connections"
    );

    server::run(listener, state).await;
    Ok(())
}
