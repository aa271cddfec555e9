//! TCP server: accept loop and the line-protocol surface.
//!
//! - `run` - accept loop spawning one session task per connection
//! - `session` - per-connection read/dispatch/reply loop
//! - `commands` - command parsing and reply rendering

pub mod commands;
pub mod session;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::state::ServerState;

/// Default TCP listen port.
pub const DEFAULT_PORT: u16 = 3333;

/// Accepts connections forever, spawning a session per client.
///
/// Sessions are unbounded; only OS resource limits cap them. Transient
/// accept errors are logged and the loop continues; they are not fatal
/// once the listener is bound.
pub async fn run(listener: TcpListener, state: Arc<ServerState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(session::run(stream, peer, Arc::clone(&state)));
            }
            Err(error) => {
                tracing::warn!(%error, "failed to accept connection");
            }
        }
    }
}
