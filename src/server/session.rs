//! Per-connection session handler.
//!
//! One session per accepted connection, fully concurrent across
//! connections; sessions share only the [`ServerState`] aggregate. Each
//! session is a two-state loop: await a request line, dispatch it, write
//! the reply, repeat. A session ending never touches registry or task
//! state; in-flight work continues unattended.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::state::ServerState;

use super::commands;

/// Banner sent immediately after a client connects.
const WELCOME: &str = "\nYou are connected.\nType 'help' to see available commands.\n";

/// Runs one session to completion.
///
/// Ends when the client closes the connection or a read/write fails;
/// either way only this session's resources are released.
pub async fn run(stream: TcpStream, peer: SocketAddr, state: Arc<ServerState>) {
    tracing::info!(%peer, "client connected");
    match serve(stream, &state).await {
        Ok(()) => tracing::info!(%peer, "client disconnected"),
        Err(error) => tracing::debug!(%peer, %error, "session ended with error"),
    }
}

async fn serve(stream: TcpStream, state: &ServerState) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(WELCOME.as_bytes()).await?;

    while let Some(line) = lines.next_line().await? {
        let reply = commands::dispatch(&line, state);
        if !reply.is_empty() {
            writer.write_all(reply.as_bytes()).await?;
        }
    }
    Ok(())
}
