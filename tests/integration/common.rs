//! Common test utilities: scripted prober, in-process server, line client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use siteq::probe::{ProbeError, ProbeReport, Prober};
use siteq::state::ServerState;
use siteq::{server, worker, ProbeStats};

/// Prober that answers from a fixed url -> report table.
///
/// URLs not in the table report `InvalidUrl`. An optional per-probe delay
/// simulates network time so tests can observe intermediate states.
pub struct ScriptedProber {
    reports: HashMap<String, ProbeReport>,
    delay: Duration,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self {
            reports: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    /// Script `url` to report complete with fixed statistics.
    pub fn complete(mut self, url: &str) -> Self {
        self.reports.insert(
            url.to_string(),
            ProbeReport::Complete(ProbeStats {
                min_ms: 10,
                avg_ms: 20,
                max_ms: 30,
            }),
        );
        self
    }

    /// Script `url` to report blocked.
    pub fn blocked(mut self, url: &str) -> Self {
        self.reports.insert(url.to_string(), ProbeReport::Blocked);
        self
    }

    /// Sleep this long inside every probe.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, url: &str) -> Result<ProbeReport, ProbeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self
            .reports
            .get(url)
            .copied()
            .unwrap_or(ProbeReport::InvalidUrl))
    }
}

/// A running in-process server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

/// Starts a server with `workers` workers and the given prober on an
/// ephemeral port.
pub async fn start_server(workers: usize, prober: Arc<dyn Prober>) -> TestServer {
    let state = Arc::new(ServerState::new());
    let _pool = worker::spawn_pool(workers, Arc::clone(&state), prober);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(server::run(listener, Arc::clone(&state)));

    TestServer { addr, state }
}

/// Minimal line-protocol client.
///
/// Replies have no end marker; the client reads until the server pauses
/// writing, matching what the protocol demands of real clients.
pub struct Client {
    stream: TcpStream,
}

impl Client {
    /// Connects and consumes the welcome banner.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let mut client = Self { stream };
        let banner = client.read_block().await;
        assert!(
            banner.contains("You are connected"),
            "missing welcome banner, got: {banner:?}"
        );
        client
    }

    /// Sends one command line and reads the whole reply block.
    pub async fn send(&mut self, line: &str) -> String {
        self.stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("write command");
        self.read_block().await
    }

    async fn read_block(&mut self) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        // The reply may take a moment to start.
        let n = timeout(Duration::from_secs(5), self.stream.read(&mut chunk))
            .await
            .expect("reply should start within 5s")
            .expect("read reply");
        buf.extend_from_slice(&chunk[..n]);

        // Then read until the server pauses.
        loop {
            match timeout(Duration::from_millis(150), self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => buf.extend_from_slice(&chunk[..n]),
                Ok(Err(error)) => panic!("read failed: {error}"),
                Err(_) => break,
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Extracts the handle number from a `pingSites` reply.
pub fn parse_handle(reply: &str) -> u64 {
    let line = reply
        .lines()
        .find(|l| l.contains("Your handle for this request is:"))
        .unwrap_or_else(|| panic!("no handle in reply: {reply:?}"));
    line.rsplit(' ')
        .next()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or_else(|| panic!("unparseable handle line: {line:?}"))
}

/// Polls `showHandleStatus <handle>` until every row is terminal.
pub async fn wait_terminal(client: &mut Client, handle: u64) -> String {
    let deadline = Duration::from_secs(10);
    let reply = timeout(deadline, async {
        loop {
            let reply = client.send(&format!("showHandleStatus {handle}")).await;
            if !reply.contains("QUEUED") && !reply.contains("IN_PROGRESS") {
                return reply;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("all tasks should reach a terminal status in time");
    reply
}
