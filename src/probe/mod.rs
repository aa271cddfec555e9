//! Probe execution: reachability and latency measurement.
//!
//! The worker pool talks to probes through the [`Prober`] trait; the
//! production implementation, [`PingProber`], shells out to `curl` for a
//! lightweight existence check and to `ping` for latency samples. Tests
//! substitute a scripted prober.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::models::{ProbeStats, TaskStatus};

/// Number of latency samples taken per reachable site.
pub const DEFAULT_SAMPLES: u32 = 10;

/// Outcome of probing one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReport {
    /// The site does not exist or is unreachable. No latency data.
    InvalidUrl,
    /// The site exists but replies are filtered or synthetic.
    Blocked,
    /// Reachable, with round-trip statistics.
    Complete(ProbeStats),
}

impl ProbeReport {
    /// The terminal task status this report maps to.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        match self {
            Self::InvalidUrl => TaskStatus::InvalidUrl,
            Self::Blocked => TaskStatus::Blocked,
            Self::Complete(_) => TaskStatus::Complete,
        }
    }

    /// The latency statistics this report carries, unset sentinels for
    /// non-`Complete` outcomes.
    #[must_use]
    pub const fn stats(&self) -> ProbeStats {
        match self {
            Self::Complete(stats) => *stats,
            Self::InvalidUrl | Self::Blocked => ProbeStats::unset(),
        }
    }
}

/// Probe tooling failure: the external command could not run at all.
///
/// This is distinct from an unreachable site. Workers recover from it
/// locally by recording `INVALID_URL` and logging for operators; it never
/// reaches the client as a protocol error and never kills a worker.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external probe command failed to spawn or complete.
    #[error("failed to run {command} for '{url}'")]
    CommandFailed {
        /// The command that failed (`curl` or `ping`).
        command: &'static str,
        /// The URL being probed.
        url: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Determines reachability and round-trip latency for a URL.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `url` and reports reachability plus latency statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] only for tooling failures; an unreachable
    /// site is a successful probe with an [`ProbeReport::InvalidUrl`]
    /// outcome.
    async fn probe(&self, url: &str) -> Result<ProbeReport, ProbeError>;
}

/// Production prober backed by `curl` and `ping`.
///
/// Policy:
/// 1. `curl -Is <url>` bounded by a timeout. No response headers means the
///    site does not exist: report `InvalidUrl` without sampling latency.
/// 2. `ping -q -c <samples> <host>` and parse the
///    `rtt min/avg/max/mdev = a/b/c/d ms` summary, rounded to integer
///    milliseconds.
/// 3. All three values exactly zero, or no summary at all from a reachable
///    host, means filtered replies: report `Blocked`.
#[derive(Debug, Clone)]
pub struct PingProber {
    samples: u32,
    reachability_timeout: Duration,
}

impl PingProber {
    /// Creates a prober taking `samples` latency samples per site.
    #[must_use]
    pub const fn new(samples: u32) -> Self {
        Self {
            samples,
            reachability_timeout: Duration::from_secs(10),
        }
    }

    /// Number of latency samples per reachable site.
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    async fn is_reachable(&self, url: &str) -> Result<bool, ProbeError> {
        let output = Command::new("curl")
            .arg("-Is")
            .arg("--max-time")
            .arg(self.reachability_timeout.as_secs().to_string())
            .arg(url)
            .output()
            .await
            .map_err(|source| ProbeError::CommandFailed {
                command: "curl",
                url: url.to_string(),
                source,
            })?;
        Ok(output.status.success() && !output.stdout.is_empty())
    }

    async fn measure(&self, url: &str) -> Result<ProbeReport, ProbeError> {
        let output = Command::new("ping")
            .arg("-q")
            .arg("-c")
            .arg(self.samples.to_string())
            .arg(ping_target(url))
            .output()
            .await
            .map_err(|source| ProbeError::CommandFailed {
                command: "ping",
                url: url.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_rtt_summary(&stdout) {
            Some(stats) if stats.is_all_zero() => Ok(ProbeReport::Blocked),
            Some(stats) => Ok(ProbeReport::Complete(stats)),
            // curl proved the site exists; ping replies are being dropped.
            None => Ok(ProbeReport::Blocked),
        }
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES)
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, url: &str) -> Result<ProbeReport, ProbeError> {
        if !self.is_reachable(url).await? {
            return Ok(ProbeReport::InvalidUrl);
        }
        self.measure(url).await
    }
}

/// Extracts the host portion of a URL for `ping`.
///
/// `ping` takes a bare host, so any scheme prefix and path suffix are
/// stripped: `https://example.com/a` becomes `example.com`.
fn ping_target(url: &str) -> &str {
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    host.split(['/', '?', '#']).next().unwrap_or(host)
}

/// Parses the `rtt min/avg/max/mdev = a/b/c/d ms` summary line.
///
/// Returns `None` when no summary is present, which `ping` omits when
/// every packet was lost.
fn parse_rtt_summary(output: &str) -> Option<ProbeStats> {
    let line = output.lines().find(|l| l.contains("min/avg/max"))?;
    let values = line.split('=').nth(1)?;
    let mut parts = values.trim().trim_end_matches("ms").trim().split('/');

    let min_ms = parse_ms(parts.next()?)?;
    let avg_ms = parse_ms(parts.next()?)?;
    let max_ms = parse_ms(parts.next()?)?;
    Some(ProbeStats {
        min_ms,
        avg_ms,
        max_ms,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn parse_ms(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    Some(value.round() as i64)
}
