//! Bounded wait for a service to start answering before any check runs.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::ReadinessConfig;

/// Errors returned by [`ReadinessGate::wait`]
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("{url} did not become ready after {attempts} attempts. Last error: {last_error}")]
    Exhausted { url: String, attempts: u32, last_error: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Probes a URL until it answers `200`, with a hard upper bound on attempts
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    url: String,
    max_attempts: u32,
    delay: Duration,
    probe_timeout: Duration,
}

impl ReadinessGate {
    pub fn new(url: impl Into<String>, max_attempts: u32, delay: Duration) -> Self {
        Self { url: url.into(), max_attempts, delay, probe_timeout: Duration::from_secs(2) }
    }

    pub fn from_config(config: &ReadinessConfig) -> Self {
        Self::new(config.url.clone(), config.max_attempts, config.delay)
            .with_probe_timeout(config.probe_timeout)
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Probe until the first `200`, sleeping `delay` after every failed attempt
    /// except the last. Returns the number of the successful attempt.
    pub async fn wait(&self) -> Result<u32, ReadinessError> {
        let client = Client::builder().no_proxy().timeout(self.probe_timeout).build()?;
        let max_attempts = self.max_attempts.max(1);

        info!(url = %self.url, max_attempts, "waiting for service to become ready");

        let mut last_error = String::from("no attempt made");
        for attempt in 1..=max_attempts {
            match client.get(&self.url).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    info!(url = %self.url, "service is ready (attempt {attempt}/{max_attempts})");
                    return Ok(attempt);
                }
                Ok(resp) => last_error = format!("unexpected status {}", resp.status()),
                Err(e) => last_error = describe(&e),
            }

            if attempt < max_attempts {
                warn!(
                    url = %self.url,
                    "attempt {attempt}/{max_attempts}: {last_error}, retrying in {:?}",
                    self.delay
                );
                tokio::time::sleep(self.delay).await;
            }
        }

        warn!(url = %self.url, "service failed to become ready after {max_attempts} attempts");
        Err(ReadinessError::Exhausted { url: self.url.clone(), attempts: max_attempts, last_error })
    }
}

/// Runs a readiness gate at most once per process and hands the same outcome
/// to every caller. Concurrent callers wait for the single in-flight run.
///
/// Meant for a `static`, so that every test in a suite shares one gate.
#[derive(Debug)]
pub struct ReadyOnce {
    outcome: OnceCell<Result<u32, String>>,
}

impl ReadyOnce {
    pub const fn new() -> Self {
        Self { outcome: OnceCell::const_new() }
    }

    /// Wait for `gate` on the first call; later calls return the stored
    /// outcome without probing. The error is the exhaustion message.
    pub async fn wait(&self, gate: &ReadinessGate) -> Result<u32, String> {
        self.outcome
            .get_or_init(|| async { gate.wait().await.map_err(|e| e.to_string()) })
            .await
            .clone()
    }
}

impl Default for ReadyOnce {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection error"
    } else {
        "request error"
    };
    format!("{kind}: {e}")
}
