//! Header-forwarding scenarios checked against a reverse proxy that fronts the
//! echo backend.

mod expectation;
mod runner;

use std::fmt;

use reqwest::{Method, Url};

use crate::error::{ProbeError, Result};
use crate::headers::{forwarded, upgrade, HOST};

pub use expectation::{contains_ipv4, is_ipv4, Expectation, ScenarioFailure};
pub use runner::{build_client, run_scenario};

/// One echoed header and the shape its value must have
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderExpectation {
    pub header: String,
    pub expectation: Expectation,
}

impl HeaderExpectation {
    pub fn new(header: impl Into<String>, expectation: Expectation) -> Self {
        Self { header: header.into(), expectation }
    }
}

/// A request to send through the proxy and what the backend must have received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHeaderExpectation {
    /// Stable identifier, used in reports
    pub name: String,
    pub description: String,
    pub method: Method,
    /// Request target appended to the proxy base URL
    pub path: String,
    pub request_headers: Vec<(String, String)>,
    pub expected: Vec<HeaderExpectation>,
}

impl ProxyHeaderExpectation {
    pub fn get(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            method: Method::GET,
            path: "/".to_string(),
            request_headers: Vec::new(),
            expected: Vec::new(),
        }
    }

    pub fn send(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.push((name.into(), value.into()));
        self
    }

    pub fn expect(mut self, header: impl Into<String>, expectation: Expectation) -> Self {
        self.expected.push(HeaderExpectation::new(header, expectation));
        self
    }
}

/// Result of running one scenario; empty `failures` means it held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub failures: Vec<ScenarioFailure>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "PASS {}", self.name);
        }
        write!(f, "FAIL {}", self.name)?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

pub const PRESERVES_UPSTREAM_HTTP: &str = "preserves_http_from_upstream_proxy";
pub const PRESERVES_UPSTREAM_HTTPS: &str = "preserves_https_from_upstream_proxy";
pub const FALLS_BACK_TO_SCHEME: &str = "falls_back_to_scheme_without_upstream_header";
pub const FORWARDS_WEBSOCKET_UPGRADE: &str = "forwards_websocket_upgrade_headers";
pub const SETS_REAL_IP: &str = "sets_x_real_ip";
pub const SETS_FORWARDED_FOR: &str = "sets_x_forwarded_for";
pub const FORWARDS_HOST: &str = "forwards_host_header";

/// The built-in scenarios for a proxy reachable at `target_url`.
///
/// The scheme of `target_url` is the scheme of the client-to-proxy connection,
/// which is what the proxy has to fall back to when no upstream proxy declared one.
pub fn catalog(target_url: &str) -> Result<Vec<ProxyHeaderExpectation>> {
    let url = Url::parse(target_url)
        .map_err(|e| ProbeError::Config(format!("Invalid target URL {target_url}: {e}")))?;
    let scheme = url.scheme().to_string();

    Ok(vec![
        ProxyHeaderExpectation::get(
            PRESERVES_UPSTREAM_HTTP,
            "upstream proxy declares plaintext; value is preserved, not overwritten",
        )
        .send(forwarded::PROTO, "http")
        .expect(forwarded::PROTO, Expectation::equals("http")),
        ProxyHeaderExpectation::get(
            PRESERVES_UPSTREAM_HTTPS,
            "upstream proxy declares TLS; value is preserved, not overwritten",
        )
        .send(forwarded::PROTO, "https")
        .expect(forwarded::PROTO, Expectation::equals("https")),
        ProxyHeaderExpectation::get(
            FALLS_BACK_TO_SCHEME,
            "no upstream header; proxy falls back to the scheme the client used",
        )
        .expect(forwarded::PROTO, Expectation::equals(scheme)),
        ProxyHeaderExpectation::get(
            FORWARDS_WEBSOCKET_UPGRADE,
            "Upgrade and Connection are forwarded unmodified",
        )
        .send(upgrade::UPGRADE, "websocket")
        .send(upgrade::CONNECTION, "upgrade")
        .expect(upgrade::UPGRADE, Expectation::equals("websocket"))
        .expect(upgrade::CONNECTION, Expectation::equals("upgrade")),
        ProxyHeaderExpectation::get(SETS_REAL_IP, "X-Real-IP is a dotted-quad address")
            .expect(forwarded::REAL_IP, Expectation::Ipv4),
        ProxyHeaderExpectation::get(
            SETS_FORWARDED_FOR,
            "X-Forwarded-For carries at least one IPv4 address",
        )
        .expect(forwarded::FOR, Expectation::ContainsIpv4),
        ProxyHeaderExpectation::get(FORWARDS_HOST, "explicit Host is forwarded verbatim")
            .send(HOST, "example.com")
            .expect(HOST, Expectation::equals("example.com")),
    ])
}

/// Look up a single built-in scenario by name
pub fn find(target_url: &str, name: &str) -> Result<ProxyHeaderExpectation> {
    catalog(target_url)?
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ProbeError::Config(format!("Unknown scenario: {name}")))
}
