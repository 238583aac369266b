//! E2E test helpers and common utilities

use std::sync::OnceLock;

use echoprobe_lib::{HarnessConfig, ReadinessGate, ReadyOnce};
use reqwest::Client;
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Harness settings from the environment (NGINX_URL, READINESS_URL, API_URL, ...).
///
/// Panics on malformed values so a misconfigured run fails loudly.
pub fn harness() -> &'static HarnessConfig {
    static CONFIG: OnceLock<HarnessConfig> = OnceLock::new();
    CONFIG.get_or_init(|| match HarnessConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => panic!("invalid harness configuration: {e}"),
    })
}

/// Base URL of the reverse proxy under test
pub fn proxy_url() -> &'static str {
    &harness().target_url
}

/// Base URL of the application under test for the security suite
pub fn api_url() -> &'static str {
    &harness().api_url
}

/// Wait for the proxy once per run, before the first request goes out. Every
/// later caller sees the stored outcome without probing again. Exhaustion
/// aborts the whole run instead of failing tests one by one.
pub async fn ensure_proxy_ready() {
    static READY: ReadyOnce = ReadyOnce::new();

    let gate = ReadinessGate::from_config(&harness().readiness);
    if let Err(e) = READY.wait(&gate).await {
        eprintln!("proxy is not ready, start the stack first: {e}");
        std::process::exit(2);
    }
}

/// Plain client for proxy requests, bounded by the harness request timeout
pub fn proxy_client() -> Result<Client, Box<dyn std::error::Error + Send + Sync>> {
    Client::builder()
        .no_proxy()
        .timeout(harness().request_timeout)
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {e}").into())
}

/// GET `{proxy}/` with extra request headers and return what the echo backend
/// reports it received.
pub async fn echo_via_proxy(
    headers: &[(&str, &str)],
) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
    ensure_proxy_ready().await;

    let client = proxy_client()?;
    let mut request = client.get(format!("{}/", proxy_url().trim_end_matches('/')));
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {e}"))?;
    assert_eq!(response.status(), reqwest::StatusCode::OK, "proxy did not answer 200");

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON response: {e}"))?;
    Ok(body)
}

/// Value of an echoed header, matching the name case-insensitively
pub fn echoed_header<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get("headers")?
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_str())
}
