use std::env;
use std::time::Duration;

use crate::error::{ProbeError, Result};

pub const NGINX_URL_ENV: &str = "NGINX_URL";
pub const READINESS_URL_ENV: &str = "READINESS_URL";
pub const API_URL_ENV: &str = "API_URL";
pub const READINESS_MAX_ATTEMPTS_ENV: &str = "READINESS_MAX_ATTEMPTS";
pub const READINESS_DELAY_MS_ENV: &str = "READINESS_DELAY_MS";
pub const PROBE_TIMEOUT_SECS_ENV: &str = "PROBE_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080";
pub const DEFAULT_READINESS_URL: &str = "http://nginx:80";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Settings for the readiness gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// URL probed until it answers 200
    pub url: String,
    /// Upper bound on probes before giving up
    pub max_attempts: u32,
    /// Fixed pause between failed probes
    pub delay: Duration,
    /// Timeout applied to each individual probe
    pub probe_timeout: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_READINESS_URL.to_string(),
            max_attempts: 30,
            delay: Duration::from_millis(1000),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

/// Where the harness sends traffic, taken from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Base URL of the reverse proxy under test
    pub target_url: String,
    /// Base URL of the web application under test (API security suite)
    pub api_url: String,
    pub readiness: ReadinessConfig,
    /// Timeout applied to each scenario request
    pub request_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            readiness: ReadinessConfig::default(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// Unset or blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_attempts = match get(READINESS_MAX_ATTEMPTS_ENV) {
            Some(v) => parse_number::<u32>(READINESS_MAX_ATTEMPTS_ENV, &v)?,
            None => defaults.readiness.max_attempts,
        };
        if max_attempts == 0 {
            return Err(ProbeError::Config(format!("{READINESS_MAX_ATTEMPTS_ENV} must be > 0")));
        }

        let delay = match get(READINESS_DELAY_MS_ENV) {
            Some(v) => Duration::from_millis(parse_number(READINESS_DELAY_MS_ENV, &v)?),
            None => defaults.readiness.delay,
        };
        let probe_timeout = positive_secs(get(PROBE_TIMEOUT_SECS_ENV), PROBE_TIMEOUT_SECS_ENV)?
            .unwrap_or(defaults.readiness.probe_timeout);
        let request_timeout =
            positive_secs(get(REQUEST_TIMEOUT_SECS_ENV), REQUEST_TIMEOUT_SECS_ENV)?
                .unwrap_or(defaults.request_timeout);

        Ok(Self {
            target_url: get(NGINX_URL_ENV).unwrap_or(defaults.target_url),
            api_url: get(API_URL_ENV).unwrap_or(defaults.api_url),
            readiness: ReadinessConfig {
                url: get(READINESS_URL_ENV).unwrap_or(defaults.readiness.url),
                max_attempts,
                delay,
                probe_timeout,
            },
            request_timeout,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ProbeError::Config(format!("Invalid value for {name}: {value}")))
}

fn positive_secs(value: Option<String>, name: &str) -> Result<Option<Duration>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let secs: u64 = parse_number(name, &value)?;
    if secs == 0 {
        return Err(ProbeError::Config(format!("{name} must be > 0")));
    }
    Ok(Some(Duration::from_secs(secs)))
}
