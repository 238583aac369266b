use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Why a scenario did not hold. Every variant names the violated contract and,
/// where there is one, the value actually observed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScenarioFailure {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("expected 200 OK, got {0}")]
    Status(u16),

    #[error("response is not an echo record: {0}")]
    InvalidBody(String),

    #[error("{header} header missing in backend request")]
    MissingHeader { header: String },

    #[error("expected {header}: {expected}, got {actual}")]
    Mismatch { header: String, expected: String, actual: String },

    #[error("{header} must be a valid IPv4 address, got: {actual}")]
    NotIpv4 { header: String, actual: String },

    #[error("{header} must contain a valid IPv4 address, got: {actual}")]
    NoIpv4 { header: String, actual: String },
}

/// What an echoed header value has to look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Exact, case-sensitive value
    Equals(String),
    /// The whole value is a dotted quad
    Ipv4,
    /// Somewhere in the value there is a dotted quad
    ContainsIpv4,
}

impl Expectation {
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals(value.into())
    }

    pub fn check(&self, header: &str, actual: Option<&str>) -> Result<(), ScenarioFailure> {
        let Some(actual) = actual else {
            return Err(ScenarioFailure::MissingHeader { header: header.to_string() });
        };

        match self {
            Self::Equals(expected) if expected == actual => Ok(()),
            Self::Equals(expected) => Err(ScenarioFailure::Mismatch {
                header: header.to_string(),
                expected: expected.clone(),
                actual: actual.to_string(),
            }),
            Self::Ipv4 if is_ipv4(actual) => Ok(()),
            Self::Ipv4 => Err(ScenarioFailure::NotIpv4 {
                header: header.to_string(),
                actual: actual.to_string(),
            }),
            Self::ContainsIpv4 if contains_ipv4(actual) => Ok(()),
            Self::ContainsIpv4 => Err(ScenarioFailure::NoIpv4 {
                header: header.to_string(),
                actual: actual.to_string(),
            }),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(v) => write!(f, "== {v:?}"),
            Self::Ipv4 => f.write_str("is an IPv4 address"),
            Self::ContainsIpv4 => f.write_str("contains an IPv4 address"),
        }
    }
}

fn ipv4_exact() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").ok()).as_ref()
}

fn ipv4_anywhere() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").ok()).as_ref()
}

/// Dotted-quad shape check; octet ranges are not validated
pub fn is_ipv4(value: &str) -> bool {
    ipv4_exact().is_some_and(|re| re.is_match(value))
}

pub fn contains_ipv4(value: &str) -> bool {
    ipv4_anywhere().is_some_and(|re| re.is_match(value))
}
