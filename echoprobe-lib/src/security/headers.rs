use http::HeaderMap;
use thiserror::Error;

/// A security header that is present but malformed. Absent headers are not
/// violations: development deployments legitimately omit them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderViolation {
    #[error("Strict-Transport-Security must contain max-age=, got: {0}")]
    HstsWithoutMaxAge(String),

    #[error("X-Frame-Options must be DENY or SAMEORIGIN, got: {0}")]
    FrameOptions(String),

    #[error("X-Content-Type-Options must be nosniff, got: {0}")]
    ContentTypeOptions(String),

    #[error("Content-Security-Policy is present but empty")]
    EmptyCsp,

    #[error("{0} is not valid visible ASCII")]
    Unreadable(&'static str),
}

/// Check HSTS, X-Frame-Options, X-Content-Type-Options and CSP on a response
pub fn check_security_headers(headers: &HeaderMap) -> Vec<HeaderViolation> {
    let mut violations = Vec::new();

    if let Some(value) = read(headers, "strict-transport-security", &mut violations) {
        if !value.contains("max-age=") {
            violations.push(HeaderViolation::HstsWithoutMaxAge(value.to_string()));
        }
    }

    if let Some(value) = read(headers, "x-frame-options", &mut violations) {
        if value != "DENY" && value != "SAMEORIGIN" {
            violations.push(HeaderViolation::FrameOptions(value.to_string()));
        }
    }

    if let Some(value) = read(headers, "x-content-type-options", &mut violations) {
        if value != "nosniff" {
            violations.push(HeaderViolation::ContentTypeOptions(value.to_string()));
        }
    }

    if let Some(value) = read(headers, "content-security-policy", &mut violations) {
        if value.trim().is_empty() {
            violations.push(HeaderViolation::EmptyCsp);
        }
    }

    violations
}

fn read<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
    violations: &mut Vec<HeaderViolation>,
) -> Option<&'a str> {
    let value = headers.get(name)?;
    match value.to_str() {
        Ok(v) => Some(v),
        Err(_) => {
            violations.push(HeaderViolation::Unreadable(name));
            None
        }
    }
}
