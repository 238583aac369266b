//! Building blocks for the API security smoke suite: attack payloads, response
//! header rules and `Set-Cookie` inspection. The checks only observe what the
//! deployed application returns; none of them asserts a specific lockout or
//! rate-limit threshold.

pub mod cookies;
pub mod headers;
pub mod payloads;

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

pub use cookies::{find_cookie, SetCookie};
pub use headers::{check_security_headers, HeaderViolation};

/// Status codes meaning "you need to authenticate first"
pub const AUTH_REQUIRED: &[u16] = &[401, 403];

/// Status codes that show brute-force protection kicked in (smoke check)
pub const LOCKED_OUT: &[u16] = &[401, 403, 429];

/// Client for the security suite: redirects are surfaced, not followed
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().no_proxy().redirect(Policy::none()).timeout(timeout).build()
}

/// `true` for 200 and 201, the codes a login must never return for bad input
pub fn is_login_success(status: u16) -> bool {
    matches!(status, 200 | 201)
}
