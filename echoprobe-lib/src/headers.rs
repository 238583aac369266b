//! Header names the harness sends and inspects.
//!
//! Lookups against an echoed record are case-insensitive, so the spelling here
//! only matters for what goes out on the wire.

/// Headers a reverse proxy sets to describe the original client request
pub mod forwarded {
    /// Client IP chain, comma separated, one entry appended per proxy hop
    pub const FOR: &str = "X-Forwarded-For";

    /// Scheme the client used to reach the first proxy ("http" or "https")
    pub const PROTO: &str = "X-Forwarded-Proto";

    /// Address of the immediate client as seen by the proxy
    pub const REAL_IP: &str = "X-Real-IP";
}

/// Hop-by-hop headers involved in a protocol upgrade
pub mod upgrade {
    pub const UPGRADE: &str = "Upgrade";
    pub const CONNECTION: &str = "Connection";
}

pub const HOST: &str = "Host";
