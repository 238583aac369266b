use serde::Deserialize;
use std::net::SocketAddr;

/// Echo backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address the echo backend listens on
    /// Default: 0.0.0.0:8000
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub timeout: TimeoutConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            logging: LoggingConfig::default(),
            timeout: TimeoutConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Config {
    /// Replace the port of `listen`, keeping the bind address
    pub fn with_port(mut self, port: u16) -> Self {
        self.listen.set_port(port);
        self
    }
}

/// Logging configuration
/// Controls application-level structured logging (stdout)
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    /// Default: "info"
    /// Can be overridden at runtime via RUST_LOG environment variable
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Show module path (target) in log messages
    /// Default: false
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), show_target: false }
    }
}

/// Timeout configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// How long to wait for in-flight connections after a shutdown signal
    /// Default: 30
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { shutdown_secs: default_shutdown_timeout() }
    }
}

/// Raw request head capture
#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// Maximum number of bytes of the request head kept verbatim.
    /// Requests with a larger head are echoed from the parsed header map,
    /// which loses the original name spelling.
    /// Default: 65536
    #[serde(default = "default_max_head_bytes")]
    pub max_head_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { max_head_bytes: default_max_head_bytes() }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_head_bytes() -> usize {
    64 * 1024
}
