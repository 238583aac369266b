#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod echo;
pub mod error;
pub mod headers;
pub mod readiness;
pub mod scenarios;
pub mod security;
pub mod telemetry;

pub use config::{load_from_path, Config, HarnessConfig, ReadinessConfig};
pub use echo::{run, serve, EchoHeaders, EchoRecord};
pub use error::{ProbeError, Result};
pub use readiness::{ReadinessError, ReadinessGate, ReadyOnce};
pub use scenarios::{catalog, run_scenario, ProxyHeaderExpectation, ScenarioFailure, ScenarioOutcome};
