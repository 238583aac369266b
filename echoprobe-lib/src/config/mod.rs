mod env;
mod loader;
mod types;

pub use env::{HarnessConfig, ReadinessConfig};
pub use loader::{load_from_path, validate};
pub use types::{CaptureConfig, Config, LoggingConfig, TimeoutConfig};
