use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{ProbeError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| ProbeError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| ProbeError::Config(format!("Failed to parse config: {e}")))?;

    validate(&cfg)?;

    Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.capture.max_head_bytes == 0 {
        return Err(ProbeError::Config("capture.max_head_bytes must be > 0".into()));
    }
    if cfg.logging.level.trim().is_empty() {
        return Err(ProbeError::Config("logging.level cannot be empty".into()));
    }
    Ok(())
}
