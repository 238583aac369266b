#![forbid(unsafe_code)]

use clap::Parser;
use echoprobe_lib::config::load_from_path;
use echoprobe_lib::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Echo backend: answers every request with what it received")]
struct Cli {
    /// TCP port to listen on, all interfaces [default: 8000]
    port: Option<u16>,

    /// Optional configuration TOML file
    #[arg(short, long, value_name = "FILE", env = "ECHOPROBE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match cli.config.as_deref().map(load_from_path).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };
    let cfg = match cli.port {
        Some(port) => cfg.with_port(port),
        None => cfg,
    };

    if let Err(err) = init_tracing(&cfg.logging) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    info!(listen = %cfg.listen, "configuration loaded");
    if let Err(err) = echoprobe_lib::run(Arc::new(cfg)).await {
        error!(%err, "echo backend exited with error");
        std::process::exit(1);
    }
}
