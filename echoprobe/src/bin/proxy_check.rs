#![forbid(unsafe_code)]

//! Runs the header-forwarding scenarios against a reverse proxy and exits with
//! 0 when every scenario holds, 1 when any fails and 2 when the proxy never
//! became ready or the run could not be set up.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use echoprobe_lib::config::{HarnessConfig, LoggingConfig};
use echoprobe_lib::scenarios::{build_client, catalog, run_scenario};
use echoprobe_lib::telemetry::init_tracing;
use echoprobe_lib::ReadinessGate;
use tracing::{error, info, warn};

const EXIT_FAILED: u8 = 1;
const EXIT_SETUP: u8 = 2;

/// Settings default to the NGINX_URL / READINESS_* / *_TIMEOUT_SECS environment
/// variables; flags override them.
#[derive(Parser, Debug)]
#[command(author, version, about = "Check reverse-proxy header forwarding against the echo backend")]
struct Cli {
    /// Base URL of the reverse proxy under test
    #[arg(long, value_name = "URL")]
    target_url: Option<String>,

    /// URL probed before any scenario runs
    #[arg(long, value_name = "URL")]
    readiness_url: Option<String>,

    /// Readiness probes before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Pause between readiness probes, in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Per-request timeout for scenario requests, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run every scenario this many times and require identical results
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    /// Only run the named scenarios (repeatable)
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,
}

impl Cli {
    fn apply(&self, cfg: &mut HarnessConfig) {
        if let Some(url) = &self.target_url {
            cfg.target_url = url.clone();
        }
        if let Some(url) = &self.readiness_url {
            cfg.readiness.url = url.clone();
        }
        if let Some(n) = self.max_attempts {
            cfg.readiness.max_attempts = n.max(1);
        }
        if let Some(ms) = self.retry_delay_ms {
            cfg.readiness.delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            cfg.request_timeout = Duration::from_secs(secs.max(1));
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&LoggingConfig::default()) {
        eprintln!("{err}");
        return ExitCode::from(EXIT_SETUP);
    }

    let mut cfg = match HarnessConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(%err, "invalid harness configuration");
            return ExitCode::from(EXIT_SETUP);
        }
    };
    cli.apply(&mut cfg);

    if let Err(err) = ReadinessGate::from_config(&cfg.readiness).wait().await {
        error!("{err}");
        return ExitCode::from(EXIT_SETUP);
    }

    let mut scenarios = match catalog(&cfg.target_url) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "cannot build scenarios");
            return ExitCode::from(EXIT_SETUP);
        }
    };
    if !cli.scenarios.is_empty() {
        let known = |name: &String| scenarios.iter().any(|s| &s.name == name);
        if let Some(unknown) = cli.scenarios.iter().find(|n| !known(n)) {
            error!(scenario = %unknown, "unknown scenario");
            return ExitCode::from(EXIT_SETUP);
        }
        scenarios.retain(|s| cli.scenarios.contains(&s.name));
    }

    let client = match build_client(cfg.request_timeout) {
        Ok(c) => c,
        Err(err) => {
            error!(%err, "failed to create HTTP client");
            return ExitCode::from(EXIT_SETUP);
        }
    };

    info!(
        target_url = %cfg.target_url,
        scenarios = scenarios.len(),
        repeat = cli.repeat,
        "running scenarios"
    );

    let mut failed = 0usize;
    for scenario in &scenarios {
        let first = run_scenario(&client, &cfg.target_url, scenario).await;
        let mut stable = true;
        for _ in 1..cli.repeat {
            let again = run_scenario(&client, &cfg.target_url, scenario).await;
            if again != first {
                warn!(scenario = %scenario.name, "results differ between repeats");
                println!("{again}");
                stable = false;
            }
        }

        println!("{first}");
        if !stable {
            println!("  - results differ between repeated runs");
        }
        if !first.passed() || !stable {
            failed = failed.saturating_add(1);
        }
    }

    println!("\n{} passed, {failed} failed", scenarios.len().saturating_sub(failed));

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
