use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::echo::EchoRecord;
use crate::scenarios::{ProxyHeaderExpectation, ScenarioFailure, ScenarioOutcome};

/// Client for scenario requests: bounded timeout, never routed through an
/// environment-configured proxy
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().no_proxy().timeout(timeout).build()
}

/// Send the scenario's request to `base_url` and check what the echo backend
/// received. Transport errors are not retried.
pub async fn run_scenario(
    client: &Client,
    base_url: &str,
    scenario: &ProxyHeaderExpectation,
) -> ScenarioOutcome {
    let failures = match fetch_record(client, base_url, scenario).await {
        Ok(record) => scenario
            .expected
            .iter()
            .filter_map(|exp| exp.expectation.check(&exp.header, record.headers.get(&exp.header)).err())
            .collect(),
        Err(failure) => vec![failure],
    };

    ScenarioOutcome { name: scenario.name.clone(), failures }
}

async fn fetch_record(
    client: &Client,
    base_url: &str,
    scenario: &ProxyHeaderExpectation,
) -> Result<EchoRecord, ScenarioFailure> {
    let url = join(base_url, &scenario.path);
    let mut request = client.request(scenario.method.clone(), &url);
    for (name, value) in &scenario.request_headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request
        .send()
        .await
        .map_err(|e| ScenarioFailure::Transport(e.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(ScenarioFailure::Status(response.status().as_u16()));
    }

    let record: EchoRecord = response
        .json()
        .await
        .map_err(|e| ScenarioFailure::InvalidBody(e.to_string()))?;
    debug!(scenario = %scenario.name, ?record, "echo record received");
    Ok(record)
}

fn join(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
