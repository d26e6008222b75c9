//! Probe command handler.

use std::time::Duration;

use svcshell_core::{HealthProbe, ProbeResult, ServiceEndpoint};

use crate::bootstrap::{CliConfig, build_probe};
use crate::error::CliError;

/// Execute the probe command: one health check, no launch.
pub async fn execute(config: &CliConfig) -> Result<(), CliError> {
    let probe = build_probe(config.strictness)?;
    check(
        &probe,
        &config.supervisor.endpoint,
        config.supervisor.policy.existing_probe_timeout,
        config.json,
    )
    .await
}

pub async fn check(
    probe: &dyn HealthProbe,
    endpoint: &ServiceEndpoint,
    timeout: Duration,
    json: bool,
) -> Result<(), CliError> {
    let url = endpoint.health_url();
    let result = probe.probe(endpoint, timeout).await;

    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "url": url, "result": result }))?);
    }

    match result {
        ProbeResult::Reachable => {
            if !json {
                println!("Service is up at {}", endpoint.base_url());
            }
            Ok(())
        }
        ProbeResult::Unreachable(failure) => Err(CliError::Unreachable {
            url,
            reason: failure.to_string(),
        }),
    }
}
