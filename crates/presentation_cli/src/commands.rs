//! Command implementations

use domain::{Outcome, Parameters, ScenarioKind, ScenarioRequest};
use infrastructure::{SimulationConfig, build_simulation_service};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::cli::{ScenarioArgs, endpoint_url};

fn parse_scenario(args: &ScenarioArgs) -> anyhow::Result<(ScenarioKind, Parameters)> {
    let kind: ScenarioKind = args.kind.parse()?;
    let params = Parameters::from_query(args.params.iter().map(|(k, v)| (k.clone(), v)));
    Ok((kind, params))
}

/// Run a scenario in-process `repeat` times against one engine
pub async fn run_local(
    args: &ScenarioArgs,
    key: &str,
    seed: Option<u64>,
) -> anyhow::Result<Vec<Outcome>> {
    let (kind, mut params) = parse_scenario(args)?;
    // The process exits after the last run, so stress jobs are always awaited
    if kind == ScenarioKind::Stress && !params.contains("wait") {
        params = params.with("wait", true);
    }
    let config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    let service = build_simulation_service(&config)?;

    let mut outcomes = Vec::with_capacity(args.repeat as usize);
    for attempt in 1..=args.repeat {
        let outcome = service
            .run(ScenarioRequest::new(key, kind, params.clone()))
            .await?;
        debug!(attempt, status = outcome.simulated_status, "Local run");
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Post a scenario to a server `repeat` times
///
/// Every response body is returned, including error bodies.
pub async fn run_remote(
    client: &reqwest::Client,
    url: &str,
    args: &ScenarioArgs,
    key: Option<&str>,
) -> anyhow::Result<Vec<(u16, Value)>> {
    let (kind, params) = parse_scenario(args)?;
    let body = json!({
        "key": key,
        "kind": kind,
        "parameters": params,
    });

    let mut responses = Vec::with_capacity(args.repeat as usize);
    for _ in 0..args.repeat {
        let resp = client
            .post(endpoint_url(url, "/v1/simulate"))
            .json(&body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let value = resp.json::<Value>().await?;
        info!(status, "Remote run");
        responses.push((status, value));
    }
    Ok(responses)
}

/// Fetch the server health document
pub async fn status(client: &reqwest::Client, url: &str) -> anyhow::Result<Value> {
    let resp = client
        .get(endpoint_url(url, "/health"))
        .send()
        .await?
        .error_for_status()?;
    Ok(resp.json::<Value>().await?)
}
