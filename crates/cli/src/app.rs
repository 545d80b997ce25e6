//! Network setup and batch evaluation behind the `qnet` binary.

use anyhow::{bail, Context, Result};
use qnet::{QNetwork, QNetworkConfig, Tensor, DEFAULT_HIDDEN_SIZE};
use serde::Serialize;

use crate::Cli;

/// One `--state` value.
#[derive(Clone, Debug, PartialEq)]
pub struct StateArg(pub Vec<f32>);

/// Parses `"0.1, -2,3e-1"` into state values.
pub fn parse_state(raw: &str) -> Result<StateArg, String> {
    raw.split(',')
        .map(|value| {
            let value = value.trim();
            value
                .parse::<f32>()
                .map_err(|e| format!("invalid state value {value:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(StateArg)
}

#[derive(Debug, Serialize)]
pub struct Evaluation {
    pub q_values: Vec<Vec<f32>>,
    pub greedy_actions: Vec<usize>,
}

/// Builds or loads the network, optionally saves it, and evaluates every state.
pub fn run(cli: &Cli) -> Result<Evaluation> {
    let network = match &cli.load {
        Some(path) => QNetwork::load(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => QNetwork::with_config(&resolve_config(cli)?)?,
    };
    tracing::info!(
        state_size = network.state_size(),
        action_size = network.action_size(),
        hidden_size = network.hidden_size(),
        seed = network.seed(),
        "q-network ready"
    );

    if let Some(path) = &cli.save {
        network
            .save(path)
            .with_context(|| format!("failed to save parameters to {}", path.display()))?;
    }

    evaluate(&network, &cli.states)
}

/// Merges the optional config file with command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<QNetworkConfig> {
    let base = match &cli.config {
        Some(path) => Some(
            QNetworkConfig::from_path(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
        ),
        None => None,
    };
    let state_size = cli
        .state_size
        .or(base.as_ref().map(|c| c.state_size))
        .context("--state-size is required without --config or --load")?;
    let action_size = cli
        .action_size
        .or(base.as_ref().map(|c| c.action_size))
        .context("--action-size is required without --config or --load")?;
    let seed = cli.seed.or(base.as_ref().map(|c| c.seed)).unwrap_or(0);
    let hidden_size = cli
        .hidden_size
        .or(base.as_ref().map(|c| c.hidden_size))
        .unwrap_or(DEFAULT_HIDDEN_SIZE);

    let config = QNetworkConfig::new(state_size, action_size, seed).with_hidden_size(hidden_size);
    config.validate()?;
    Ok(config)
}

pub fn evaluate(network: &QNetwork, states: &[StateArg]) -> Result<Evaluation> {
    if states.is_empty() {
        return Ok(Evaluation { q_values: Vec::new(), greedy_actions: Vec::new() });
    }
    let rows: Vec<Tensor> = states.iter().map(|s| Tensor::vector(s.0.clone())).collect();
    let batch = Tensor::stack(&rows).context("--state values must all have the same length")?;
    let q = network.forward(&batch)?;

    let mut q_values = Vec::with_capacity(rows.len());
    let mut greedy_actions = Vec::with_capacity(rows.len());
    for i in 0..q.rows() {
        let Some(row) = q.row(i) else {
            bail!("missing output row {i}");
        };
        let Some(best) = Tensor::vector(row.to_vec()).argmax() else {
            bail!("network produced an empty output row");
        };
        q_values.push(row.to_vec());
        greedy_actions.push(best);
    }
    Ok(Evaluation { q_values, greedy_actions })
}
