//! The action-value estimator.
//!
//! A [`QNetwork`] maps a state vector of `state_size` values to one estimated
//! return per discrete action:
//!
//! ```text
//! h      = ReLU(W1 · state + b1)     W1: [hidden, state_size]
//! output = W2 · h + b2               W2: [action_size, hidden]
//! ```
//!
//! Parameters are drawn from a seeded generator at construction, so two
//! networks built from the same config are identical. Evaluation never
//! changes them; an external trainer may overwrite values through
//! [`QNetwork::params_mut`].

use crate::config::QNetworkConfig;
use crate::error::{QNetError, Result};
use crate::nn::{Dense, Relu, Sequential};
use crate::tensor::Tensor;
use compute::ComputeBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

pub struct QNetwork {
    config: QNetworkConfig,
    net: Sequential,
    backend: Arc<dyn ComputeBackend>,
}

/// Parameter values of one affine stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseParams {
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Serializable copy of a network: its config plus every parameter value,
/// input stage first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub config: QNetworkConfig,
    pub layers: Vec<DenseParams>,
}

impl QNetwork {
    /// Builds a network with the default hidden width on the default backend.
    pub fn new(state_size: usize, action_size: usize, seed: u64) -> Result<Self> {
        Self::with_config(&QNetworkConfig::new(state_size, action_size, seed))
    }

    pub fn with_config(config: &QNetworkConfig) -> Result<Self> {
        Self::with_backend(config, compute::default_backend())
    }

    pub fn with_backend(config: &QNetworkConfig, backend: Arc<dyn ComputeBackend>) -> Result<Self> {
        config.validate()?;
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let mut net = Sequential::new();
        net.push(Dense::seeded(config.state_size, config.hidden_size, &mut rng)?);
        net.push(Relu);
        net.push(Dense::seeded(config.hidden_size, config.action_size, &mut rng)?);
        tracing::debug!(
            state_size = config.state_size,
            action_size = config.action_size,
            hidden_size = config.hidden_size,
            seed = config.seed,
            "constructed q-network"
        );
        Ok(Self { config: config.clone(), net, backend })
    }

    /// Evaluates one state `[state_size]` or a batch `[n, state_size]`,
    /// returning `[action_size]` or `[n, action_size]` respectively.
    pub fn forward(&self, state: &Tensor) -> Result<Tensor> {
        let batch = self.as_batch(state)?;
        let out = self.net.forward(&batch, self.backend.as_ref())?;
        Self::restore_rank(state, out)
    }

    /// Output of the hidden ReLU stage for `state`, shaped like `forward`'s
    /// output but `hidden_size` wide.
    pub fn hidden_activations(&self, state: &Tensor) -> Result<Tensor> {
        let batch = self.as_batch(state)?;
        let (_, mut activations) = self.net.forward_trace(&batch, self.backend.as_ref())?;
        // [input, dense, relu, dense]
        let hidden = activations.swap_remove(2);
        Self::restore_rank(state, hidden)
    }

    #[must_use]
    pub fn state_size(&self) -> usize {
        self.config.state_size
    }

    #[must_use]
    pub fn action_size(&self) -> usize {
        self.config.action_size
    }

    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    /// Seed this network was constructed with. It no longer describes the
    /// parameters once they have been overwritten through
    /// [`QNetwork::load_params`] or [`QNetwork::params_mut`].
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    #[must_use]
    pub fn config(&self) -> &QNetworkConfig {
        &self.config
    }

    /// `[W1, b1, W2, b2]`.
    pub fn params(&self) -> Vec<&Tensor> {
        self.net.params()
    }

    /// Mutable access for an external optimizer. Shapes stay fixed.
    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        self.net.params_mut()
    }

    #[must_use]
    pub fn snapshot(&self) -> ParamSnapshot {
        let layers = self
            .params()
            .chunks(2)
            .map(|pair| DenseParams {
                weight: pair[0].data().to_vec(),
                bias: pair[1].data().to_vec(),
            })
            .collect();
        ParamSnapshot { config: self.config.clone(), layers }
    }

    /// Rebuilds a network from a snapshot on the default backend.
    pub fn from_snapshot(snapshot: &ParamSnapshot) -> Result<Self> {
        let mut network = Self::with_config(&snapshot.config)?;
        network.load_params(snapshot)?;
        Ok(network)
    }

    /// Overwrites every parameter with the values in `snapshot`. The snapshot
    /// must describe the same architecture.
    ///
    /// Only parameter values are copied: the network keeps its own config,
    /// including `seed`, and a later [`QNetwork::save`] records that seed
    /// next to the loaded values.
    pub fn load_params(&mut self, snapshot: &ParamSnapshot) -> Result<()> {
        let cfg = &snapshot.config;
        if (cfg.state_size, cfg.hidden_size, cfg.action_size)
            != (self.state_size(), self.hidden_size(), self.action_size())
        {
            return Err(QNetError::InvalidConfig(format!(
                "snapshot architecture {}x{}x{} does not match network {}x{}x{}",
                cfg.state_size,
                cfg.hidden_size,
                cfg.action_size,
                self.state_size(),
                self.hidden_size(),
                self.action_size()
            )));
        }
        let values: Vec<&[f32]> = snapshot
            .layers
            .iter()
            .flat_map(|layer| [layer.weight.as_slice(), layer.bias.as_slice()])
            .collect();
        let mut params = self.params_mut();
        if values.len() != params.len() {
            return Err(QNetError::InvalidShape(format!(
                "snapshot holds {} layers, network has {}",
                snapshot.layers.len(),
                params.len() / 2
            )));
        }
        for (param, source) in params.iter().zip(&values) {
            if param.len() != source.len() {
                return Err(QNetError::InvalidShape(format!(
                    "parameter of shape {:?} cannot take {} values",
                    param.shape(),
                    source.len()
                )));
            }
        }
        for (param, source) in params.iter_mut().zip(values) {
            param.data_mut().copy_from_slice(source);
        }
        Ok(())
    }

    /// Writes a JSON [`ParamSnapshot`] to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.snapshot())?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "saved q-network parameters");
        Ok(())
    }

    /// Reads a network previously written by [`QNetwork::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: ParamSnapshot = serde_json::from_reader(reader)?;
        let network = Self::from_snapshot(&snapshot)?;
        tracing::info!(path = %path.display(), "loaded q-network parameters");
        Ok(network)
    }

    fn as_batch(&self, state: &Tensor) -> Result<Tensor> {
        match state.rank() {
            1 | 2 => {}
            rank => {
                return Err(QNetError::InvalidShape(format!(
                    "expected a state or a batch of states, got rank {rank} shape {:?}",
                    state.shape()
                )))
            }
        }
        if state.last_dim() != self.state_size() {
            return Err(QNetError::DimensionMismatch {
                expected: self.state_size(),
                found: state.last_dim(),
            });
        }
        if state.rank() == 1 {
            state.clone().reshape(vec![1, self.state_size()])
        } else {
            Ok(state.clone())
        }
    }

    fn restore_rank(state: &Tensor, out: Tensor) -> Result<Tensor> {
        if state.rank() == 1 {
            let width = out.last_dim();
            out.reshape(vec![width])
        } else {
            Ok(out)
        }
    }
}

impl fmt::Debug for QNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QNetwork")
            .field("config", &self.config)
            .field("layers", &self.net)
            .finish_non_exhaustive()
    }
}
