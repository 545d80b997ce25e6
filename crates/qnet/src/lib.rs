//! Seeded feed-forward action-value estimator.
//!
//! [`QNetwork`] maps an environment state to one Q-value per discrete action
//! through a single ReLU hidden layer. Matrix work is dispatched as kernels to
//! a [`compute::ComputeBackend`]; the surrounding reinforcement-learning loop
//! treats the network as a pure function of its input and parameters.

pub mod config;
pub mod error;
pub mod nn;
pub mod qnetwork;
pub mod tensor;

pub use config::{QNetworkConfig, DEFAULT_HIDDEN_SIZE};
pub use error::{QNetError, Result};
pub use nn::{Dense, Layer, Relu, Sequential};
pub use qnetwork::{DenseParams, ParamSnapshot, QNetwork};
pub use tensor::Tensor;
