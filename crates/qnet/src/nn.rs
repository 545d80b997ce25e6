use crate::error::{QNetError, Result};
use crate::tensor::Tensor;
use compute::{workgroups_for, BufferView, ComputeBackend, ComputeError, Kernel, MatMulConfig};
use std::fmt;

/// A stage of a feed-forward network evaluated through a compute backend.
pub trait Layer: Send + Sync {
    /// Maps a `[batch, in]` tensor to a `[batch, out]` tensor.
    fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor>;
    fn name(&self) -> &'static str;
    fn params(&self) -> Vec<&Tensor> {
        Vec::new()
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }
}

/// A fully connected (affine) layer, `y = x · Wᵀ + b`.
#[derive(Clone, Debug)]
pub struct Dense {
    /// The weight matrix, shaped `[out_dim, in_dim]`.
    w: Tensor,
    /// The bias vector, shaped `[out_dim]`.
    b: Tensor,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// Creates a `Dense` layer from row-major weights and a bias.
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(QNetError::InvalidConfig(format!(
                "dense layer dimensions must be positive, got {in_dim} -> {out_dim}"
            )));
        }
        weight_count(in_dim, out_dim)?;
        if bias.len() != out_dim {
            return Err(QNetError::InvalidShape(format!(
                "bias has {} values, layer has {out_dim} outputs",
                bias.len()
            )));
        }
        Ok(Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights)?,
            b: Tensor::vector(bias),
            in_dim,
            out_dim,
        })
    }

    /// Draws weights and then bias from `U(-1/√in_dim, 1/√in_dim)`.
    pub fn seeded(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Result<Self> {
        if in_dim == 0 {
            return Err(QNetError::InvalidConfig("dense layer needs at least one input".into()));
        }
        let count = weight_count(in_dim, out_dim)?;
        #[allow(clippy::cast_precision_loss)]
        let bound = 1.0 / (in_dim as f32).sqrt();
        let mut sample = || (rng.f32() * 2.0 - 1.0) * bound;
        let weights = (0..count).map(|_| sample()).collect();
        let bias = (0..out_dim).map(|_| sample()).collect();
        Self::new(weights, bias, in_dim, out_dim)
    }

    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.w
    }

    #[must_use]
    pub fn bias(&self) -> &Tensor {
        &self.b
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Performs the forward pass: a transposed matmul followed by a bias broadcast.
    pub fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        if x.rank() != 2 {
            return Err(QNetError::InvalidShape(format!(
                "dense layer expects a [batch, {}] input, got {:?}",
                self.in_dim,
                x.shape()
            )));
        }
        if x.last_dim() != self.in_dim {
            return Err(QNetError::DimensionMismatch { expected: self.in_dim, found: x.last_dim() });
        }
        let batch = x.rows();
        let out_shape = vec![batch, self.out_dim];
        let config = MatMulConfig {
            m: dim_u32(batch)?,
            k: dim_u32(self.in_dim)?,
            n: dim_u32(self.out_dim)?,
            trans_b: 1,
        };
        let wx = dispatch(
            backend,
            Kernel::MatMul,
            &[
                x.to_buffer_view(),
                self.w.to_buffer_view(),
                BufferView::zeroed_f32(out_shape.clone()),
                config.to_buffer_view(),
            ],
            out_shape.clone(),
        )?;
        dispatch(
            backend,
            Kernel::AddBroadcast,
            &[
                wx.to_buffer_view(),
                self.b.to_buffer_view(),
                BufferView::zeroed_f32(out_shape.clone()),
            ],
            out_shape,
        )
    }
}

impl Layer for Dense {
    fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        Dense::forward(self, x, backend)
    }
    fn name(&self) -> &'static str {
        "dense"
    }
    fn params(&self) -> Vec<&Tensor> {
        vec![&self.w, &self.b]
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w, &mut self.b]
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Relu;

impl Layer for Relu {
    fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let shape = x.shape().to_vec();
        dispatch(
            backend,
            Kernel::Relu,
            &[x.to_buffer_view(), BufferView::zeroed_f32(shape.clone())],
            shape,
        )
    }
    fn name(&self) -> &'static str {
        "relu"
    }
}

/// Layers applied in insertion order.
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push<L: Layer + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let mut out = x.clone();
        for layer in &self.layers {
            out = layer.forward(&out, backend)?;
        }
        Ok(out)
    }

    /// Like [`Sequential::forward`], also returning every activation. Entry 0
    /// is the input and entry `i + 1` the output of layer `i`.
    pub fn forward_trace(
        &self,
        x: &Tensor,
        backend: &dyn ComputeBackend,
    ) -> Result<(Tensor, Vec<Tensor>)> {
        let mut out = x.clone();
        let mut activations = vec![out.clone()];
        for layer in &self.layers {
            out = layer.forward(&out, backend)?;
            activations.push(out.clone());
        }
        Ok((out, activations))
    }

    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|layer| layer.params()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut out = Vec::new();
        for layer in &mut self.layers {
            out.extend(layer.params_mut());
        }
        out
    }
}

impl fmt::Debug for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|layer| layer.name()))
            .finish()
    }
}

fn weight_count(in_dim: usize, out_dim: usize) -> Result<usize> {
    if u32::try_from(in_dim).is_err() || u32::try_from(out_dim).is_err() {
        return Err(QNetError::InvalidConfig(format!(
            "dense layer {in_dim} -> {out_dim} exceeds kernel limits"
        )));
    }
    in_dim.checked_mul(out_dim).ok_or_else(|| {
        QNetError::InvalidConfig(format!("dense layer {in_dim} -> {out_dim} has too many weights"))
    })
}

fn dim_u32(dim: usize) -> Result<u32> {
    u32::try_from(dim)
        .map_err(|_| QNetError::InvalidShape(format!("dimension {dim} exceeds kernel limits")))
}

fn dispatch(
    backend: &dyn ComputeBackend,
    kernel: Kernel,
    binds: &[BufferView],
    out_shape: Vec<usize>,
) -> Result<Tensor> {
    let len = out_shape.iter().product();
    let outputs = backend.dispatch(&kernel, binds, workgroups_for(len))?;
    let Some(bytes) = outputs.first() else {
        return Err(ComputeError::ShapeMismatch("kernel returned no output buffer").into());
    };
    Tensor::from_output(out_shape, bytes)
}
