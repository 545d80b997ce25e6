#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::trivially_copy_pass_by_ref
)]

//! Kernel dispatch layer.
//!
//! Callers describe every operand as a [`BufferView`] and hand a [`Kernel`]
//! to a [`ComputeBackend`]. The backend validates the bindings, runs the
//! kernel and returns the written buffers as raw bytes.

use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

pub mod backend;
#[cfg(feature = "cpu")]
pub mod cpu_backend;
pub mod kernels;
pub mod layout;

pub use backend::{workgroups_for, ComputeBackend};
#[cfg(feature = "cpu")]
pub use cpu_backend::CpuBackend;
pub use kernels::MatMulConfig;

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("buffer shape mismatch: {0}")]
    ShapeMismatch(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    // Element-wise
    Relu,

    // Broadcasts
    AddBroadcast,

    // Linear algebra
    MatMul,
}

impl Kernel {
    #[must_use]
    pub const fn binding_count(&self) -> usize {
        layout::binding_count(self)
    }
}

#[derive(Clone, Debug)]
pub struct BufferView {
    pub data: Arc<[u8]>,
    pub shape: Vec<usize>, // Number of elements per dimension
    pub element_size_in_bytes: usize,
}

impl BufferView {
    #[must_use]
    pub fn new(data: Arc<[u8]>, shape: Vec<usize>, element_size_in_bytes: usize) -> Self {
        Self { data, shape, element_size_in_bytes }
    }

    /// Uploads host `f32` values with the given logical shape.
    #[must_use]
    pub fn from_f32(values: &[f32], shape: Vec<usize>) -> Self {
        let bytes: Arc<[u8]> = bytemuck::cast_slice(values).to_vec().into();
        Self::new(bytes, shape, std::mem::size_of::<f32>())
    }

    /// A zeroed `f32` buffer used as an output placeholder.
    #[must_use]
    pub fn zeroed_f32(shape: Vec<usize>) -> Self {
        let len: usize = shape.iter().product();
        let bytes: Arc<[u8]> = vec![0u8; len * std::mem::size_of::<f32>()].into();
        Self::new(bytes, shape, std::mem::size_of::<f32>())
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Interprets the buffer as `f32` values.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the element size is not that of an `f32`.
    pub fn as_f32(&self) -> Result<Cow<'_, [f32]>, ComputeError> {
        if self.element_size_in_bytes != std::mem::size_of::<f32>() {
            return Err(ComputeError::ShapeMismatch("expected f32 element data"));
        }
        Ok(f32_values(&self.data))
    }
}

/// Reads native-endian `f32` values out of a byte slice, borrowing when the
/// slice happens to be suitably aligned.
#[must_use]
pub fn f32_values(bytes: &[u8]) -> Cow<'_, [f32]> {
    match bytemuck::try_cast_slice::<u8, f32>(bytes) {
        Ok(values) => Cow::Borrowed(values),
        Err(_) => Cow::Owned(
            bytes
                .chunks_exact(std::mem::size_of::<f32>())
                .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ),
    }
}

/// Returns the compute backend for this build.
///
/// Only the host backend exists today; it is returned whenever the `cpu`
/// feature is enabled.
#[cfg(feature = "cpu")]
#[must_use]
pub fn default_backend() -> Arc<dyn ComputeBackend> {
    tracing::debug!("Using CpuBackend.");
    Arc::new(CpuBackend::new())
}

#[cfg(not(feature = "cpu"))]
compile_error!("No compute backend available. Enable the 'cpu' feature.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_binding_counts() {
        assert_eq!(Kernel::MatMul.binding_count(), 4);
        assert_eq!(Kernel::AddBroadcast.binding_count(), 3);
        assert_eq!(Kernel::Relu.binding_count(), 2);
    }

    #[test]
    fn f32_roundtrip_through_view() {
        let view = BufferView::from_f32(&[1.5, -2.0, 0.25], vec![3]);
        assert_eq!(view.element_count(), 3);
        assert_eq!(view.as_f32().unwrap().as_ref(), &[1.5, -2.0, 0.25]);
    }

    #[test]
    fn unaligned_bytes_still_decode() {
        let values = [3.0f32, 4.0];
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(bytemuck::cast_slice(&values));
        assert_eq!(f32_values(&bytes[1..]).as_ref(), &values);
    }

    #[test]
    fn non_f32_view_is_rejected() {
        let view = BufferView::new(vec![0u8; 8].into(), vec![4], 2);
        assert!(matches!(view.as_f32(), Err(ComputeError::ShapeMismatch(_))));
    }
}
