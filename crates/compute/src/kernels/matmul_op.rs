use crate::layout::{STORAGE_IN, STORAGE_IN2, STORAGE_OUT, UNIFORM_CFG};
use crate::{BufferView, ComputeError};

/// Dimensions uploaded as the config binding of [`crate::Kernel::MatMul`].
///
/// The product is `A[m×k] · B[k×n]`, or `A[m×k] · B[n×k]ᵀ` when `trans_b`
/// is non-zero.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatMulConfig {
    pub m: u32,
    pub k: u32,
    pub n: u32,
    pub trans_b: u32,
}

impl MatMulConfig {
    /// Uploads the config as a single-element binding.
    #[must_use]
    pub fn to_buffer_view(&self) -> BufferView {
        BufferView::new(
            bytemuck::bytes_of(self).to_vec().into(),
            vec![1],
            std::mem::size_of::<Self>(),
        )
    }
}

pub fn handle_matmul(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 4 {
        return Err(ComputeError::ShapeMismatch(
            "MatMul kernel expects 4 buffers (a, b, output_placeholder, config)",
        ));
    }
    let a_view = &binds[STORAGE_IN];
    let b_view = &binds[STORAGE_IN2];
    let out_view = &binds[STORAGE_OUT];
    let config_view = &binds[UNIFORM_CFG];

    if config_view.data.len() != std::mem::size_of::<MatMulConfig>() {
        return Err(ComputeError::ShapeMismatch(
            "MatMul config buffer has incorrect size",
        ));
    }
    let config: MatMulConfig = bytemuck::pod_read_unaligned(&config_view.data);
    let m = config.m as usize;
    let k = config.k as usize;
    let n = config.n as usize;
    let trans_b = config.trans_b != 0;

    let a_data = a_view.as_f32()?;
    let b_data = b_view.as_f32()?;

    if a_view.shape != [m, k] {
        return Err(ComputeError::ShapeMismatch(
            "Matrix A shape in BufferView does not match M,K from config",
        ));
    }
    let expected_b = if trans_b { [n, k] } else { [k, n] };
    if b_view.shape != expected_b {
        return Err(ComputeError::ShapeMismatch(
            "Matrix B shape in BufferView does not match K,N from config",
        ));
    }
    if out_view.shape != [m, n] {
        return Err(ComputeError::ShapeMismatch(
            "Output placeholder shape does not match M,N from config",
        ));
    }

    let mut output_data = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for l in 0..k {
                let b = if trans_b { b_data[j * k + l] } else { b_data[l * n + j] };
                sum += a_data[i * k + l] * b;
            }
            output_data[i * n + j] = sum;
        }
    }

    let out_bytes = bytemuck::cast_slice(&output_data).to_vec();
    Ok(vec![out_bytes])
}
