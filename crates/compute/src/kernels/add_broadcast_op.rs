use crate::layout::{STORAGE_IN, STORAGE_IN2, STORAGE_OUT};
use crate::{BufferView, ComputeError};

/// Adds a vector to each row of a matrix.
///
/// Bindings `[a, b, output_placeholder]` expect `a` shaped `[batch, dim]` and
/// `b` shaped `[dim]`. The broadcasted sum is returned in a single buffer.
pub fn handle_add_broadcast(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 3 {
        return Err(ComputeError::ShapeMismatch(
            "AddBroadcast kernel expects 3 buffers (a, b, output_placeholder)",
        ));
    }
    let a_view = &binds[STORAGE_IN];
    let b_view = &binds[STORAGE_IN2];
    let output_view = &binds[STORAGE_OUT];

    let [batch, dim] = a_view.shape[..] else {
        return Err(ComputeError::ShapeMismatch(
            "AddBroadcast expects a rank-2 left operand",
        ));
    };
    if b_view.shape != [dim] {
        return Err(ComputeError::ShapeMismatch(
            "AddBroadcast row vector length must match the matrix width",
        ));
    }
    if output_view.shape != a_view.shape {
        return Err(ComputeError::ShapeMismatch(
            "AddBroadcast output placeholder must match the matrix shape",
        ));
    }

    let a_data = a_view.as_f32()?;
    let b_data = b_view.as_f32()?;
    output_view.as_f32()?;
    let mut out_data = vec![0.0f32; batch * dim];

    for b_idx in 0..batch {
        for i in 0..dim {
            out_data[b_idx * dim + i] = a_data[b_idx * dim + i] + b_data[i];
        }
    }

    let out_bytes = bytemuck::cast_slice(&out_data).to_vec();
    Ok(vec![out_bytes])
}

#[cfg(test)]
mod tests {
    use crate::{f32_values, BufferView, ComputeBackend, ComputeError, CpuBackend, Kernel};

    #[test]
    fn adds_bias_to_every_row() {
        let cpu = CpuBackend::new();
        let a = BufferView::from_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let b = BufferView::from_f32(&[0.5, -1.0, 10.0], vec![3]);
        let out = BufferView::zeroed_f32(vec![2, 3]);

        let result = cpu.dispatch(&Kernel::AddBroadcast, &[a, b, out], [1, 1, 1]).unwrap();
        assert_eq!(
            f32_values(&result[0]).as_ref(),
            &[1.5, 1.0, 13.0, 4.5, 4.0, 16.0]
        );
    }

    #[test]
    fn rejects_wrong_row_length() {
        let cpu = CpuBackend::new();
        let a = BufferView::from_f32(&[1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = BufferView::from_f32(&[1.0, 2.0, 3.0], vec![3]);
        let out = BufferView::zeroed_f32(vec![2, 2]);
        let result = cpu.dispatch(&Kernel::AddBroadcast, &[a, b, out], [1, 1, 1]);
        assert!(matches!(result, Err(ComputeError::ShapeMismatch(_))));
    }

    #[test]
    fn rejects_rank_one_matrix() {
        let cpu = CpuBackend::new();
        let a = BufferView::from_f32(&[1.0, 2.0], vec![2]);
        let b = BufferView::from_f32(&[1.0, 2.0], vec![2]);
        let out = BufferView::zeroed_f32(vec![2]);
        let result = cpu.dispatch(&Kernel::AddBroadcast, &[a, b, out], [1, 1, 1]);
        assert!(matches!(result, Err(ComputeError::ShapeMismatch(_))));
    }
}
