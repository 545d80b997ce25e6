use crate::layout::{STORAGE_IN, UNARY_OUT};
use crate::{BufferView, ComputeError};

/// Rectified linear unit, `max(0, x)` per element. NaN passes through.
///
/// Bindings `[input, output_placeholder]`; both must share a shape.
pub fn handle_relu(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 2 {
        return Err(ComputeError::ShapeMismatch(
            "Relu kernel expects 2 buffers (input, output_placeholder)",
        ));
    }
    let input_view = &binds[STORAGE_IN];
    let output_view = &binds[UNARY_OUT];
    if input_view.shape != output_view.shape {
        return Err(ComputeError::ShapeMismatch(
            "Relu output placeholder must match the input shape",
        ));
    }
    let input_values = input_view.as_f32()?;
    let output_values: Vec<f32> = input_values.iter().map(|&x| relu(x)).collect();
    let out_bytes = bytemuck::cast_slice(&output_values).to_vec();
    Ok(vec![out_bytes])
}

fn relu(x: f32) -> f32 {
    if x > 0.0 || x.is_nan() {
        x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use crate::{BufferView, ComputeBackend, CpuBackend, Kernel};

    #[test]
    fn relu_clamps_negatives_to_zero() {
        let cpu = CpuBackend::new();
        let input_data = vec![0.0f32, 1.0, -1.0, 0.5, -0.5, 20.0, -20.0];
        let input = BufferView::from_f32(&input_data, vec![input_data.len()]);
        let output = BufferView::zeroed_f32(vec![input_data.len()]);

        let result_buffers = cpu
            .dispatch(&Kernel::Relu, &[input, output], [1, 1, 1])
            .expect("Dispatch for Relu failed");

        assert_eq!(result_buffers.len(), 1);
        let result = compute_values(&result_buffers[0]);
        assert_eq!(result, vec![0.0, 1.0, 0.0, 0.5, 0.0, 20.0, 0.0]);
    }

    #[test]
    fn relu_keeps_matrix_layout() {
        let cpu = CpuBackend::new();
        let input = BufferView::from_f32(&[-3.0, 2.0, 4.0, -1.0], vec![2, 2]);
        let output = BufferView::zeroed_f32(vec![2, 2]);
        let result_buffers = cpu.dispatch(&Kernel::Relu, &[input, output], [1, 1, 1]).unwrap();
        assert_eq!(compute_values(&result_buffers[0]), vec![0.0, 2.0, 4.0, 0.0]);
    }

    #[test]
    fn relu_propagates_nan() {
        let cpu = CpuBackend::new();
        let input = BufferView::from_f32(&[f32::NAN, -1.0, 2.0], vec![3]);
        let output = BufferView::zeroed_f32(vec![3]);
        let result_buffers = cpu.dispatch(&Kernel::Relu, &[input, output], [1, 1, 1]).unwrap();
        let result = compute_values(&result_buffers[0]);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[0.0, 2.0]);
    }

    #[test]
    fn relu_rejects_mismatched_placeholder() {
        let cpu = CpuBackend::new();
        let input = BufferView::from_f32(&[1.0, 2.0], vec![2]);
        let output = BufferView::zeroed_f32(vec![1, 2]);
        assert!(cpu.dispatch(&Kernel::Relu, &[input, output], [1, 1, 1]).is_err());
    }

    fn compute_values(bytes: &[u8]) -> Vec<f32> {
        crate::f32_values(bytes).into_owned()
    }
}
