use crate::{kernels, BufferView, ComputeBackend, ComputeError, Kernel};

#[derive(Default, Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn dispatch(
        &self,
        kernel: &Kernel,
        binds: &[BufferView],
        _workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError> {
        if binds.len() < kernel.binding_count() {
            return Err(ComputeError::ShapeMismatch(
                "fewer bindings than the kernel layout requires",
            ));
        }
        for buffer_view in binds {
            let expected_bytes = buffer_view.element_count() * buffer_view.element_size_in_bytes;

            if buffer_view.data.len() != expected_bytes {
                return Err(ComputeError::ShapeMismatch(
                    "Buffer data length does not match product of shape dimensions and element size",
                ));
            }
        }
        tracing::trace!(?kernel, bindings = binds.len(), "cpu dispatch");
        match kernel {
            Kernel::Relu => kernels::handle_relu(binds),
            Kernel::AddBroadcast => kernels::handle_add_broadcast(binds),
            Kernel::MatMul => kernels::handle_matmul(binds),
        }
    }
}
