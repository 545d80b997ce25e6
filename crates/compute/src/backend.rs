use crate::{BufferView, ComputeError, Kernel};

pub trait ComputeBackend: Send + Sync + 'static {
    /// Dispatches a kernel with the given bindings and workgroup configuration.
    ///
    /// # Arguments
    /// * `kernel`: The kernel to dispatch.
    /// * `binds`: A slice of `BufferView`s for inputs, the output placeholder
    ///            and any config buffer, in the order given by [`crate::layout`].
    /// * `workgroups`: The number of workgroups to dispatch.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Vec<Vec<u8>>)` where each inner `Vec<u8>` holds the bytes of
    /// a buffer written by the kernel. The primary output is always first.
    ///
    /// # Errors
    ///
    /// Returns `ComputeError::ShapeMismatch` if any binding is invalid for the
    /// kernel. Other variants depend on the backend implementation.
    fn dispatch(
        &self,
        kernel: &Kernel,
        binds: &[BufferView],
        workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError>;
}

/// Workgroup count for a flat dispatch over `len` elements.
#[must_use]
pub fn workgroups_for(len: usize) -> [u32; 3] {
    let groups = u32::try_from(len.div_ceil(256)).unwrap_or(u32::MAX).max(1);
    [groups, 1, 1]
}
