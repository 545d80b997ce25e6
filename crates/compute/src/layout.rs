use crate::Kernel;

pub const STORAGE_IN: usize = 0;
pub const STORAGE_IN2: usize = 1; // binary ops
pub const STORAGE_OUT: usize = 2;
pub const UNIFORM_CFG: usize = 3; // matmul dims
pub const UNARY_OUT: usize = 1; // unary ops have no second input

const _: () = assert!(STORAGE_OUT == 2);

/// Return expected number of bindings for each kernel.
#[must_use]
pub const fn binding_count(kernel: &Kernel) -> usize {
    match kernel {
        Kernel::MatMul => 4,
        Kernel::AddBroadcast => 3,
        Kernel::Relu => 2,
    }
}
