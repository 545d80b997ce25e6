// This module re-exports handlers for each kernel operation.

// Element-wise operations
pub mod relu_op;
pub use relu_op::handle_relu;

// Broadcasts
pub mod add_broadcast_op;
pub use add_broadcast_op::handle_add_broadcast;

// Linear algebra
pub mod matmul_op;
pub use matmul_op::{handle_matmul, MatMulConfig};
