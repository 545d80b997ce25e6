#![allow(dead_code)]

use compute::{ComputeBackend, CpuBackend};
use std::sync::Arc;

pub fn cpu_backend() -> Arc<dyn ComputeBackend> {
    Arc::new(CpuBackend::default())
}

pub fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (*x - *y).abs() < 1e-5)
}
