use compute::ComputeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QNetError {
    #[error("dimension mismatch: expected trailing dimension {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("invalid tensor shape: {0}")]
    InvalidShape(String),
    #[error("invalid network configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = QNetError> = std::result::Result<T, E>;
