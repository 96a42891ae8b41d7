use thiserror::Error;

use crate::batch::BYTES_PER_MB;

/// Local, pre-submission rejection. The pending batch is never modified when
/// one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Total size exceeds {limit_mb}MB.")]
    SizeExceeded { limit_mb: u64, total_bytes: u64 },
}

impl ValidationError {
    /// Attempted batch total in megabytes.
    pub fn total_mb(&self) -> f64 {
        match self {
            ValidationError::SizeExceeded { total_bytes, .. } => {
                *total_bytes as f64 / BYTES_PER_MB as f64
            }
        }
    }
}

/// Submission or status read failed at the network/HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub raw_body: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw_body: raw_body.into(),
        }
    }
}

/// Failure reported by the backend inside a snapshot with `status: error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PipelineError {
    pub message: String,
    pub detail: Option<String>,
}

impl PipelineError {
    pub fn new(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            message: message.into(),
            detail,
        }
    }
}
