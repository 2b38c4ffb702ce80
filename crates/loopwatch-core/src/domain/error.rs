//! Domain-level error taxonomy for Loopwatch.
//!
//! Scoring and auditing are total operations and never produce these;
//! errors only arise at the corpus/artifact IO boundary.

/// Loopwatch domain errors.
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Loopwatch domain operations.
pub type Result<T> = std::result::Result<T, WatchdogError>;
