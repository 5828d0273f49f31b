//! Persistence error taxonomy.
//!
//! Every variant is non-fatal to the funnel: the caller logs it and keeps
//! showing the result. `is_retryable()` lets a caller decide whether a
//! resubmission is worth attempting.

use std::time::Duration;

use thiserror::Error;

/// Result type for results-store operations.
pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug, Error)]
pub enum PersistError {
    /// Could not reach the results store.
    #[error("Connection to results store failed: {0}")]
    Connection(String),

    /// The store answered but refused the write.
    #[error("Results store rejected the write ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The statement itself failed (constraint, type mismatch, ...).
    #[error("Query failed: {0}")]
    Query(String),

    /// The write did not complete within the configured timeout.
    #[error("Results store write timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence was requested outside a Tokio runtime.
    #[error("No async runtime available for persistence")]
    NoRuntime,

    /// The spawned write task panicked or was aborted.
    #[error("Persistence task failed: {0}")]
    TaskFailed(String),
}

impl PersistError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Transient failures a later resubmission may get past.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Query(_) | Self::Serialization(_) | Self::NoRuntime | Self::TaskFailed(_) => {
                false
            }
        }
    }
}
