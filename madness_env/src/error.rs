//! Error types for the environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The caller requested cancellation
    #[error("Operation cancelled")]
    Cancelled,

    /// Operation exceeded its deadline
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a timeout error from a duration.
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::Timeout(after.as_millis() as u64)
    }
}
