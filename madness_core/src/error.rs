//! Error types for the projection core.

use madness_env::EnvError;
use thiserror::Error;

/// Errors surfaced by the projection pipeline.
///
/// Only parameter-contract violations and caller-driven aborts appear here.
/// Missing metrics and degenerate brackets are handled locally and never
/// reach the caller as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BracketError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid region list: {0}")]
    InvalidRegions(String),

    #[error("Simulation cancelled after {completed} completed runs")]
    Cancelled { completed: u64 },

    #[error("Environment error: {0}")]
    Env(#[from] EnvError),
}

impl BracketError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
