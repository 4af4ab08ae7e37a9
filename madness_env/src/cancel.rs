//! Cooperative cancellation for long simulation loops.

use crate::error::EnvError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation signal polled between simulation iterations.
///
/// Clones share the same flag, so a handle kept by the caller can stop
/// workers running on other threads. An optional deadline turns the token
/// into a timeout.
///
/// ```text
/// caller                        workers
///   |-- token.clone() ---------->|
///   |                            |-- check() per iteration
///   |-- cancel() ---------------->|-- Err(Cancelled)
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancelToken {
    /// Creates a token that never fires until `cancel()` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token that also fires once `timeout` has elapsed from now.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    /// Requests cancellation. Visible to every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true if cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// Returns `Err` describing why work should stop, if it should.
    pub fn check(&self) -> Result<(), EnvError> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(EnvError::Cancelled);
        }
        match self.deadline {
            Some((at, timeout)) if Instant::now() >= at => Err(EnvError::timeout(timeout)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_live() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.check(), Ok(()));
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let worker = token.clone();

        token.cancel();

        assert!(worker.is_cancelled());
        assert_eq!(worker.check(), Err(EnvError::Cancelled));
    }

    #[test]
    fn test_elapsed_deadline_reports_timeout() {
        let token = CancelToken::new().with_deadline(Duration::ZERO);
        assert_eq!(token.check(), Err(EnvError::Timeout(0)));
    }

    #[test]
    fn test_distant_deadline_is_live() {
        let token = CancelToken::new().with_deadline(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}
