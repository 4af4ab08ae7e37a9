//! Core randomness context trait for the projection pipeline.

use rand::RngCore;

/// The central interface for entropy.
///
/// This trait abstracts where random draws come from so that the bracket
/// simulator can run both in production and under a deterministic harness.
///
/// # Implementations
///
/// - **Production**: `EntropyContext` - streams seeded from OS entropy
/// - **Harness**: `SeededContext` (in `madness_sim`) - ChaCha8 streams derived
///   from one master seed
///
/// # Streams
///
/// Parallel workers never share generator state. Each unit of work asks for
/// its own stream by id; a deterministic implementation must return the same
/// sequence for the same `(seed, stream_id)` pair no matter which thread asks.
pub trait RandomContext: Send + Sync {
    /// Generator handed to a single worker.
    type Stream: RngCore + Send;

    /// Returns an independent random stream for `stream_id`.
    fn stream(&self, stream_id: u64) -> Self::Stream;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    fn seed(&self) -> u64;
}

impl<C: RandomContext + ?Sized> RandomContext for &C {
    type Stream = C::Stream;

    fn stream(&self, stream_id: u64) -> Self::Stream {
        (**self).stream(stream_id)
    }

    fn seed(&self) -> u64 {
        (**self).seed()
    }
}
