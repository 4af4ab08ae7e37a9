//! Shared fixtures for unit tests.

use madness_env::RandomContext;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic context; stream `i` of seed `s` is fixed across runs.
pub(crate) struct TestContext(pub u64);

impl RandomContext for TestContext {
    type Stream = ChaCha8Rng;

    fn stream(&self, stream_id: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(stream_id))
    }

    fn seed(&self) -> u64 {
        self.0
    }
}
