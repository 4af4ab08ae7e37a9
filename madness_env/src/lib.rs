//! Tournament Projector Environment Abstraction Layer
//!
//! This crate isolates every source of non-determinism the projection core
//! touches, so the same simulator runs in **Production** (OS entropy) and in
//! the **Deterministic Harness** (seeded streams) without code changes.
//!
//! # Core Concept: Injected Entropy
//!
//! The bracket simulator never reaches for an ambient RNG:
//! - Randomness is requested per stream (`RandomContext::stream`)
//! - Cancellation and timeouts are polled between iterations (`CancelToken`)
//!
//! By deriving all entropy from a single 64-bit seed, any surprising
//! projection becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use madness_env::{RandomContext, CancelToken};
//! use rand::Rng;
//!
//! fn run_chunk<Ctx: RandomContext>(ctx: &Ctx, chunk: u64, cancel: &CancelToken) {
//!     let mut rng = ctx.stream(chunk);
//!     while !cancel.is_cancelled() {
//!         let u: f64 = rng.gen();
//!         // ...
//!     }
//! }
//! ```

mod context;
mod cancel;
mod types;
mod error;
mod entropy_impl;

pub use context::RandomContext;
pub use cancel::CancelToken;
pub use types::RunId;
pub use error::EnvError;
pub use entropy_impl::EntropyContext;
