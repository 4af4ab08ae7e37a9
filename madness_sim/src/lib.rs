//! Madness Deterministic Projection Harness
//!
//! This crate drives the projection core under full control of its inputs:
//! - **Fields**: synthetic teams generated from a seed by the `FieldOracle`
//! - **Randomness**: every simulation stream derived from one 64-bit seed
//! - **Scenarios**: fixed fields with known answers, checked after each run
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                      │
//! │  ┌─────────────┐   teams   ┌──────────────────────────┐  │
//! │  │ FieldOracle │──────────►│   TournamentProjector    │  │
//! │  │  (ground    │           │ score → seed → simulate  │  │
//! │  │   truth)    │           │        → aggregate       │  │
//! │  └─────────────┘           └────────────▲─────────────┘  │
//! │                                         │ streams        │
//! │                              ┌──────────┴──────────┐     │
//! │                              │    SeededContext    │     │
//! │                              └─────────────────────┘     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use madness_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::Chalk);
//! assert!(result.passed);
//! ```

mod context;
mod oracle;
mod runner;
pub mod input;
pub mod report;
pub mod scenarios;

pub use context::SeededContext;
pub use oracle::{FieldOracle, POWER_CONFERENCES};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use input::{load_config, load_teams, InputError};
pub use report::{ProjectionSummary, ScenarioSummary, TeamLine};
pub use scenarios::ScenarioId;
