//! Madness Core - Tournament Seeding and Monte Carlo Bracket Projection
//!
//! This library turns a field of fused team records into a projected
//! tournament:
//! 1. **Composite Scorer**: one reproducible ranking score per team
//! 2. **Field Seeder**: rank-driven partition into regions x seed lines,
//!    First Four, bubble and the rest
//! 3. **Bracket Simulator**: parallel Monte Carlo over the seeded bracket
//!    with injected, per-chunk random streams
//! 4. **Probability Aggregator**: per-round advancement probabilities for
//!    every team in the field

pub mod team;
pub mod scoring;
pub mod seeding;
pub mod game;
pub mod simulator;
pub mod aggregate;
pub mod config;
pub mod pipeline;
pub mod validation;
pub mod error;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use team::{ProjectedRegion, ProjectedSeed, Round, RoundProbabilities, TeamId, TeamRecord};
pub use scoring::{CompositeScorer, ScoreWeights};
pub use seeding::{FieldSeeder, RegionSet, SeedingSummary};
pub use game::{GameModel, Side};
pub use simulator::{AdvancementCounts, BracketSimulator, SimulationDiagnostics, SimulationOutcome};
pub use aggregate::ProbabilityAggregator;
pub use config::{ProjectionConfig, SimulationConfig};
pub use pipeline::{ProjectionReport, TournamentProjector};
pub use validation::{FieldValidator, ValidationReport, Violation};
pub use error::BracketError;
