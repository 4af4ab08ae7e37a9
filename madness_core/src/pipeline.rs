//! TournamentProjector - the Scorer -> Seeder -> Simulator -> Aggregator chain.

use crate::aggregate::ProbabilityAggregator;
use crate::config::ProjectionConfig;
use crate::error::BracketError;
use crate::scoring::CompositeScorer;
use crate::seeding::{FieldSeeder, SeedingSummary};
use crate::simulator::{BracketSimulator, SimulationDiagnostics};
use crate::team::TeamRecord;
use madness_env::{CancelToken, RandomContext};
use std::time::{Duration, Instant};
use tracing::info;

/// What one projection run produced besides the mutated records.
#[derive(Debug, Clone)]
pub struct ProjectionReport {
    pub seeding: SeedingSummary,
    pub simulations: u64,
    pub diagnostics: SimulationDiagnostics,
    pub seed: u64,
    pub elapsed: Duration,
}

/// Runs the four stages strictly in order over one field.
#[derive(Debug, Clone, Default)]
pub struct TournamentProjector {
    config: ProjectionConfig,
    cancel: CancelToken,
}

impl TournamentProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config, cancel: CancelToken::new() }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Scores, seeds, simulates and aggregates `teams` in place.
    ///
    /// On return `teams` is ordered by rank. If simulation fails, seeds and
    /// scores are already written but probabilities are left untouched.
    pub fn project<C: RandomContext>(
        &self,
        teams: &mut [TeamRecord],
        ctx: &C,
    ) -> Result<ProjectionReport, BracketError> {
        let started = Instant::now();
        self.config.simulation.validate()?;

        CompositeScorer::new(self.config.weights).apply(teams);
        let seeding = FieldSeeder::new(self.config.simulation.regions.clone()).seed(teams);
        info!(
            "Seeded field: {} in bracket, {} play-in, {} bubble",
            seeding.bracket, seeding.first_four, seeding.bubble
        );

        let outcome = BracketSimulator::new(self.config.simulation.clone())
            .with_cancel(self.cancel.clone())
            .simulate(teams, ctx)?;
        ProbabilityAggregator::aggregate(teams, &outcome.counts, outcome.simulations)?;

        let elapsed = started.elapsed();
        info!("Projection complete: {} simulations in {:?}", outcome.simulations, elapsed);

        Ok(ProjectionReport {
            seeding,
            simulations: outcome.simulations,
            diagnostics: outcome.diagnostics,
            seed: outcome.seed,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::seeding::RegionSet;
    use crate::team::{ProjectedSeed, Round};
    use crate::validation::FieldValidator;
    use crate::test_support::TestContext;
    use approx::assert_relative_eq;

    /// Unsorted field with varied records; id i has roughly i-th best record.
    fn raw_field(n: u32) -> Vec<TeamRecord> {
        let mut teams: Vec<TeamRecord> = (0..n)
            .map(|i| {
                TeamRecord::new(format!("t{}", i).as_str(), format!("Team {}", i))
                    .with_record(30 - (i % 25), 2 + (i % 25))
                    .with_ranks(i + 1, i + 3)
                    .with_sos(0.9 - i as f64 * 0.005)
                    .with_margin(20.0 - i as f64 * 0.4)
            })
            .collect();
        teams.reverse();
        teams
    }

    fn projector(simulations: u64) -> TournamentProjector {
        TournamentProjector::new(
            ProjectionConfig::default()
                .with_simulation(SimulationConfig::default().with_simulations(simulations)),
        )
    }

    #[test]
    fn test_full_projection_is_valid() {
        let mut teams = raw_field(80);
        let report = projector(2000).project(&mut teams, &TestContext(42)).unwrap();

        assert_eq!(report.seeding.bracket, 64);
        assert_eq!(report.simulations, 2000);
        assert!(report.diagnostics.is_clean());

        let validation = FieldValidator::new(RegionSet::default()).validate(&teams);
        assert!(validation.passes(), "{:?}", validation.violations);
    }

    #[test]
    fn test_bubble_team_has_zero_probabilities() {
        let mut teams = raw_field(80);
        projector(500).project(&mut teams, &TestContext(1)).unwrap();

        let bubble: Vec<&TeamRecord> =
            teams.iter().filter(|t| t.projected_seed == ProjectedSeed::Bubble).collect();
        assert_eq!(bubble.len(), 4);
        for team in bubble {
            assert!(team.probabilities.is_zero());
        }
    }

    #[test]
    fn test_r64_probabilities_sum_to_one_per_game() {
        // Round-of-64 winners: exactly one of each adjacent pair, so the
        // pair's r64 probabilities sum to 1
        let mut teams = raw_field(68);
        projector(1000).project(&mut teams, &TestContext(9)).unwrap();

        let r64_total: f64 = teams.iter().map(|t| t.probabilities.get(Round::R64)).sum();
        assert_relative_eq!(r64_total, 32.0, epsilon = 68.0 * 0.00005);
    }

    #[test]
    fn test_projection_is_reproducible_for_a_seed() {
        let mut a = raw_field(70);
        let mut b = raw_field(70);
        projector(300).project(&mut a, &TestContext(5)).unwrap();
        projector(300).project(&mut b, &TestContext(5)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_favourite_outranks_longshot() {
        let mut teams = raw_field(70);
        projector(3000).project(&mut teams, &TestContext(12)).unwrap();

        // teams[0] is the top overall seed, teams[63] the last 16-seed
        assert!(teams[0].probabilities.prob_champion > teams[63].probabilities.prob_champion);
        assert!(teams[0].seed_score > teams[63].seed_score);
    }

    #[test]
    fn test_invalid_simulation_count_surfaces_before_work() {
        let mut teams = raw_field(70);
        let result = projector(0).project(&mut teams, &TestContext(1));

        assert!(matches!(result, Err(BracketError::InvalidParameter(_))));
        assert_eq!(teams[0].seed_score, 0.0);
    }

    #[test]
    fn test_cancelled_projection_leaves_probabilities_untouched() {
        let mut teams = raw_field(70);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = projector(100).with_cancel(cancel).project(&mut teams, &TestContext(1));

        assert!(matches!(result, Err(BracketError::Cancelled { .. })));
        assert!(teams.iter().all(|t| t.probabilities.is_zero()));
        assert!(teams[0].projected_seed.is_bracket());
    }
}
