//! Scenario runner - executes projection test scenarios.

use crate::context::SeededContext;
use crate::oracle::FieldOracle;
use crate::scenarios::ScenarioId;

use madness_core::{
    FieldValidator, ProjectedRegion, ProjectedSeed, ProjectionConfig, ProjectionReport,
    RegionSet, Round, SimulationConfig, TeamId, TeamRecord, TournamentProjector,
};
use madness_env::CancelToken;
use serde::Serialize;
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Teams in the generated field
    pub teams: usize,

    /// Simulations requested
    pub simulations: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Teams holding a seed line
    pub bracket_teams: usize,

    /// Play-in teams
    pub first_four: usize,

    /// Bubble teams
    pub bubble: usize,

    /// Byes summed over all simulations
    pub byes: u64,

    /// Simulations that ended without a champion
    pub empty_finals: u64,

    /// Highest champion probability in the field
    pub max_champion_prob: f64,

    /// Structural violations found by the validator
    pub violations: usize,
}

impl ScenarioMetrics {
    fn collect(teams: &[TeamRecord], report: &ProjectionReport, violations: usize) -> Self {
        Self {
            bracket_teams: report.seeding.bracket,
            first_four: report.seeding.first_four,
            bubble: report.seeding.bubble,
            byes: report.diagnostics.byes,
            empty_finals: report.diagnostics.empty_finals,
            max_champion_prob: teams
                .iter()
                .map(|t| t.probabilities.prob_champion)
                .fold(0.0, f64::max),
            violations,
        }
    }
}

/// Runs projection scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Simulations per projection
    simulations: u64,

    /// Shared cancellation/deadline token
    cancel: CancelToken,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            simulations: 2000,
            cancel: CancelToken::new(),
        }
    }

    /// Sets the number of simulations per projection.
    pub fn with_simulations(mut self, simulations: u64) -> Self {
        self.simulations = simulations;
        self
    }

    /// Attaches a cancellation token to every projection.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        match scenario {
            ScenarioId::FullField => self.run_full_field(),
            ScenarioId::ShortField => self.run_short_field(),
            ScenarioId::Chalk => self.run_chalk(),
            ScenarioId::CoinFlip => self.run_coin_flip(),
            ScenarioId::TwoRegion => self.run_two_region(),
            ScenarioId::TieBreak => self.run_tie_break(),
        }
    }

    /// Oracle seed, derived apart from the simulation streams.
    fn oracle(&self) -> FieldOracle {
        FieldOracle::new(self.seed.wrapping_mul(0x9e3779b97f4a7c15))
    }

    /// SCN-001: FullField - 80 synthetic teams.
    ///
    /// **Assertion**: 64 bracket teams, 4 play-in, 4 bubble, 8 excluded, no
    /// degenerate diagnostics, round-of-64 probabilities sum to 32.
    fn run_full_field(&self) -> ScenarioResult {
        let scenario = ScenarioId::FullField;
        let teams = self.oracle().generate(scenario.field_size());

        self.execute(scenario, teams, RegionSet::default(), |teams, report| {
            let seeding = &report.seeding;
            if (seeding.bracket, seeding.first_four, seeding.bubble, seeding.excluded) != (64, 4, 4, 8) {
                return Err(format!("unexpected tiers {:?}", seeding));
            }
            if !report.diagnostics.is_clean() {
                return Err(format!("degenerate diagnostics {:?}", report.diagnostics));
            }
            let r64: f64 = teams.iter().map(|t| t.probabilities.prob_r64).sum();
            if (r64 - 32.0).abs() > 64.0 * 0.00005 + 1e-9 {
                return Err(format!("round-of-64 probabilities sum to {:.4}", r64));
            }
            Ok(())
        })
    }

    /// SCN-002: ShortField - 40 teams over four regions.
    ///
    /// **Assertion**: every region is short, byes happen, no simulation ends
    /// without a champion, nobody sits in the play-in.
    fn run_short_field(&self) -> ScenarioResult {
        let scenario = ScenarioId::ShortField;
        let teams = self.oracle().generate(scenario.field_size());

        self.execute(scenario, teams, RegionSet::default(), |_, report| {
            if report.seeding.bracket != 40 || report.seeding.first_four != 0 {
                return Err(format!("unexpected tiers {:?}", report.seeding));
            }
            let diagnostics = &report.diagnostics;
            if diagnostics.byes == 0 {
                return Err("short regions produced no byes".to_string());
            }
            if diagnostics.short_regions.len() != 4 || diagnostics.empty_finals != 0 {
                return Err(format!("unexpected diagnostics {:?}", diagnostics));
            }
            Ok(())
        })
    }

    /// SCN-003: Chalk - quality strictly ordered, noise-free metrics.
    ///
    /// **Assertion**: overall rank equals quality order and 1-seeds win the
    /// title at least twice as often as the bottom half of the seed lines.
    fn run_chalk(&self) -> ScenarioResult {
        let scenario = ScenarioId::Chalk;
        let mut oracle = self.oracle();
        let teams = oracle.chalk(scenario.field_size());
        let expected = oracle.quality_order();

        self.execute(scenario, teams, RegionSet::default(), |teams, _| {
            if teams.iter().map(|t| &t.id).ne(expected.iter()) {
                return Err("overall rank does not follow quality".to_string());
            }

            let top = mean_champion(teams, |line| line == 1);
            let bottom = mean_champion(teams, |line| line >= 9);
            if top <= 2.0 * bottom {
                return Err(format!("1-seed title odds {:.4} vs bottom half {:.4}", top, bottom));
            }
            Ok(())
        })
    }

    /// SCN-004: CoinFlip - every team has the same power rating.
    ///
    /// **Assertion**: each bracket team wins its opener about half the time
    /// and the title about 1/64 of the time.
    fn run_coin_flip(&self) -> ScenarioResult {
        let scenario = ScenarioId::CoinFlip;
        let teams = self.oracle().identical(scenario.field_size());

        self.execute(scenario, teams, RegionSet::default(), |teams, _| {
            for team in teams.iter().filter(|t| t.projected_seed.is_bracket()) {
                let probs = &team.probabilities;
                if (probs.prob_r64 - 0.5).abs() > 0.06 {
                    return Err(format!("team {} r64 {:.4} far from 0.5", team.id, probs.prob_r64));
                }
                if (probs.prob_champion - 1.0 / 64.0).abs() > 0.02 {
                    return Err(format!("team {} title odds {:.4} far from 1/64", team.id, probs.prob_champion));
                }
            }
            Ok(())
        })
    }

    /// SCN-005: TwoRegion - two regions of 16.
    ///
    /// **Assertion**: the single Final Four game decides the title, so every
    /// team's f4, championship and champion probabilities coincide.
    fn run_two_region(&self) -> ScenarioResult {
        let scenario = ScenarioId::TwoRegion;
        let teams = self.oracle().generate(scenario.field_size());
        let regions = match RegionSet::new(["East", "West"]) {
            Ok(regions) => regions,
            Err(e) => return self.failed(scenario, 0, e.to_string()),
        };

        self.execute(scenario, teams, regions, |teams, report| {
            if report.seeding.bracket != 32 {
                return Err(format!("unexpected tiers {:?}", report.seeding));
            }
            for team in teams {
                let probs = &team.probabilities;
                if probs.prob_f4 != probs.prob_championship || probs.prob_f4 != probs.prob_champion {
                    return Err(format!(
                        "team {} f4 {:.4} championship {:.4} champion {:.4}",
                        team.id, probs.prob_f4, probs.prob_championship, probs.prob_champion
                    ));
                }
            }
            Ok(())
        })
    }

    /// SCN-006: TieBreak - identical metrics, no power ratings.
    ///
    /// **Assertion**: overall rank follows input order, so team 1 is the top
    /// seed of the first region and teams 65-68 are the play-in.
    fn run_tie_break(&self) -> ScenarioResult {
        let scenario = ScenarioId::TieBreak;
        let teams = self.oracle().without_power_ratings().identical(scenario.field_size());

        self.execute(scenario, teams, RegionSet::default(), |teams, _| {
            for (i, team) in teams.iter().enumerate() {
                let expected = TeamId::from(i as u64 + 1);
                if team.id != expected {
                    return Err(format!("rank {} held by {} instead of {}", i + 1, team.id, expected));
                }
            }
            let first_region = ProjectedRegion::Region("East".to_string());
            if teams[0].projected_seed != ProjectedSeed::Seed(1) || teams[0].projected_region != first_region {
                return Err(format!(
                    "top team projected {} {}",
                    teams[0].projected_seed, teams[0].projected_region
                ));
            }
            if !teams[64..].iter().all(|t| t.projected_seed == ProjectedSeed::FirstFour) {
                return Err("ranks 65-68 are not all in the play-in".to_string());
            }
            Ok(())
        })
    }

    /// Projects `teams`, validates the structure, then applies `check`.
    fn execute<F>(
        &self,
        scenario: ScenarioId,
        mut teams: Vec<TeamRecord>,
        regions: RegionSet,
        check: F,
    ) -> ScenarioResult
    where
        F: Fn(&[TeamRecord], &ProjectionReport) -> Result<(), String>,
    {
        let config = ProjectionConfig::default().with_simulation(
            SimulationConfig::default()
                .with_simulations(self.simulations)
                .with_regions(regions.clone()),
        );
        let ctx = SeededContext::new(self.seed);
        let projector = TournamentProjector::new(config).with_cancel(self.cancel.clone());

        let report = match projector.project(&mut teams, &ctx) {
            Ok(report) => report,
            Err(e) => return self.failed(scenario, teams.len(), e.to_string()),
        };
        debug!(
            "  {} projected in {:?} ({} byes)",
            scenario.name(),
            report.elapsed,
            report.diagnostics.byes
        );

        let validation = FieldValidator::new(regions).validate(&teams);
        let failure_reason = validation
            .failure_reason()
            .or_else(|| check(&teams, &report).err());

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            teams: teams.len(),
            simulations: report.simulations,
            failure_reason,
            metrics: ScenarioMetrics::collect(&teams, &report, validation.violations.len()),
        }
    }

    fn failed(&self, scenario: ScenarioId, teams: usize, reason: String) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: false,
            teams,
            simulations: 0,
            failure_reason: Some(reason),
            metrics: ScenarioMetrics::default(),
        }
    }
}

/// Mean champion probability over bracket teams whose seed line matches.
fn mean_champion(teams: &[TeamRecord], line: impl Fn(u8) -> bool) -> f64 {
    let picked: Vec<f64> = teams
        .iter()
        .filter(|t| t.projected_seed.line().is_some_and(&line))
        .map(|t| t.probabilities.get(Round::Champion))
        .collect();
    if picked.is_empty() {
        0.0
    } else {
        picked.iter().sum::<f64>() / picked.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_passes(scenario: ScenarioId, seed: u64) {
        let result = ScenarioRunner::new(seed).run(scenario);
        assert!(
            result.passed,
            "{} (seed={}) failed: {:?}",
            scenario,
            seed,
            result.failure_reason
        );
    }

    #[test]
    fn test_full_field() {
        assert_passes(ScenarioId::FullField, 42);
    }

    #[test]
    fn test_short_field() {
        assert_passes(ScenarioId::ShortField, 42);
    }

    #[test]
    fn test_chalk() {
        assert_passes(ScenarioId::Chalk, 42);
    }

    #[test]
    fn test_coin_flip() {
        assert_passes(ScenarioId::CoinFlip, 42);
    }

    #[test]
    fn test_two_region() {
        assert_passes(ScenarioId::TwoRegion, 42);
    }

    #[test]
    fn test_tie_break() {
        assert_passes(ScenarioId::TieBreak, 42);
    }

    #[test]
    fn test_all_scenarios_pass_across_seeds() {
        for seed in [1, 7, 1234] {
            let runner = ScenarioRunner::new(seed).with_simulations(1000);
            for scenario in ScenarioId::all() {
                let result = runner.run(scenario);
                assert!(result.passed, "{} seed={}: {:?}", scenario, seed, result.failure_reason);
            }
        }
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let a = ScenarioRunner::new(99).with_simulations(500).run(ScenarioId::FullField);
        let b = ScenarioRunner::new(99).with_simulations(500).run(ScenarioId::FullField);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_cancelled_runner_fails_scenario() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = ScenarioRunner::new(1).with_cancel(cancel).run(ScenarioId::FullField);

        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("cancelled"));
    }

    #[test]
    fn test_zero_simulations_fails_scenario() {
        let result = ScenarioRunner::new(1).with_simulations(0).run(ScenarioId::Chalk);
        assert!(!result.passed);
        assert_eq!(result.simulations, 0);
    }
}
