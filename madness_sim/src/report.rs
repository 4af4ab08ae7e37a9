//! JSON summaries for CLI output.
//!
//! Everything goes to stdout as one JSON document. Nothing is written to
//! disk; persisting the projection is up to the caller.

use crate::runner::ScenarioResult;
use madness_core::{
    ProjectionReport, RoundProbabilities, SeedingSummary, SimulationDiagnostics, TeamId, TeamRecord,
};
use madness_env::RunId;
use serde::Serialize;
use tracing::info;

/// One projected team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamLine {
    /// Overall rank (1 = best)
    pub rank: usize,
    pub id: TeamId,
    pub name: String,
    pub seed: String,
    pub region: String,
    pub seed_score: f64,
    pub probabilities: RoundProbabilities,
}

impl TeamLine {
    fn new(rank: usize, team: &TeamRecord) -> Self {
        Self {
            rank,
            id: team.id.clone(),
            name: team.name.clone(),
            seed: team.projected_seed.to_string(),
            region: team.projected_region.to_string(),
            seed_score: team.seed_score,
            probabilities: team.probabilities,
        }
    }
}

/// Summary of one projection over a field.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub simulations: u64,
    pub elapsed_ms: u64,
    pub seeding: SeedingSummary,
    pub diagnostics: SimulationDiagnostics,

    /// Top teams by overall rank
    pub teams: Vec<TeamLine>,
}

impl ProjectionSummary {
    /// `teams` must be in rank order, as the projector leaves them.
    pub fn new(run_id: RunId, teams: &[TeamRecord], report: &ProjectionReport, top: usize) -> Self {
        Self {
            run_id,
            seed: report.seed,
            simulations: report.simulations,
            elapsed_ms: report.elapsed.as_millis() as u64,
            seeding: report.seeding,
            diagnostics: report.diagnostics.clone(),
            teams: teams
                .iter()
                .take(top)
                .enumerate()
                .map(|(i, team)| TeamLine::new(i + 1, team))
                .collect(),
        }
    }

    /// Logs the summary as a table.
    pub fn log_table(&self) {
        info!(
            "Run {} | seed={} | {} simulations in {}ms",
            self.run_id, self.seed, self.simulations, self.elapsed_ms
        );
        info!(
            "{:>4} {:<24} {:>5} {:<10} {:>8} {:>7} {:>7} {:>7}",
            "rank", "team", "seed", "region", "score", "s16", "f4", "champ"
        );
        for line in &self.teams {
            info!(
                "{:>4} {:<24} {:>5} {:<10} {:>8.3} {:>7.4} {:>7.4} {:>7.4}",
                line.rank,
                line.name,
                line.seed,
                line.region,
                line.seed_score,
                line.probabilities.prob_s16,
                line.probabilities.prob_f4,
                line.probabilities.prob_champion
            );
        }
    }
}

/// Summary of a batch of scenario runs.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ScenarioResult>,
}

impl ScenarioSummary {
    pub fn new(results: Vec<ScenarioResult>) -> Self {
        let failed = results.iter().filter(|r| !r.passed).count();
        Self {
            total: results.len(),
            passed: results.len() - failed,
            failed,
            results,
        }
    }

    /// Results that failed, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
