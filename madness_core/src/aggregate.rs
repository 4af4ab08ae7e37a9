//! Probability Aggregator - counters to per-round probabilities.

use crate::error::BracketError;
use crate::scoring::round_to;
use crate::simulator::AdvancementCounts;
use crate::team::{Round, RoundProbabilities, TeamId, TeamRecord};
use std::collections::HashMap;

/// Decimal places kept in each round probability.
pub const PROBABILITY_PRECISION: i32 = 4;

/// Writes `probabilities` onto every team of the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityAggregator;

impl ProbabilityAggregator {
    /// `count / simulations` per round, rounded to 4 places.
    ///
    /// Every team in `teams` is written, including teams that never entered
    /// the simulation; those (and any team missing from `counts`) get zeros.
    pub fn aggregate(
        teams: &mut [TeamRecord],
        counts: &AdvancementCounts,
        simulations: u64,
    ) -> Result<(), BracketError> {
        if simulations < 1 {
            return Err(BracketError::invalid("cannot aggregate zero simulations"));
        }

        let index: HashMap<&TeamId, &[u64; Round::COUNT]> = counts.iter().collect();
        for team in teams.iter_mut() {
            team.probabilities = match index.get(&team.id) {
                Some(row) => Self::probabilities(row, simulations),
                None => RoundProbabilities::default(),
            };
        }
        Ok(())
    }

    /// Converts one counter row.
    pub fn probabilities(row: &[u64; Round::COUNT], simulations: u64) -> RoundProbabilities {
        let mut probs = RoundProbabilities::default();
        for round in Round::ALL {
            let p = row[round.index()] as f64 / simulations as f64;
            probs.set(round, round_to(p, PROBABILITY_PRECISION));
        }
        probs
    }
}
