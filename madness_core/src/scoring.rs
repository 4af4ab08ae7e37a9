//! Composite Scorer - one ranking number per team.
//!
//! The score is a weighted linear combination of normalized components,
//! each contributing at most its weight in points:
//!
//! | component              | normalization                          |
//! |------------------------|----------------------------------------|
//! | win percentage         | `wins / (wins + losses)`, 0 if no games |
//! | NET rank               | `(CAP - min(rank, CAP)) / CAP`         |
//! | RPI rank               | same                                   |
//! | strength of schedule   | `clamp(sos, 0, 1)`                     |
//! | adjusted margin        | `(clamp(m, -M, M) + M) / 2M`           |
//!
//! The scorer is total: non-finite inputs fall back to neutral values and an
//! unranked sentinel counts as the worst possible rank.

use crate::team::{TeamRecord, UNRANKED};
use serde::{Deserialize, Serialize};

/// Decimal places kept in `seed_score`.
pub const SCORE_PRECISION: i32 = 3;

/// Point weights for each score component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub win_pct: f64,
    pub net_rank: f64,
    pub rpi_rank: f64,
    pub sos: f64,
    pub margin: f64,

    /// Rank at or beyond which a ranking contributes nothing
    pub rank_cap: u32,

    /// Symmetric clamp applied to the adjusted margin
    pub margin_clamp: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            win_pct: 35.0,
            net_rank: 25.0,
            rpi_rank: 20.0,
            sos: 10.0,
            margin: 10.0,
            rank_cap: UNRANKED,
            margin_clamp: 30.0,
        }
    }
}

impl ScoreWeights {
    /// The 40/30/20/10 split with no margin term.
    pub fn legacy() -> Self {
        Self {
            win_pct: 40.0,
            net_rank: 30.0,
            rpi_rank: 20.0,
            sos: 10.0,
            margin: 0.0,
            ..Self::default()
        }
    }

    /// Maximum attainable score.
    pub fn total(&self) -> f64 {
        self.win_pct + self.net_rank + self.rpi_rank + self.sos + self.margin
    }
}

/// Computes and writes `seed_score`.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    weights: ScoreWeights,
}

impl CompositeScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Pure score of a single team. Never fails.
    pub fn score(&self, team: &TeamRecord) -> f64 {
        let w = &self.weights;

        let sos = if team.sos.is_finite() { team.sos.clamp(0.0, 1.0) } else { 0.5 };
        let margin = if team.adjusted_margin.is_finite() { team.adjusted_margin } else { 0.0 };

        let raw = team.win_pct() * w.win_pct
            + self.rank_component(team.net_rank) * w.net_rank
            + self.rank_component(team.rpi_rank) * w.rpi_rank
            + sos * w.sos
            + self.margin_component(margin) * w.margin;

        round_to(raw, SCORE_PRECISION)
    }

    /// Scores every team in place.
    pub fn apply(&self, teams: &mut [TeamRecord]) {
        for team in teams.iter_mut() {
            team.seed_score = self.score(team);
        }
    }

    fn rank_component(&self, rank: u32) -> f64 {
        let cap = self.weights.rank_cap.max(1);
        (cap - rank.min(cap)) as f64 / cap as f64
    }

    fn margin_component(&self, margin: f64) -> f64 {
        let clamp = self.weights.margin_clamp;
        if clamp <= 0.0 || !clamp.is_finite() {
            return 0.5;
        }
        (margin.clamp(-clamp, clamp) + clamp) / (2.0 * clamp)
    }
}

/// Rounds half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::POLL_UNRANKED;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_team_scores_total() {
        let team = TeamRecord::new("1", "Perfect")
            .with_record(30, 0)
            .with_ranks(0, 0)
            .with_sos(1.0)
            .with_margin(45.0);

        let scorer = CompositeScorer::default();
        assert_relative_eq!(scorer.score(&team), 100.0);
    }

    #[test]
    fn test_empty_record_scores_neutral_terms_only() {
        // No games, unranked, default SOS, zero margin
        let team = TeamRecord::new("1", "Empty");
        let scorer = CompositeScorer::default();

        // 0.5 * 10 (sos) + 0.5 * 10 (margin)
        assert_relative_eq!(scorer.score(&team), 10.0);
    }

    #[test]
    fn test_sentinel_ranks_count_as_worst() {
        let scorer = CompositeScorer::default();
        let at_cap = TeamRecord::new("a", "A").with_ranks(UNRANKED, UNRANKED);
        let poll_sentinel = TeamRecord::new("b", "B").with_ranks(POLL_UNRANKED, POLL_UNRANKED);

        assert_eq!(scorer.score(&at_cap), scorer.score(&poll_sentinel));
    }

    #[test]
    fn test_margin_is_clamped() {
        let scorer = CompositeScorer::default();
        let blowout = TeamRecord::new("a", "A").with_margin(80.0);
        let capped = TeamRecord::new("b", "B").with_margin(30.0);
        let disaster = TeamRecord::new("c", "C").with_margin(-80.0);

        assert_eq!(scorer.score(&blowout), scorer.score(&capped));
        assert_relative_eq!(scorer.score(&blowout) - scorer.score(&disaster), 10.0);
    }

    #[test]
    fn test_non_finite_metrics_fall_back() {
        let scorer = CompositeScorer::default();
        let broken = TeamRecord::new("a", "A").with_sos(f64::NAN).with_margin(f64::INFINITY);
        let neutral = TeamRecord::new("b", "B");

        assert_eq!(scorer.score(&broken), scorer.score(&neutral));
    }

    #[test]
    fn test_overflowing_record_scores_like_even_record() {
        let scorer = CompositeScorer::default();
        let extreme = TeamRecord::new("a", "A").with_record(u32::MAX, u32::MAX);
        let even = TeamRecord::new("b", "B").with_record(10, 10);

        let score = scorer.score(&extreme);
        assert!(score.is_finite());
        assert_relative_eq!(score, scorer.score(&even));
    }

    #[test]
    fn test_legacy_weights_formula() {
        let team = TeamRecord::new("1", "Legacy")
            .with_record(20, 10)
            .with_ranks(50, 40)
            .with_sos(0.6);

        let scorer = CompositeScorer::new(ScoreWeights::legacy());
        let expected = (20.0 / 30.0) * 40.0 + (150.0 / 200.0) * 30.0 + (160.0 / 200.0) * 20.0 + 0.6 * 10.0;

        assert_relative_eq!(scorer.score(&team), round_to(expected, 3));
        assert_relative_eq!(ScoreWeights::legacy().total(), 100.0);
    }

    #[test]
    fn test_apply_writes_seed_score() {
        let mut teams = vec![
            TeamRecord::new("1", "A").with_record(25, 5),
            TeamRecord::new("2", "B").with_record(5, 25),
        ];

        CompositeScorer::default().apply(&mut teams);

        assert!(teams[0].seed_score > teams[1].seed_score);
    }

    #[test]
    fn test_score_rounded_to_three_places() {
        let team = TeamRecord::new("1", "Odd").with_record(1, 2).with_ranks(7, 13);
        let score = CompositeScorer::default().score(&team);

        assert_relative_eq!(score, round_to(score, 3), epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_score_is_reproducible_and_bounded(
            wins in 0u32..40,
            losses in 0u32..40,
            net in 0u32..1000,
            rpi in 0u32..1000,
            sos in -1.0f64..2.0,
            margin in -100.0f64..100.0,
        ) {
            let team = TeamRecord::new("p", "Prop")
                .with_record(wins, losses)
                .with_ranks(net, rpi)
                .with_sos(sos)
                .with_margin(margin);
            let scorer = CompositeScorer::default();

            let first = scorer.score(&team);
            prop_assert_eq!(first, scorer.score(&team.clone()));
            prop_assert!(first >= 0.0);
            prop_assert!(first <= scorer.weights().total() + 1e-9);
        }
    }
}
