//! Game Outcome Model - the sole source of randomness in a bracket.
//!
//! `p(a beats b) = s(a) / (s(a) + s(b))` where `s` is the team's power
//! rating when present, otherwise `seed_score / 100`.

use crate::team::TeamRecord;
use rand::Rng;

/// Which side of a matchup won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Resolves single games.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameModel;

impl GameModel {
    /// Strength used for win probability.
    pub fn strength(team: &TeamRecord) -> f64 {
        match team.power_rating {
            Some(rating) => rating,
            None => team.seed_score / 100.0,
        }
    }

    /// Probability that `a` beats `b`. Falls back to 0.5 when the strengths
    /// sum to zero or produce a non-finite ratio.
    pub fn win_probability(a: &TeamRecord, b: &TeamRecord) -> f64 {
        let sa = Self::strength(a);
        let sb = Self::strength(b);
        let total = sa + sb;
        if total == 0.0 {
            return 0.5;
        }
        let p = sa / total;
        if p.is_finite() {
            p
        } else {
            0.5
        }
    }

    /// Resolves with an explicit draw `u` in `[0, 1)`: `a` wins iff `u < p`.
    pub fn resolve_with_draw(a: &TeamRecord, b: &TeamRecord, u: f64) -> Side {
        if u < Self::win_probability(a, b) {
            Side::A
        } else {
            Side::B
        }
    }

    /// Resolves with one uniform draw from `rng`.
    pub fn resolve<R: Rng + ?Sized>(a: &TeamRecord, b: &TeamRecord, rng: &mut R) -> Side {
        let u: f64 = rng.gen();
        Self::resolve_with_draw(a, b, u)
    }
}
