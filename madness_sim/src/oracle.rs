//! Ground truth oracle for synthetic fields.
//!
//! The oracle owns a latent "true quality" per team and derives every
//! observable metric from it with noise:
//! - Won/lost record
//! - NET rank (RPI rank proxies it)
//! - Schedule strength, scoring margin, poll ranks
//! - Power rating (logistic in quality)
//!
//! The latent quality never leaves the oracle except through
//! `FieldOracle::quality_order`, which scenarios use as ground truth.

use madness_core::team::POLL_UNRANKED;
use madness_core::{TeamId, TeamRecord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Conferences that historically send the most teams to the tournament.
pub const POWER_CONFERENCES: [&str; 10] = [
    "SEC",
    "Big Ten",
    "Big 12",
    "ACC",
    "Big East",
    "Pac-12",
    "American",
    "Mountain West",
    "Atlantic 10",
    "WCC",
];

/// Poll ballots rank this many teams.
const POLL_SIZE: u32 = 25;

/// Noise between latent quality and the observed NET ordering.
const RANK_NOISE_STD: f64 = 0.35;

/// Synthetic team before it is turned into a record.
#[derive(Debug, Clone)]
struct LatentTeam {
    index: usize,
    quality: f64,
}

/// Generates deterministic synthetic fields from a seed.
pub struct FieldOracle {
    rng: ChaCha8Rng,

    /// Attach power ratings to generated records
    power_ratings: bool,

    /// Latent qualities of the last generated field, by team index
    qualities: Vec<f64>,
}

impl FieldOracle {
    /// Creates a new oracle with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            power_ratings: true,
            qualities: Vec::new(),
        }
    }

    /// Leaves `power_rating` unset so games fall back to the seed score.
    pub fn without_power_ratings(mut self) -> Self {
        self.power_ratings = false;
        self
    }

    /// A field of `n` teams with normally distributed quality.
    pub fn generate(&mut self, n: usize) -> Vec<TeamRecord> {
        let qualities: Vec<f64> = (0..n).map(|_| self.normal()).collect();
        self.build(qualities, false)
    }

    /// A field whose quality falls strictly with the team index.
    ///
    /// Metrics carry no noise and schedule strength is flat, so the composite
    /// score orders the field exactly by quality.
    pub fn chalk(&mut self, n: usize) -> Vec<TeamRecord> {
        let step = 6.0 / n.max(1) as f64;
        let qualities: Vec<f64> = (0..n).map(|i| 3.0 - step * i as f64).collect();
        self.build(qualities, true)
    }

    /// A field where every team has the same quality and identical metrics.
    pub fn identical(&mut self, n: usize) -> Vec<TeamRecord> {
        self.qualities = vec![0.0; n];
        (0..n)
            .map(|i| {
                let mut team = Self::named(i)
                    .with_record(20, 10)
                    .with_ranks(50, 50)
                    .with_sos(0.6)
                    .with_margin(5.0)
                    .with_conference(POWER_CONFERENCES[i % POWER_CONFERENCES.len()]);
                if self.power_ratings {
                    team.power_rating = Some(1.0);
                }
                team
            })
            .collect()
    }

    /// Team ids ordered from the highest latent quality to the lowest.
    pub fn quality_order(&self) -> Vec<TeamId> {
        let mut order: Vec<usize> = (0..self.qualities.len()).collect();
        order.sort_by(|&a, &b| self.qualities[b].total_cmp(&self.qualities[a]));
        order.into_iter().map(Self::team_id).collect()
    }

    fn build(&mut self, qualities: Vec<f64>, exact: bool) -> Vec<TeamRecord> {
        let latent: Vec<LatentTeam> = qualities
            .iter()
            .enumerate()
            .map(|(index, &quality)| LatentTeam { index, quality })
            .collect();

        // Observed ordering: quality blurred by noise
        let mut observed: Vec<(usize, f64)> = latent
            .iter()
            .map(|t| {
                let noise = if exact { 0.0 } else { RANK_NOISE_STD * self.normal() };
                (t.index, t.quality + noise)
            })
            .collect();
        observed.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut net_rank = vec![0u32; latent.len()];
        for (rank, (index, _)) in observed.iter().enumerate() {
            net_rank[*index] = rank as u32 + 1;
        }

        let teams = latent
            .iter()
            .map(|t| self.record(t, net_rank[t.index], exact))
            .collect();
        self.qualities = qualities;
        teams
    }

    fn record(&mut self, latent: &LatentTeam, net_rank: u32, exact: bool) -> TeamRecord {
        let q = latent.quality;
        let mut noise = |scale: f64| if exact { 0.0 } else { scale * self.normal() };
        let wins = (19.0 + 4.5 * q + noise(1.0)).round().clamp(10.0, 28.0) as u32;
        let losses = (6.0 - 2.0 * q + noise(0.5)).round().clamp(2.0, 10.0) as u32;
        let margin = round10(8.0 * q + noise(2.0));
        let ppg = round10(72.0 + 4.0 * q + noise(3.0));
        let sos = if exact { 0.6 } else { round1000(self.rng.gen_range(0.3..=0.9)) };

        let mut team = Self::named(latent.index)
            .with_record(wins, losses)
            .with_ranks(net_rank, net_rank)
            .with_sos(sos)
            .with_margin(margin)
            .with_conference(POWER_CONFERENCES[latent.index % POWER_CONFERENCES.len()]);
        team.ppg = ppg;
        team.opp_ppg = round10(ppg - margin);
        team.ap_rank = if net_rank <= POLL_SIZE { net_rank } else { POLL_UNRANKED };
        team.coaches_rank = team.ap_rank;
        if self.power_ratings {
            team.power_rating = Some(1.0 / (1.0 + (-q).exp()));
        }
        team
    }

    fn named(index: usize) -> TeamRecord {
        let mut team = TeamRecord::new(Self::team_id(index), format!("Team {:03}", index + 1));
        team.abbrev = format!("T{:03}", index + 1);
        team
    }

    fn team_id(index: usize) -> TeamId {
        TeamId::from(index as u64 + 1)
    }

    fn normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

fn round10(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round1000(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_field() {
        let a = FieldOracle::new(7).generate(68);
        let b = FieldOracle::new(7).generate(68);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = FieldOracle::new(7).generate(68);
        let b = FieldOracle::new(8).generate(68);
        assert_ne!(a, b);
    }

    #[test]
    fn test_metrics_within_fallback_ranges() {
        for team in FieldOracle::new(3).generate(200) {
            assert!((10..=28).contains(&team.wins));
            assert!((2..=10).contains(&team.losses));
            assert!((0.3..=0.9).contains(&team.sos));
            let rating = team.power_rating.unwrap();
            assert!(rating > 0.0 && rating < 1.0);
            assert_eq!(team.rpi_rank, team.net_rank);
        }
    }

    #[test]
    fn test_net_ranks_form_a_permutation() {
        let teams = FieldOracle::new(11).generate(80);
        let mut ranks: Vec<u32> = teams.iter().map(|t| t.net_rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=80).collect::<Vec<u32>>());
    }

    #[test]
    fn test_poll_ranks_only_for_top_25() {
        let teams = FieldOracle::new(5).generate(68);
        let polled = teams.iter().filter(|t| t.ap_rank != POLL_UNRANKED).count();
        assert_eq!(polled, 25);
    }

    #[test]
    fn test_chalk_ranks_by_index() {
        let teams = FieldOracle::new(1).chalk(20);
        for (i, team) in teams.iter().enumerate() {
            assert_eq!(team.net_rank, i as u32 + 1);
        }
    }

    #[test]
    fn test_quality_order_tracks_latent_quality() {
        let mut oracle = FieldOracle::new(1);
        oracle.chalk(5);
        let expected: Vec<TeamId> = (1..=5u64).map(TeamId::from).collect();
        assert_eq!(oracle.quality_order(), expected);
    }

    #[test]
    fn test_identical_field() {
        let teams = FieldOracle::new(1).identical(8);
        assert!(teams.iter().all(|t| t.wins == 20 && t.power_rating == Some(1.0)));

        let unrated = FieldOracle::new(1).without_power_ratings().identical(8);
        assert!(unrated.iter().all(|t| t.power_rating.is_none()));
    }

    proptest! {
        #[test]
        fn prop_any_seed_gives_a_rank_permutation(seed in any::<u64>(), n in 1usize..120) {
            let teams = FieldOracle::new(seed).generate(n);
            let mut ranks: Vec<u32> = teams.iter().map(|t| t.net_rank).collect();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, (1..=n as u32).collect::<Vec<u32>>());
        }
    }
}
