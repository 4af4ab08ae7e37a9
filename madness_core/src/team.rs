//! Team Record - the single normalized entity flowing through the pipeline.
//!
//! Upstream fusion hands the core one `TeamRecord` per team with every input
//! metric already populated (or left at its neutral default). The core only
//! ever writes the derived fields: `seed_score`, `projected_seed`,
//! `projected_region` and `probabilities`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a team missing from a NET/RPI style ranking.
pub const UNRANKED: u32 = 200;

/// Sentinel for a team outside a poll (AP, coaches).
pub const POLL_UNRANKED: u32 = 999;

/// Opaque team identifier, stable for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for TeamId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PROJECTION STATES
// =============================================================================

/// Where a team lands after seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectedSeed {
    /// Seed line 1..=16 inside the main bracket
    Seed(u8),

    /// Ranked just below the bracket cutoff, contests a play-in game
    FirstFour,

    /// Ranked just below the play-in cutoff, tracked but not simulated
    Bubble,

    /// Everyone else
    #[default]
    NotInField,
}

impl ProjectedSeed {
    /// Returns the seed line if this team sits in the main bracket.
    pub fn line(&self) -> Option<u8> {
        match self {
            ProjectedSeed::Seed(n) if (1..=16).contains(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_bracket(&self) -> bool {
        self.line().is_some()
    }
}

impl fmt::Display for ProjectedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectedSeed::Seed(n) => write!(f, "{}", n),
            ProjectedSeed::FirstFour => f.write_str("First Four"),
            ProjectedSeed::Bubble => f.write_str("Bubble"),
            ProjectedSeed::NotInField => f.write_str("Not in field"),
        }
    }
}

/// Region assignment after seeding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectedRegion {
    /// One of the configured bracket regions
    Region(String),

    /// First Four teams
    PlayIn,

    /// Outside the bracket
    #[default]
    Unassigned,
}

impl ProjectedRegion {
    pub fn name(&self) -> Option<&str> {
        match self {
            ProjectedRegion::Region(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectedRegion::Region(name) => f.write_str(name),
            ProjectedRegion::PlayIn => f.write_str("Play-in"),
            ProjectedRegion::Unassigned => f.write_str("-"),
        }
    }
}

// =============================================================================
// ROUNDS
// =============================================================================

/// One elimination stage of the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    R64,
    R32,
    S16,
    E8,
    F4,
    Championship,
    Champion,
}

impl Round {
    /// All rounds in bracket order.
    pub const ALL: [Round; 7] = [
        Round::R64,
        Round::R32,
        Round::S16,
        Round::E8,
        Round::F4,
        Round::Championship,
        Round::Champion,
    ];

    /// Rounds played inside a region.
    pub const REGIONAL: [Round; 4] = [Round::R64, Round::R32, Round::S16, Round::E8];

    pub const COUNT: usize = 7;

    /// Position in `Round::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Round::R64 => "r64",
            Round::R32 => "r32",
            Round::S16 => "s16",
            Round::E8 => "e8",
            Round::F4 => "f4",
            Round::Championship => "championship",
            Round::Champion => "champion",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Round {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Round::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s.to_lowercase().trim_start_matches("prob_"))
            .ok_or_else(|| format!("Unknown round: {}", s))
    }
}

/// Advancement probability per round, `prob_r64` through `prob_champion`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoundProbabilities {
    pub prob_r64: f64,
    pub prob_r32: f64,
    pub prob_s16: f64,
    pub prob_e8: f64,
    pub prob_f4: f64,
    pub prob_championship: f64,
    pub prob_champion: f64,
}

impl RoundProbabilities {
    pub fn get(&self, round: Round) -> f64 {
        match round {
            Round::R64 => self.prob_r64,
            Round::R32 => self.prob_r32,
            Round::S16 => self.prob_s16,
            Round::E8 => self.prob_e8,
            Round::F4 => self.prob_f4,
            Round::Championship => self.prob_championship,
            Round::Champion => self.prob_champion,
        }
    }

    pub fn set(&mut self, round: Round, value: f64) {
        let slot = match round {
            Round::R64 => &mut self.prob_r64,
            Round::R32 => &mut self.prob_r32,
            Round::S16 => &mut self.prob_s16,
            Round::E8 => &mut self.prob_e8,
            Round::F4 => &mut self.prob_f4,
            Round::Championship => &mut self.prob_championship,
            Round::Champion => &mut self.prob_champion,
        };
        *slot = value;
    }

    /// Iterates `(round, probability)` in bracket order.
    pub fn iter(&self) -> impl Iterator<Item = (Round, f64)> + '_ {
        Round::ALL.iter().map(move |&r| (r, self.get(r)))
    }

    /// True when every probability is zero.
    pub fn is_zero(&self) -> bool {
        self.iter().all(|(_, p)| p == 0.0)
    }
}

// =============================================================================
// TEAM RECORD
// =============================================================================

fn default_sos() -> f64 {
    0.5
}

fn default_rank() -> u32 {
    UNRANKED
}

fn default_poll_rank() -> u32 {
    POLL_UNRANKED
}

/// A fused team record.
///
/// Every metric carries a serde default so that a record missing a field
/// deserializes with the documented neutral value instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub abbrev: String,

    #[serde(default)]
    pub conference: String,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,

    /// Strength of schedule, 0-1
    #[serde(default = "default_sos")]
    pub sos: f64,

    #[serde(default = "default_rank")]
    pub net_rank: u32,

    #[serde(default = "default_rank")]
    pub rpi_rank: u32,

    #[serde(default = "default_poll_rank")]
    pub ap_rank: u32,

    #[serde(default = "default_poll_rank")]
    pub coaches_rank: u32,

    /// Expected win probability against an average opponent, 0-1
    #[serde(default)]
    pub power_rating: Option<f64>,

    /// Adjusted scoring margin per game, may be negative
    #[serde(default)]
    pub adjusted_margin: f64,

    #[serde(default)]
    pub ppg: f64,

    #[serde(default)]
    pub opp_ppg: f64,

    // Derived, written by the core only.
    #[serde(default)]
    pub seed_score: f64,

    #[serde(default)]
    pub projected_seed: ProjectedSeed,

    #[serde(default)]
    pub projected_region: ProjectedRegion,

    #[serde(default)]
    pub probabilities: RoundProbabilities,
}

impl TeamRecord {
    /// Creates a record with neutral defaults for every metric.
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbrev: String::new(),
            conference: String::new(),
            wins: 0,
            losses: 0,
            sos: default_sos(),
            net_rank: UNRANKED,
            rpi_rank: UNRANKED,
            ap_rank: POLL_UNRANKED,
            coaches_rank: POLL_UNRANKED,
            power_rating: None,
            adjusted_margin: 0.0,
            ppg: 0.0,
            opp_ppg: 0.0,
            seed_score: 0.0,
            projected_seed: ProjectedSeed::NotInField,
            projected_region: ProjectedRegion::Unassigned,
            probabilities: RoundProbabilities::default(),
        }
    }

    pub fn with_record(mut self, wins: u32, losses: u32) -> Self {
        self.wins = wins;
        self.losses = losses;
        self
    }

    pub fn with_ranks(mut self, net_rank: u32, rpi_rank: u32) -> Self {
        self.net_rank = net_rank;
        self.rpi_rank = rpi_rank;
        self
    }

    pub fn with_sos(mut self, sos: f64) -> Self {
        self.sos = sos;
        self
    }

    pub fn with_power_rating(mut self, rating: f64) -> Self {
        self.power_rating = Some(rating);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.adjusted_margin = margin;
        self
    }

    pub fn with_conference(mut self, conference: impl Into<String>) -> Self {
        self.conference = conference.into();
        self
    }

    /// Win fraction, 0 when no games were played.
    pub fn win_pct(&self) -> f64 {
        let total = u64::from(self.wins) + u64::from(self.losses);
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }

    /// Clears every derived field.
    pub fn reset_projection(&mut self) {
        self.seed_score = 0.0;
        self.projected_seed = ProjectedSeed::NotInField;
        self.projected_region = ProjectedRegion::Unassigned;
        self.probabilities = RoundProbabilities::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metrics_use_neutral_defaults() {
        let team: TeamRecord = serde_json::from_str(r#"{"id": "150", "name": "Duke"}"#).unwrap();

        assert_eq!(team.id, TeamId::new("150"));
        assert_eq!(team.sos, 0.5);
        assert_eq!(team.net_rank, UNRANKED);
        assert_eq!(team.ap_rank, POLL_UNRANKED);
        assert_eq!(team.power_rating, None);
        assert_eq!(team.projected_seed, ProjectedSeed::NotInField);
        assert!(team.probabilities.is_zero());
    }

    #[test]
    fn test_win_pct_without_games_is_zero() {
        let team = TeamRecord::new("1", "Nobody");
        assert_eq!(team.win_pct(), 0.0);

        let team = team.with_record(3, 1);
        assert_eq!(team.win_pct(), 0.75);
    }

    #[test]
    fn test_win_pct_handles_extreme_records() {
        let team = TeamRecord::new("1", "Ironman").with_record(u32::MAX, 1);
        assert!(team.win_pct() > 0.999_999 && team.win_pct() < 1.0);

        let team = TeamRecord::new("2", "Winless").with_record(0, u32::MAX);
        assert_eq!(team.win_pct(), 0.0);
    }

    #[test]
    fn test_seed_line_only_for_bracket_seeds() {
        assert_eq!(ProjectedSeed::Seed(16).line(), Some(16));
        assert_eq!(ProjectedSeed::Seed(17).line(), None);
        assert_eq!(ProjectedSeed::FirstFour.line(), None);
        assert!(!ProjectedSeed::Bubble.is_bracket());
    }

    #[test]
    fn test_round_names_round_trip() {
        for round in Round::ALL {
            assert_eq!(round.name().parse::<Round>(), Ok(round));
        }
        assert_eq!("prob_f4".parse::<Round>(), Ok(Round::F4));
        assert!("sweet_sixteen".parse::<Round>().is_err());
    }

    #[test]
    fn test_round_index_matches_order() {
        for (i, round) in Round::ALL.iter().enumerate() {
            assert_eq!(round.index(), i);
        }
    }

    #[test]
    fn test_probabilities_set_and_get() {
        let mut probs = RoundProbabilities::default();
        probs.set(Round::S16, 0.25);

        assert_eq!(probs.get(Round::S16), 0.25);
        assert_eq!(probs.prob_s16, 0.25);
        assert!(!probs.is_zero());
    }

    #[test]
    fn test_projection_states_serialize_snake_case() {
        let json = serde_json::to_string(&ProjectedSeed::FirstFour).unwrap();
        assert_eq!(json, r#""first_four""#);

        let json = serde_json::to_string(&ProjectedSeed::Seed(3)).unwrap();
        assert_eq!(json, r#"{"seed":3}"#);
    }
}
