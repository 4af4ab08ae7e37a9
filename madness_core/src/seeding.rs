//! Field Selector / Seeder.
//!
//! Sorts a scored field and partitions it into bracket slots purely by
//! overall rank:
//!
//! ```text
//! rank 1..=16R   -> seed (r-1)/R + 1, region regions[(r-1) % R]
//! next 4         -> First Four (play-in)
//! next 4         -> Bubble
//! everyone else  -> Not in field
//! ```
//!
//! With the default four regions the top 64 teams fill the bracket, 65-68
//! play in, 69-72 sit on the bubble.

use crate::error::BracketError;
use crate::team::{ProjectedRegion, ProjectedSeed, TeamRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Seed lines per region.
pub const SEEDS_PER_REGION: usize = 16;

/// Teams sent to the play-in round.
pub const FIRST_FOUR_SLOTS: usize = 4;

/// Teams tracked just below the play-in cutoff.
pub const BUBBLE_SLOTS: usize = 4;

/// Ordered, non-empty list of unique region names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RegionSet(Vec<String>);

impl RegionSet {
    pub fn new<I, S>(names: I) -> Result<Self, BracketError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(BracketError::InvalidRegions("at least one region is required".into()));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(BracketError::InvalidRegions("region names must not be blank".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(BracketError::InvalidRegions(format!("duplicate region: {}", name)));
            }
        }
        Ok(Self(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|r| r == name)
    }

    /// Number of main-bracket slots (16 per region).
    pub fn bracket_size(&self) -> usize {
        self.0.len() * SEEDS_PER_REGION
    }
}

impl Default for RegionSet {
    fn default() -> Self {
        Self(["East", "West", "South", "Midwest"].iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for RegionSet {
    type Error = BracketError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<RegionSet> for Vec<String> {
    fn from(regions: RegionSet) -> Self {
        regions.0
    }
}

/// Head counts produced by one seeding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeedingSummary {
    pub bracket: usize,
    pub first_four: usize,
    pub bubble: usize,
    pub excluded: usize,
}

impl SeedingSummary {
    pub fn total(&self) -> usize {
        self.bracket + self.first_four + self.bubble + self.excluded
    }
}

/// Assigns `projected_seed` and `projected_region` by overall rank.
#[derive(Debug, Clone, Default)]
pub struct FieldSeeder {
    regions: RegionSet,
}

impl FieldSeeder {
    pub fn new(regions: RegionSet) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Sorts `teams` by descending `seed_score` and writes projections.
    ///
    /// The sort is stable: teams with equal scores keep their input
    /// collection order, so the earlier record takes the better rank.
    pub fn seed(&self, teams: &mut [TeamRecord]) -> SeedingSummary {
        teams.sort_by(|a, b| b.seed_score.total_cmp(&a.seed_score));

        let n_regions = self.regions.len();
        let bracket_size = self.regions.bracket_size();
        let mut summary = SeedingSummary::default();

        for (i, team) in teams.iter_mut().enumerate() {
            let rank = i + 1;
            if rank <= bracket_size {
                let seed = (rank - 1) / n_regions + 1;
                let region = &self.regions.names()[(rank - 1) % n_regions];
                team.projected_seed = ProjectedSeed::Seed(seed as u8);
                team.projected_region = ProjectedRegion::Region(region.clone());
                summary.bracket += 1;
            } else if rank <= bracket_size + FIRST_FOUR_SLOTS {
                team.projected_seed = ProjectedSeed::FirstFour;
                team.projected_region = ProjectedRegion::PlayIn;
                summary.first_four += 1;
            } else if rank <= bracket_size + FIRST_FOUR_SLOTS + BUBBLE_SLOTS {
                team.projected_seed = ProjectedSeed::Bubble;
                team.projected_region = ProjectedRegion::Unassigned;
                summary.bubble += 1;
            } else {
                team.projected_seed = ProjectedSeed::NotInField;
                team.projected_region = ProjectedRegion::Unassigned;
                summary.excluded += 1;
            }
        }

        if summary.bracket < bracket_size {
            warn!(
                "Short field: {} of {} bracket slots filled, missing slots play as byes",
                summary.bracket, bracket_size
            );
        }
        debug!(
            "Seeded {} teams: bracket={} first_four={} bubble={} excluded={}",
            teams.len(),
            summary.bracket,
            summary.first_four,
            summary.bubble,
            summary.excluded
        );

        summary
    }

    /// Bracket teams ordered by (region order, seed line).
    pub fn bracket_order<'a>(&self, teams: &'a [TeamRecord]) -> Vec<&'a TeamRecord> {
        let mut bracket: Vec<&TeamRecord> = teams
            .iter()
            .filter(|t| t.projected_seed.is_bracket())
            .collect();
        bracket.sort_by_key(|t| {
            let region = t
                .projected_region
                .name()
                .and_then(|name| self.regions.position(name))
                .unwrap_or(usize::MAX);
            (region, t.projected_seed.line().unwrap_or(u8::MAX))
        });
        bracket
    }
}
