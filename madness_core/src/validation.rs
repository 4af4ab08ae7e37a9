//! Validation Module - Structural Checks for a Projected Field
//! ============================================================
//!
//! Checks a field that went through the pipeline against the properties a
//! projection must satisfy:
//!
//! - Bracket shape (16 seed lines per region, one team per line per region)
//! - Play-in and bubble head counts
//! - Probabilities inside [0, 1], and non-increasing along the rounds on
//!   full fields (byes in short fields skip a counter)
//! - Teams outside the bracket carry all-zero probabilities
//! - Champion probabilities sum to one
//!
//! Usage:
//! ```ignore
//! use madness_core::validation::FieldValidator;
//!
//! let report = FieldValidator::new(regions).validate(&teams);
//! if !report.passes() {
//!     report.print();
//! }
//! ```

use crate::seeding::{RegionSet, BUBBLE_SLOTS, FIRST_FOUR_SLOTS, SEEDS_PER_REGION};
use crate::team::{ProjectedSeed, Round, TeamId, TeamRecord};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// VIOLATIONS
// =============================================================================

/// A single failed check.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A region does not hold each seed line exactly once
    RegionShape { region: String, seeds: Vec<u8> },

    /// A seed line is held by the wrong number of teams
    SeedLineCount { seed: u8, count: usize, expected: usize },

    /// Wrong number of play-in or bubble teams
    TierCount { tier: &'static str, count: usize, expected: usize },

    /// Probability outside [0, 1]
    OutOfRange { team: TeamId, round: Round, value: f64 },

    /// A later round is more likely than an earlier one
    NotMonotonic { team: TeamId, earlier: Round, later: Round, slack: f64 },

    /// A team outside the bracket has a non-zero probability
    PhantomAdvancement { team: TeamId },

    /// Champion probabilities do not sum to one
    ChampionMass { total: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RegionShape { region, seeds } => {
                write!(f, "region {} has seeds {:?}", region, seeds)
            }
            Violation::SeedLineCount { seed, count, expected } => {
                write!(f, "seed {} held by {} teams (expected {})", seed, count, expected)
            }
            Violation::TierCount { tier, count, expected } => {
                write!(f, "{} has {} teams (expected {})", tier, count, expected)
            }
            Violation::OutOfRange { team, round, value } => {
                write!(f, "team {} {} probability {} outside [0,1]", team, round, value)
            }
            Violation::NotMonotonic { team, earlier, later, slack } => {
                write!(f, "team {} {} exceeds {} by {:.4}", team, later, earlier, slack)
            }
            Violation::PhantomAdvancement { team } => {
                write!(f, "team {} is outside the bracket but has advancement", team)
            }
            Violation::ChampionMass { total } => {
                write!(f, "champion probabilities sum to {:.4}", total)
            }
        }
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Runs every structural check over a projected field.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    regions: RegionSet,
    /// Allowed excess of a later round over an earlier one
    monotonic_tolerance: f64,
}

impl FieldValidator {
    pub fn new(regions: RegionSet) -> Self {
        Self { regions, monotonic_tolerance: 1e-9 }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.monotonic_tolerance = tolerance;
        self
    }

    pub fn validate(&self, teams: &[TeamRecord]) -> ValidationReport {
        let mut violations = Vec::new();
        let full_field = teams.len() >= self.regions.bracket_size();

        self.check_bracket(teams, full_field, &mut violations);
        self.check_tiers(teams, &mut violations);
        self.check_probabilities(teams, full_field, &mut violations);

        ValidationReport {
            teams: teams.len(),
            bracket_teams: teams.iter().filter(|t| t.projected_seed.is_bracket()).count(),
            full_field,
            violations,
        }
    }

    fn check_bracket(&self, teams: &[TeamRecord], full_field: bool, out: &mut Vec<Violation>) {
        let mut per_region: HashMap<&str, Vec<u8>> = HashMap::new();
        let mut per_line: HashMap<u8, usize> = HashMap::new();
        for team in teams {
            if let (Some(seed), Some(region)) = (team.projected_seed.line(), team.projected_region.name()) {
                per_region.entry(region).or_default().push(seed);
                *per_line.entry(seed).or_default() += 1;
            }
        }

        for region in self.regions.names() {
            let mut seeds = per_region.remove(region.as_str()).unwrap_or_default();
            seeds.sort_unstable();
            let mut unique = seeds.clone();
            unique.dedup();
            let complete = seeds.len() == SEEDS_PER_REGION && unique.len() == SEEDS_PER_REGION;
            // Short fields may leave holes but never duplicates
            if (full_field && !complete) || unique.len() != seeds.len() {
                out.push(Violation::RegionShape { region: region.clone(), seeds });
            }
        }
        for (region, seeds) in per_region {
            out.push(Violation::RegionShape { region: region.to_string(), seeds });
        }

        if full_field {
            for seed in 1..=SEEDS_PER_REGION as u8 {
                let count = per_line.get(&seed).copied().unwrap_or(0);
                if count != self.regions.len() {
                    out.push(Violation::SeedLineCount { seed, count, expected: self.regions.len() });
                }
            }
        }
    }

    fn check_tiers(&self, teams: &[TeamRecord], out: &mut Vec<Violation>) {
        let beyond = teams.len().saturating_sub(self.regions.bracket_size());
        let expected_first_four = beyond.min(FIRST_FOUR_SLOTS);
        let expected_bubble = beyond.saturating_sub(FIRST_FOUR_SLOTS).min(BUBBLE_SLOTS);

        let first_four = teams.iter().filter(|t| t.projected_seed == ProjectedSeed::FirstFour).count();
        let bubble = teams.iter().filter(|t| t.projected_seed == ProjectedSeed::Bubble).count();

        if first_four != expected_first_four {
            out.push(Violation::TierCount { tier: "first_four", count: first_four, expected: expected_first_four });
        }
        if bubble != expected_bubble {
            out.push(Violation::TierCount { tier: "bubble", count: bubble, expected: expected_bubble });
        }
    }

    fn check_probabilities(&self, teams: &[TeamRecord], full_field: bool, out: &mut Vec<Violation>) {
        let mut champion_total = 0.0;
        let mut any_bracket = false;

        for team in teams {
            let probs = &team.probabilities;
            for (round, value) in probs.iter() {
                if !(0.0..=1.0).contains(&value) {
                    out.push(Violation::OutOfRange { team: team.id.clone(), round, value });
                }
            }
            for pair in Round::ALL.windows(2) {
                let slack = probs.get(pair[1]) - probs.get(pair[0]);
                if full_field && slack > self.monotonic_tolerance {
                    out.push(Violation::NotMonotonic {
                        team: team.id.clone(),
                        earlier: pair[0],
                        later: pair[1],
                        slack,
                    });
                }
            }
            if team.projected_seed.is_bracket() {
                any_bracket = true;
                champion_total += probs.prob_champion;
            } else if !probs.is_zero() {
                out.push(Violation::PhantomAdvancement { team: team.id.clone() });
            }
        }

        // Each probability is rounded to 4 places
        let rounding = teams.len() as f64 * 0.00005 + 1e-9;
        if any_bracket && (champion_total - 1.0).abs() > rounding {
            out.push(Violation::ChampionMass { total: champion_total });
        }
    }
}

// =============================================================================
// VALIDATION REPORT
// =============================================================================

/// Outcome of `FieldValidator::validate`.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub teams: usize,
    pub bracket_teams: usize,
    pub full_field: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn passes(&self) -> bool {
        self.violations.is_empty()
    }

    /// First violation, formatted, if any.
    pub fn failure_reason(&self) -> Option<String> {
        match self.violations.len() {
            0 => None,
            1 => Some(self.violations[0].to_string()),
            n => Some(format!("{} (+{} more)", self.violations[0], n - 1)),
        }
    }

    /// Print formatted report to console
    pub fn print(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               FIELD VALIDATION REPORT                        ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Teams:                 {:>10}                            ║", self.teams);
        println!("║ Bracket Teams:         {:>10}                            ║", self.bracket_teams);
        println!("║ Full Field:            {:>10}                            ║", self.full_field);
        println!("║ Violations:            {:>10}                            ║", self.violations.len());
        println!("╚══════════════════════════════════════════════════════════════╝");

        for violation in self.violations.iter().take(10) {
            println!("  - {}", violation);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
