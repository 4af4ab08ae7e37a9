//! Monte Carlo Bracket Simulator.
//!
//! # Pairing
//!
//! Each region is ordered by seed line and paired by adjacency, 1v2, 3v4,
//! ..., 15v16, and winners keep their list order into the next round. This
//! is not the 1v16 / 8v9 tournament layout; the adjacency rule defines the
//! expected outputs and must not be swapped for standard reseeding.
//!
//! ```text
//!  region (seed order)      r64        r32       s16      e8
//!  [1,2,3,4,...,15,16] -> 8 winners -> 4 -> 2 -> 1 region champion
//!
//!  region champions (region order) -> f4 pairs -> championship -> champion
//! ```
//!
//! # Fan-out
//!
//! Simulations are cut into fixed-size chunks. A chunk draws from its own
//! stream (`ctx.stream(chunk_index)`) and counts into private
//! `AdvancementCounts`; chunks are summed at the end. No iteration observes
//! another's state, and for a seeded context the totals do not depend on
//! how many threads rayon happens to use.

use crate::config::SimulationConfig;
use crate::error::BracketError;
use crate::game::{GameModel, Side};
use crate::team::{Round, TeamId, TeamRecord};
use madness_env::{CancelToken, EnvError, RandomContext};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

// =============================================================================
// COUNTERS
// =============================================================================

/// Per-team, per-round advancement counters, aligned with the team slice
/// passed to `simulate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancementCounts {
    ids: Vec<TeamId>,
    counts: Vec<[u64; Round::COUNT]>,
}

impl AdvancementCounts {
    /// Zeroed counters for every team in `teams`.
    pub fn for_field(teams: &[TeamRecord]) -> Self {
        Self {
            ids: teams.iter().map(|t| t.id.clone()).collect(),
            counts: vec![[0; Round::COUNT]; teams.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn increment(&mut self, slot: usize, round: Round) {
        self.counts[slot][round.index()] += 1;
    }

    pub fn get(&self, slot: usize, round: Round) -> u64 {
        self.counts[slot][round.index()]
    }

    /// Iterates `(team id, counters)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&TeamId, &[u64; Round::COUNT])> {
        self.ids.iter().zip(self.counts.iter())
    }

    /// Sums another run's counters into this one.
    ///
    /// Teams are matched by id, so the two runs may order the field
    /// differently. Teams unknown to `self` are appended.
    pub fn merge(&mut self, other: &AdvancementCounts) {
        if self.ids == other.ids {
            for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
                add_rows(mine, theirs);
            }
            return;
        }

        let index: HashMap<TeamId, usize> = self
            .ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (id.clone(), slot))
            .collect();
        for (id, theirs) in other.iter() {
            match index.get(id) {
                Some(&slot) => add_rows(&mut self.counts[slot], theirs),
                None => {
                    self.ids.push(id.clone());
                    self.counts.push(*theirs);
                }
            }
        }
    }
}

fn add_rows(into: &mut [u64; Round::COUNT], from: &[u64; Round::COUNT]) {
    for (a, b) in into.iter_mut().zip(from.iter()) {
        *a += b;
    }
}

/// Degenerate-bracket observations. Never errors, only counted and logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationDiagnostics {
    /// Teams that advanced without a partner, summed over all simulations
    pub byes: u64,

    /// Simulations whose national rounds had no team at all
    pub empty_finals: u64,

    /// Regions holding fewer than 16 teams
    pub short_regions: Vec<String>,

    /// Region names found on teams but absent from the configured list
    pub unknown_regions: Vec<String>,
}

impl SimulationDiagnostics {
    /// True if no degenerate condition was seen.
    pub fn is_clean(&self) -> bool {
        self.byes == 0
            && self.empty_finals == 0
            && self.short_regions.is_empty()
            && self.unknown_regions.is_empty()
    }

    fn absorb(&mut self, other: &SimulationDiagnostics) {
        self.byes += other.byes;
        self.empty_finals += other.empty_finals;
    }
}

/// Result of a completed `simulate` call.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub counts: AdvancementCounts,
    pub simulations: u64,
    pub diagnostics: SimulationDiagnostics,
    /// Seed reported by the random context (0 for OS entropy)
    pub seed: u64,
}

// =============================================================================
// LAYOUT
// =============================================================================

/// One region's bracket: slot indices into the team slice, in seed order.
#[derive(Debug, Clone)]
pub(crate) struct RegionBracket {
    pub(crate) name: String,
    pub(crate) slots: Vec<usize>,
}

/// Immutable bracket shared by every simulation.
#[derive(Debug, Clone)]
pub(crate) struct BracketLayout {
    pub(crate) regions: Vec<RegionBracket>,
}

impl BracketLayout {
    /// Groups seeded teams by region. Configured regions come first, in
    /// configured order; unknown region names follow in first-seen order.
    pub(crate) fn build(
        teams: &[TeamRecord],
        config: &SimulationConfig,
        diagnostics: &mut SimulationDiagnostics,
    ) -> Self {
        let mut regions: Vec<RegionBracket> = config
            .regions
            .names()
            .iter()
            .map(|name| RegionBracket { name: name.clone(), slots: Vec::new() })
            .collect();

        for (slot, team) in teams.iter().enumerate() {
            if !team.projected_seed.is_bracket() {
                continue;
            }
            let Some(name) = team.projected_region.name() else {
                warn!("Team {} has seed {} but no region, skipped", team.id, team.projected_seed);
                continue;
            };
            match regions.iter_mut().find(|r| r.name == name) {
                Some(region) => region.slots.push(slot),
                None => {
                    warn!("Team {} is in unknown region '{}'", team.id, name);
                    diagnostics.unknown_regions.push(name.to_string());
                    regions.push(RegionBracket { name: name.to_string(), slots: vec![slot] });
                }
            }
        }

        for region in &mut regions {
            // Stable: duplicate seed lines keep field order
            region.slots.sort_by_key(|&slot| teams[slot].projected_seed.line());
            if region.slots.len() < crate::seeding::SEEDS_PER_REGION {
                debug!("Region {} has {} teams, missing slots play as byes", region.name, region.slots.len());
                diagnostics.short_regions.push(region.name.clone());
            }
        }

        Self { regions }
    }

    pub(crate) fn team_count(&self) -> usize {
        self.regions.iter().map(|r| r.slots.len()).sum()
    }
}

// =============================================================================
// SIMULATOR
// =============================================================================

struct ChunkResult {
    counts: AdvancementCounts,
    diagnostics: SimulationDiagnostics,
    completed: u64,
    stopped: Option<EnvError>,
}

/// Runs independent single-elimination simulations over a seeded field.
#[derive(Debug, Clone, Default)]
pub struct BracketSimulator {
    config: SimulationConfig,
    cancel: CancelToken,
}

impl BracketSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config, cancel: CancelToken::new() }
    }

    /// Attaches a cancellation/timeout token polled between simulations.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulates the bracket `config.simulations` times.
    ///
    /// Only teams with a seed line 1..=16 play. Counters cover the whole
    /// slice so that the aggregator can zero out everyone else.
    ///
    /// # Errors
    /// * `InvalidParameter` - zero simulations or zero chunk size
    /// * `Cancelled` / `Env(Timeout)` - the cancel token fired; no partial
    ///   counts are returned
    pub fn simulate<C: RandomContext>(
        &self,
        teams: &[TeamRecord],
        ctx: &C,
    ) -> Result<SimulationOutcome, BracketError> {
        self.config.validate()?;

        let mut diagnostics = SimulationDiagnostics::default();
        let layout = BracketLayout::build(teams, &self.config, &mut diagnostics);
        if layout.team_count() < 2 {
            warn!("Only {} team(s) in the bracket, results are degenerate", layout.team_count());
        }

        let total = self.config.simulations;
        let chunk_size = self.config.chunk_size;
        let chunks = total.div_ceil(chunk_size);

        info!(
            "Simulating {} brackets: {} teams, {} regions, {} chunks (seed={})",
            total,
            layout.team_count(),
            layout.regions.len(),
            chunks,
            ctx.seed()
        );

        let run = |chunk: u64| {
            let start = chunk * chunk_size;
            let len = chunk_size.min(total - start);
            let mut rng = ctx.stream(chunk);
            self.run_chunk(teams, &layout, &mut rng, len)
        };
        let partials: Vec<ChunkResult> = if self.config.parallel {
            (0..chunks).into_par_iter().map(run).collect()
        } else {
            (0..chunks).map(run).collect()
        };

        let mut counts = AdvancementCounts::for_field(teams);
        let mut completed = 0;
        let mut stopped = None;
        for partial in &partials {
            counts.merge(&partial.counts);
            diagnostics.absorb(&partial.diagnostics);
            completed += partial.completed;
            if stopped.is_none() {
                stopped = partial.stopped.clone();
            }
        }

        match stopped {
            Some(EnvError::Cancelled) => {
                warn!("Simulation cancelled after {}/{} runs", completed, total);
                return Err(BracketError::Cancelled { completed });
            }
            Some(err) => {
                warn!("Simulation stopped after {}/{} runs: {}", completed, total, err);
                return Err(err.into());
            }
            None => {}
        }

        if diagnostics.byes > 0 || diagnostics.empty_finals > 0 {
            debug!(
                "Degenerate bracket: {} byes, {} empty finals over {} runs",
                diagnostics.byes, diagnostics.empty_finals, total
            );
        }

        Ok(SimulationOutcome {
            counts,
            simulations: total,
            diagnostics,
            seed: ctx.seed(),
        })
    }

    fn run_chunk<R: RngCore + ?Sized>(
        &self,
        teams: &[TeamRecord],
        layout: &BracketLayout,
        rng: &mut R,
        len: u64,
    ) -> ChunkResult {
        let mut result = ChunkResult {
            counts: AdvancementCounts::for_field(teams),
            diagnostics: SimulationDiagnostics::default(),
            completed: 0,
            stopped: None,
        };

        for _ in 0..len {
            if let Err(err) = self.cancel.check() {
                result.stopped = Some(err);
                break;
            }
            run_once(teams, layout, rng, &mut result.counts, &mut result.diagnostics);
            result.completed += 1;
        }

        result
    }
}

/// Plays one full bracket and records advancement.
pub(crate) fn run_once<R: RngCore + ?Sized>(
    teams: &[TeamRecord],
    layout: &BracketLayout,
    rng: &mut R,
    counts: &mut AdvancementCounts,
    diagnostics: &mut SimulationDiagnostics,
) {
    let mut final_four = Vec::with_capacity(layout.regions.len());

    for region in &layout.regions {
        let mut survivors = region.slots.clone();
        for round in Round::REGIONAL {
            survivors = play_round(teams, &survivors, Some(round), rng, counts, diagnostics);
        }
        if let Some(&champion) = survivors.first() {
            final_four.push(champion);
        }
    }

    let mut national = play_round(teams, &final_four, Some(Round::F4), rng, counts, diagnostics);
    // Odd region count: the unpaired champion still reached the national stage
    if final_four.len() % 2 == 1 {
        if let Some(&bye) = national.last() {
            counts.increment(bye, Round::F4);
        }
    }

    // More than four regions leave extra national rounds with no counter
    while national.len() > 2 {
        national = play_round(teams, &national, None, rng, counts, diagnostics);
    }

    let champion = match national.as_slice() {
        [a, b] => Some(winner(teams, *a, *b, rng)),
        [only] => Some(*only),
        _ => {
            diagnostics.empty_finals += 1;
            None
        }
    };
    if let Some(slot) = champion {
        counts.increment(slot, Round::Championship);
        counts.increment(slot, Round::Champion);
    }
}

/// Pairs `survivors` by adjacency and returns the winners in order.
///
/// A trailing unpaired team advances without a draw and without a counter
/// increment (`run_once` credits the Final Four bye itself). `round = None`
/// plays the games without counting them.
pub(crate) fn play_round<R: RngCore + ?Sized>(
    teams: &[TeamRecord],
    survivors: &[usize],
    round: Option<Round>,
    rng: &mut R,
    counts: &mut AdvancementCounts,
    diagnostics: &mut SimulationDiagnostics,
) -> Vec<usize> {
    let mut next = Vec::with_capacity(survivors.len().div_ceil(2));
    for pair in survivors.chunks(2) {
        match *pair {
            [a, b] => {
                let w = winner(teams, a, b, rng);
                if let Some(round) = round {
                    counts.increment(w, round);
                }
                next.push(w);
            }
            [only] => {
                diagnostics.byes += 1;
                next.push(only);
            }
            _ => unreachable!("chunks(2) yields one or two elements"),
        }
    }
    next
}

fn winner<R: RngCore + ?Sized>(teams: &[TeamRecord], a: usize, b: usize, rng: &mut R) -> usize {
    match GameModel::resolve(&teams[a], &teams[b], rng) {
        Side::A => a,
        Side::B => b,
    }
}
