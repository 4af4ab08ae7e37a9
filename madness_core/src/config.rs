//! Configuration for the simulator and the full projection pipeline.

use crate::error::BracketError;
use crate::scoring::ScoreWeights;
use crate::seeding::RegionSet;
use serde::{Deserialize, Serialize};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent bracket simulations
    pub simulations: u64,

    /// Bracket regions, in pairing order for the national rounds
    pub regions: RegionSet,

    /// Simulations per work unit. Each unit owns one random stream, so this
    /// (not the thread count) decides which draws a given seed produces.
    pub chunk_size: u64,

    /// Fan chunks out over the rayon pool
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            regions: RegionSet::default(),
            chunk_size: 64,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn with_simulations(mut self, simulations: u64) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_regions(mut self, regions: RegionSet) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Checks the parameter contract of `simulate`.
    pub fn validate(&self) -> Result<(), BracketError> {
        if self.simulations < 1 {
            return Err(BracketError::invalid("simulation count must be at least 1"));
        }
        if self.chunk_size < 1 {
            return Err(BracketError::invalid("chunk size must be at least 1"));
        }
        Ok(())
    }
}

/// Configuration for the whole Scorer -> Seeder -> Simulator -> Aggregator chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectionConfig {
    pub weights: ScoreWeights,
    pub simulation: SimulationConfig,
}

impl ProjectionConfig {
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulations, 1000);
        assert_eq!(config.regions.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let config = SimulationConfig::default().with_simulations(0);
        assert!(matches!(config.validate(), Err(BracketError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let config = SimulationConfig::default().with_chunk_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ProjectionConfig =
            serde_json::from_str(r#"{"simulation": {"simulations": 250, "regions": ["A", "B"]}}"#).unwrap();

        assert_eq!(config.simulation.simulations, 250);
        assert_eq!(config.simulation.regions.len(), 2);
        assert_eq!(config.simulation.chunk_size, 64);
        assert_eq!(config.weights, ScoreWeights::default());
    }
}
