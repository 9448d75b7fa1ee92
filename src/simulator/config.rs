//! Simulation configuration.

use crate::core::constants::{DEFAULT_TRIALS, MIN_TRIALS};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of Monte Carlo trials
    pub trials: u32,

    /// Random seed for reproducibility (None = thread RNG)
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Quick config for smoke checks
    pub fn quick() -> Self {
        Self {
            trials: 1_000,
            ..Default::default()
        }
    }

    /// High trial count for tight distributions
    pub fn precise() -> Self {
        Self {
            trials: 100_000,
            ..Default::default()
        }
    }

    /// Reproducible run with the default trial count
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Trial count with the lower bound applied.
    pub fn effective_trials(&self) -> u32 {
        self.trials.max(MIN_TRIALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.trials, 10_000);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_zero_trials_clamped() {
        assert_eq!(SimConfig::default().with_trials(0).effective_trials(), 1);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SimConfig::quick().trials, 1_000);
        assert_eq!(SimConfig::seeded(7).seed, Some(7));
        assert_eq!(SimConfig::precise().with_seed(Some(1)).seed, Some(1));
    }
}
