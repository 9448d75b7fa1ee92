//! Monte Carlo simulator for dice pools.
//!
//! Runs thousands of simulated rolls to estimate:
//! - Per-symbol outcome distributions (filled, hollow, combined)
//! - Joint Hit x Special and Block x Special distributions
//! - Expectation and spread of filled symbols
//! - Wound distributions and win rates between two pools

mod config;
mod distribution;
mod report;
mod runner;
mod scenario;

pub use config::SimConfig;
pub use distribution::{Distribution, Histogram, JointCell, JointDistribution, JointHistogram, Moments, SymbolStats};
pub use report::{AnalysisReport, CombatReport, Expectation, FamilyDistributions, JointVariants, RerollStats};
pub use runner::{run_analysis, run_analysis_with_rng, run_combat, run_combat_with_rng};
pub use scenario::{load as load_scenario, AnalysisScenario, CombatScenario, ScenarioError};
