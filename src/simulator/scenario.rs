//! Scenario files: an analysis or combat request in YAML or JSON.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::SimConfig;
use crate::attempt::SideSetup;
use crate::combat::CombatSetup;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Single-pool analysis request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScenario {
    #[serde(flatten)]
    pub side: SideSetup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Attacker-versus-defender request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatScenario {
    #[serde(flatten)]
    pub setup: CombatSetup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Overlays a scenario's own trial count and seed on `base`.
fn overlay(base: &SimConfig, trials: Option<u32>, seed: Option<u64>) -> SimConfig {
    SimConfig {
        trials: trials.unwrap_or(base.trials),
        seed: seed.or(base.seed),
        ..base.clone()
    }
}

impl AnalysisScenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        load(path)
    }

    pub fn config(&self, base: &SimConfig) -> SimConfig {
        overlay(base, self.trials, self.seed)
    }
}

impl CombatScenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        load(path)
    }

    pub fn config(&self, base: &SimConfig) -> SimConfig {
        overlay(base, self.trials, self.seed)
    }
}

/// Reads a scenario, picking the format from the extension (`.json`, else YAML).
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ScenarioError> {
    let content = fs::read_to_string(&path)?;
    let is_json = path
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
