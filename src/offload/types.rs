use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attempt::SideSetup;
use crate::combat::CombatSetup;
use crate::dice::FaceTableError;
use crate::simulator::{AnalysisReport, CombatReport};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    FaceTable(#[from] FaceTableError),
    #[error("simulation worker could not be started: {0}")]
    WorkerUnavailable(#[source] std::io::Error),
    #[error("simulation worker disconnected")]
    WorkerDisconnected,
}

/// Work a worker can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Job {
    Analysis { side: SideSetup, trials: u32 },
    Combat { setup: CombatSetup, trials: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: u64,
    /// Always present; unseeded callers get a fresh seed before sending.
    pub seed: u64,
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JobResult {
    Analysis(AnalysisReport),
    Combat(CombatReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id: u64,
    pub result: JobResult,
}
