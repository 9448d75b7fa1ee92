use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::types::{Job, JobResult, SimError};
use super::worker::WorkerHandle;
use crate::attempt::SideSetup;
use crate::combat::CombatSetup;
use crate::dice::FaceTable;
use crate::simulator::{run_analysis, run_combat, AnalysisReport, CombatReport, SimConfig};

/// Where simulations actually run.
#[derive(Debug)]
pub enum Backend {
    InProcess,
    Worker(WorkerHandle),
}

/// Single entry point for running simulations, in-process or on a worker
/// thread. Worker failures fall back to running in the caller's thread.
#[derive(Debug)]
pub struct SimulationService {
    faces: Arc<FaceTable>,
    backend: Backend,
}

impl SimulationService {
    pub fn in_process(faces: FaceTable) -> Self {
        Self {
            faces: Arc::new(faces),
            backend: Backend::InProcess,
        }
    }

    /// Starts a worker thread, or runs in-process if it cannot be started.
    pub fn offloaded(faces: FaceTable) -> Self {
        let faces = Arc::new(faces);
        let backend = match WorkerHandle::spawn(Arc::clone(&faces)) {
            Ok(handle) => Backend::Worker(handle),
            Err(e) => {
                warn!(error = %e, "falling back to in-process simulation");
                Backend::InProcess
            }
        };
        Self { faces, backend }
    }

    pub fn with_backend(faces: Arc<FaceTable>, backend: Backend) -> Self {
        Self { faces, backend }
    }

    /// Loads the face table from `path`. An invalid table is fatal; nothing
    /// may run against it.
    pub fn load<P: AsRef<Path>>(path: P, offload: bool) -> Result<Self, SimError> {
        let faces = FaceTable::load(path)?;
        Ok(if offload {
            Self::offloaded(faces)
        } else {
            Self::in_process(faces)
        })
    }

    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    pub fn is_offloaded(&self) -> bool {
        matches!(self.backend, Backend::Worker(_))
    }

    pub async fn run_analysis(&self, side: &SideSetup, config: &SimConfig) -> AnalysisReport {
        let Backend::Worker(worker) = &self.backend else {
            return run_analysis(side, &self.faces, config);
        };

        let seed = config.seed.unwrap_or_else(rand::random);
        let job = Job::Analysis {
            side: side.clone(),
            trials: config.effective_trials(),
        };
        match offload(worker, seed, job).await {
            Ok(JobResult::Analysis(report)) => report,
            outcome => {
                warn_fallback(&outcome);
                run_analysis(side, &self.faces, &config.clone().with_seed(Some(seed)))
            }
        }
    }

    pub async fn run_combat(&self, setup: &CombatSetup, config: &SimConfig) -> CombatReport {
        let Backend::Worker(worker) = &self.backend else {
            return run_combat(setup, &self.faces, config);
        };

        let seed = config.seed.unwrap_or_else(rand::random);
        let job = Job::Combat {
            setup: setup.clone(),
            trials: config.effective_trials(),
        };
        match offload(worker, seed, job).await {
            Ok(JobResult::Combat(report)) => report,
            outcome => {
                warn_fallback(&outcome);
                run_combat(setup, &self.faces, &config.clone().with_seed(Some(seed)))
            }
        }
    }
}

async fn offload(worker: &WorkerHandle, seed: u64, job: Job) -> Result<JobResult, SimError> {
    info!(seed, "offloading simulation");
    let reply = worker.submit(seed, job)?;
    reply.await.map_err(|_| SimError::WorkerDisconnected)
}

fn warn_fallback(outcome: &Result<JobResult, SimError>) {
    match outcome {
        Err(e) => warn!(error = %e, "worker failed, running in-process"),
        Ok(_) => warn!("worker returned the wrong result kind, running in-process"),
    }
}
