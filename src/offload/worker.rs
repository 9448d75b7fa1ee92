//! Background worker thread running simulation jobs.
//!
//! Requests travel over an unbounded channel to the worker thread; responses
//! come back on a second channel drained by a router thread, which completes
//! the oneshot registered under the request's id. A job that panics, or a
//! worker that stops, drops the waiting oneshots so callers see an error.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::types::{Job, JobResult, SimError, WorkerRequest, WorkerResponse};
use crate::dice::FaceTable;
use crate::simulator::{run_analysis, run_combat, SimConfig};

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<JobResult>>>>;
type Executor = fn(&FaceTable, u64, &Job) -> JobResult;

/// Runs one job against `faces` with a fixed seed.
pub fn execute(faces: &FaceTable, seed: u64, job: &Job) -> JobResult {
    match job {
        Job::Analysis { side, trials } => {
            let config = SimConfig::seeded(seed).with_trials(*trials);
            JobResult::Analysis(run_analysis(side, faces, &config))
        }
        Job::Combat { setup, trials } => {
            let config = SimConfig::seeded(seed).with_trials(*trials);
            JobResult::Combat(run_combat(setup, faces, &config))
        }
    }
}

/// Worker side of the request channel. Dropping it closes the channel first,
/// then fails every job still waiting, so no submit can slip in between.
struct JobQueue {
    requests: mpsc::UnboundedReceiver<WorkerRequest>,
    pending: Pending,
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        self.requests.close();
        fail_pending(&self.pending);
    }
}

pub struct WorkerHandle {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    pending: Pending,
    next_id: AtomicU64,
}

impl WorkerHandle {
    /// Starts the worker and router threads. Dropping the handle closes the
    /// request channel, which stops both.
    pub fn spawn(faces: Arc<FaceTable>) -> Result<Self, SimError> {
        Self::spawn_with(faces, execute)
    }

    fn spawn_with(faces: Arc<FaceTable>, run: Executor) -> Result<Self, SimError> {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<WorkerRequest>();
        let (response_tx, mut response_rx) = mpsc::unbounded_channel::<WorkerResponse>();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        let mut queue = JobQueue {
            requests: request_rx,
            pending: Arc::clone(&pending),
        };
        thread::Builder::new()
            .name("dicepool-worker".to_string())
            .spawn(move || {
                info!("simulation worker started");
                while let Some(request) = queue.requests.blocking_recv() {
                    debug!(id = request.id, seed = request.seed, "worker running job");
                    match panic::catch_unwind(AssertUnwindSafe(|| run(&faces, request.seed, &request.job))) {
                        Ok(result) => {
                            if response_tx.send(WorkerResponse { id: request.id, result }).is_err() {
                                break;
                            }
                        }
                        Err(_) => {
                            warn!(id = request.id, "simulation job panicked");
                            lock(&queue.pending).remove(&request.id);
                        }
                    }
                }
                info!("simulation worker stopped");
            })
            .map_err(SimError::WorkerUnavailable)?;

        let router_pending = Arc::clone(&pending);
        thread::Builder::new()
            .name("dicepool-router".to_string())
            .spawn(move || {
                while let Some(response) = response_rx.blocking_recv() {
                    let waiter = lock(&router_pending).remove(&response.id);
                    match waiter {
                        Some(tx) => {
                            // Receiver may have given up; nothing to do then
                            let _ = tx.send(response.result);
                        }
                        None => warn!(id = response.id, "response for unknown request"),
                    }
                }
                fail_pending(&router_pending);
            })
            .map_err(SimError::WorkerUnavailable)?;

        Ok(Self {
            requests: request_tx,
            pending,
            next_id: AtomicU64::new(1),
        })
    }

    /// Queues a job and returns the receiver its result will arrive on.
    pub fn submit(&self, seed: u64, job: Job) -> Result<oneshot::Receiver<JobResult>, SimError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(id, tx);

        if self.requests.send(WorkerRequest { id, seed, job }).is_err() {
            lock(&self.pending).remove(&id);
            return Err(SimError::WorkerDisconnected);
        }
        Ok(rx)
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Worker whose jobs run through `run` instead of `execute`.
    #[cfg(test)]
    pub(crate) fn with_executor(faces: Arc<FaceTable>, run: Executor) -> Result<Self, SimError> {
        Self::spawn_with(faces, run)
    }

    /// A handle whose worker is already gone; every submit fails.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (requests, _) = mpsc::unbounded_channel();
        Self {
            requests,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("in_flight", &self.in_flight())
            .field("closed", &self.requests.is_closed())
            .finish()
    }
}

/// Drops every waiting oneshot; their receivers resolve to an error.
fn fail_pending(pending: &Pending) {
    let dropped = lock(pending).drain().count();
    if dropped > 0 {
        warn!(dropped, "worker stopped with jobs in flight");
    }
}

/// Pending-map lock that survives a poisoned mutex.
fn lock(pending: &Pending) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<JobResult>>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
