//! Async simulation entry point with an optional worker thread.

mod service;
mod types;
mod worker;

pub use service::{Backend, SimulationService};
pub use types::{Job, JobResult, SimError, WorkerRequest, WorkerResponse};
pub use worker::{execute, WorkerHandle};
