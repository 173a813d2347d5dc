//! Lifecycle error types.

use thiserror::Error;

use shardjob_core::{CoreError, HandlerKind};
use shardjob_scheduler::SchedulerError;
use shardjob_state::StateError;

/// Errors surfaced by lifecycle operations.
///
/// Coordinator and store failures are wrapped transparently and returned
/// unchanged after being logged.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("job already exists: {0}")]
    DuplicateJob(String),

    #[error("invalid job specification: {0}")]
    InvalidJob(#[from] CoreError),

    #[error("no handler registered for {0} jobs")]
    UnsupportedHandler(HandlerKind),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    State(#[from] StateError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
