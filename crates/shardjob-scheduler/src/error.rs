//! Scheduler error types.

use thiserror::Error;

/// Errors raised by a coordinator.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job already registered: {0}")]
    AlreadyRegistered(String),

    #[error("invalid cron expression for job {job}: {reason}")]
    InvalidCron { job: String, reason: String },

    #[error("invalid job configuration: {0}")]
    InvalidConfiguration(String),

    #[error("coordinator error: {0}")]
    Coordinator(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
