//! Error types for job model validation and parsing.

use thiserror::Error;

/// Result type alias for core parsing and validation.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("sharding total count must be at least 1, got {0}")]
    InvalidShardCount(u32),

    #[error("invalid sharding parameter '{input}': {reason}")]
    InvalidShardingParameter { input: String, reason: String },

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("unknown job status: {0}")]
    InvalidStatus(String),

    #[error("unknown handler kind: {0}")]
    UnknownHandlerKind(String),
}
