//! The record store contract required by the lifecycle handler.

use async_trait::async_trait;

use shardjob_core::{JobInfo, JobStatus};

use crate::error::StateResult;

/// Durable store of job records, queryable by logical name and status.
#[async_trait]
pub trait JobRecordStore: Send + Sync {
    /// Records for a logical job in insertion order, optionally filtered by status.
    async fn find_by_original_name(
        &self,
        original_job_name: &str,
        status: Option<JobStatus>,
    ) -> StateResult<Vec<JobInfo>>;

    /// Persist a new record. Returns the assigned record id.
    async fn insert(&self, job: &JobInfo) -> StateResult<u64>;

    /// Overwrite an existing record, addressed by its record id.
    async fn update(&self, job: &JobInfo) -> StateResult<()>;

    /// All records, optionally filtered by status.
    async fn list_by_status(&self, status: Option<JobStatus>) -> StateResult<Vec<JobInfo>>;
}
