//! Coordinator contract.

use async_trait::async_trait;

use shardjob_core::{JobBriefInfo, JobConfiguration};

use crate::error::SchedulerResult;

/// Operations the lifecycle layer issues against the coordination layer.
///
/// All calls are treated as blocking round-trips to shared, cluster-wide
/// state; implementations own their own timeouts and retries.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Persist the specification in the coordination layer and start scheduling it.
    async fn register(&self, config: &JobConfiguration) -> SchedulerResult<()>;

    /// Stop triggering a job without dropping its registration.
    async fn disable(&self, job_name: &str) -> SchedulerResult<()>;

    /// Drop a job's registration entirely.
    async fn remove(&self, job_name: &str) -> SchedulerResult<()>;

    /// Live configuration, or `None` when nothing is registered under the name.
    async fn get_configuration(&self, job_name: &str) -> SchedulerResult<Option<JobConfiguration>>;

    /// Live brief status, or `None` when nothing is registered under the name.
    async fn get_brief_info(&self, job_name: &str) -> SchedulerResult<Option<JobBriefInfo>>;
}
