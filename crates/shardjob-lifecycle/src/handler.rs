//! JobLifecycleHandler - orchestrates create / update / remove / query.
//!
//! Every mutating operation follows the same shape: consult the record
//! store to pick an action, issue coordinator commands, then write the
//! resulting state back to the store. Failures are logged with the job
//! name and returned unchanged; nothing is retried and no partial
//! store/coordinator divergence is repaired here.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use shardjob_core::{HandlerKind, JobBriefInfo, JobConfiguration, JobInfo, JobStatus};
use shardjob_scheduler::{JobScheduler, SchedulerError};
use shardjob_state::JobRecordStore;

use crate::error::{LifecycleError, LifecycleResult};
use crate::locks::{NameGuard, NameLocks};

/// Identity of a handler: the job family it owns and its failure template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerProfile {
    pub kind: HandlerKind,
    /// Prefix for failure logs. `{job}` is replaced with the physical job name.
    pub error_message_format: String,
}

impl HandlerProfile {
    pub fn new(kind: HandlerKind) -> Self {
        Self {
            kind,
            error_message_format: format!("{kind} job handler failed for [{{job}}]"),
        }
    }

    pub fn with_error_message_format(mut self, format: impl Into<String>) -> Self {
        self.error_message_format = format.into();
        self
    }

    /// Render the failure template for a job.
    pub fn failure_message(&self, job_name: &str) -> String {
        self.error_message_format.replace("{job}", job_name)
    }
}

/// Keeps job records and coordinator registrations consistent.
///
/// Stateless apart from the optional per-name guard; clone the `Arc`s it
/// holds to share one store and coordinator between handlers.
pub struct JobLifecycleHandler {
    profile: HandlerProfile,
    store: Arc<dyn JobRecordStore>,
    scheduler: Arc<dyn JobScheduler>,
    locks: Option<NameLocks>,
}

impl JobLifecycleHandler {
    /// Create a handler. Same-name operations are serialized in-process by default.
    pub fn new(
        profile: HandlerProfile,
        store: Arc<dyn JobRecordStore>,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Self {
        Self {
            profile,
            store,
            scheduler,
            locks: Some(NameLocks::new()),
        }
    }

    /// Share a guard between handlers, or pass `None` to run unguarded.
    pub fn with_name_locks(mut self, locks: Option<NameLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn kind(&self) -> HandlerKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &HandlerProfile {
        &self.profile
    }

    // ── Create ─────────────────────────────────────────────────────

    /// Register a new logical job and record it as READY.
    ///
    /// Fails with `DuplicateJob` if a READY record already exists for the
    /// logical name; the coordinator is not touched in that case.
    pub async fn create_job(&self, job: JobInfo) -> LifecycleResult<()> {
        require_name(&job.original_job_name, "original job name to create")?;
        let _guard = self.guard(&job.original_job_name).await;
        self.create_locked(job).await
    }

    async fn create_locked(&self, job: JobInfo) -> LifecycleResult<()> {
        debug!(job = %to_json(&job), "creating job");
        let job_name = job.job_name.clone();
        let result = self.try_create(job).await;
        if let Err(e) = &result {
            error!(%job_name, "{}-{}", self.profile.failure_message(&job_name), e);
        }
        result
    }

    async fn try_create(&self, mut job: JobInfo) -> LifecycleResult<()> {
        job.validate()?;
        let existing = self
            .store
            .find_by_original_name(&job.original_job_name, Some(JobStatus::Ready))
            .await?;
        if !existing.is_empty() {
            return Err(LifecycleError::DuplicateJob(job.original_job_name));
        }

        let config = job.to_configuration()?;
        self.scheduler.register(&config).await?;

        job.record_id = None;
        job.status = JobStatus::Ready;
        job.invoke_service_class = Some(self.profile.kind);
        job.created_at = 0;
        job.updated_at = 0;
        let record_id = self.store.insert(&job).await?;
        info!(
            original_job_name = %job.original_job_name,
            job_name = %job.job_name,
            record_id,
            kind = %self.profile.kind,
            "job created"
        );
        Ok(())
    }

    // ── Remove ─────────────────────────────────────────────────────

    /// Disable and remove the live incarnation, then mark its record OVER.
    ///
    /// Removing a logical job with no READY record is a logged no-op.
    pub async fn remove_job(&self, original_job_name: &str) -> LifecycleResult<()> {
        require_name(original_job_name, "original job name to remove")?;
        let _guard = self.guard(original_job_name).await;
        self.remove_locked(original_job_name).await
    }

    async fn remove_locked(&self, original_job_name: &str) -> LifecycleResult<()> {
        debug!(%original_job_name, "removing job");
        let ready = self
            .store
            .find_by_original_name(original_job_name, Some(JobStatus::Ready))
            .await?;
        if ready.len() > 1 {
            warn!(
                %original_job_name,
                count = ready.len(),
                "multiple READY records for one logical job, retiring the oldest"
            );
        }
        let Some(existing) = ready.into_iter().next() else {
            debug!(%original_job_name, "job to remove no longer exists");
            return Ok(());
        };
        self.retire(existing).await
    }

    /// Tear down one incarnation: disable, remove, then mark the record OVER.
    async fn retire(&self, record: JobInfo) -> LifecycleResult<()> {
        let job_name = record.job_name.clone();
        let result = self.try_retire(record).await;
        if let Err(e) = &result {
            error!(%job_name, error = %e, "failed to retire job");
        }
        result
    }

    async fn try_retire(&self, mut record: JobInfo) -> LifecycleResult<()> {
        // Disable first so shutdown never races an in-flight trigger.
        self.scheduler.disable(&record.job_name).await?;
        self.scheduler.remove(&record.job_name).await?;
        record.status = JobStatus::Over;
        self.store.update(&record).await?;
        info!(
            original_job_name = %record.original_job_name,
            job_name = %record.job_name,
            "job retired"
        );
        Ok(())
    }

    // ── Update ─────────────────────────────────────────────────────

    /// Replace a logical job with a new specification.
    ///
    /// With no READY record this is `create_job`. Otherwise every READY
    /// incarnation is retired and the new one created; neither the old
    /// record nor the old registration is ever patched in place.
    pub async fn update_job(&self, job: JobInfo) -> LifecycleResult<()> {
        require_name(&job.original_job_name, "original job name to update")?;
        let _guard = self.guard(&job.original_job_name).await;
        debug!(job = %to_json(&job), "updating job");
        let job_name = job.job_name.clone();
        let result = self.try_update(job).await;
        if let Err(e) = &result {
            error!(%job_name, error = %e, "update of job [{job_name}] failed");
        }
        result
    }

    async fn try_update(&self, job: JobInfo) -> LifecycleResult<()> {
        // Reject a bad replacement before tearing anything down.
        job.validate()?;
        let ready = self
            .store
            .find_by_original_name(&job.original_job_name, Some(JobStatus::Ready))
            .await?;
        if ready.len() > 1 {
            warn!(
                original_job_name = %job.original_job_name,
                count = ready.len(),
                "multiple READY records for one logical job, retiring all before create"
            );
        }
        for existing in ready {
            self.retire(existing).await?;
        }
        self.create_locked(job).await
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Live configurations for every incarnation of a logical job.
    ///
    /// Records without a live registration are dropped. Returns `None` when
    /// the coordinator reports the target as not found.
    pub async fn get_job(
        &self,
        original_job_name: &str,
    ) -> LifecycleResult<Option<Vec<JobConfiguration>>> {
        require_name(original_job_name, "original job name to query")?;
        debug!(%original_job_name, "fetching job configurations");
        let records = self.store.find_by_original_name(original_job_name, None).await?;
        let mut configs = Vec::new();
        for job_name in physical_names(&records) {
            match self.scheduler.get_configuration(job_name).await {
                Ok(Some(config)) => configs.push(config),
                Ok(None) => {}
                Err(SchedulerError::NotFound(reason)) => {
                    error!(%original_job_name, %job_name, %reason, "job to fetch does not exist");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(configs))
    }

    /// Live brief status for every incarnation of a logical job.
    pub async fn get_job_brief_info(
        &self,
        original_job_name: &str,
    ) -> LifecycleResult<Vec<JobBriefInfo>> {
        require_name(original_job_name, "original job name to query")?;
        debug!(%original_job_name, "fetching job brief info");
        let records = self.store.find_by_original_name(original_job_name, None).await?;
        let mut briefs = Vec::new();
        for job_name in physical_names(&records) {
            match self.scheduler.get_brief_info(job_name).await {
                Ok(Some(brief)) => briefs.push(brief),
                Ok(None) | Err(SchedulerError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(briefs)
    }

    // ── Bootstrap ──────────────────────────────────────────────────

    /// Re-register READY records owned by this handler that the coordinator
    /// does not know about. Returns how many were registered.
    ///
    /// Only the newest READY record of each logical job is considered, so
    /// duplicates left by a create race never come back as two live jobs.
    /// A record that cannot be checked or registered is logged and skipped.
    pub async fn restore_ready_jobs(&self) -> LifecycleResult<usize> {
        let ready = self.store.list_by_status(Some(JobStatus::Ready)).await?;
        let mut newest: BTreeMap<&str, (&JobInfo, usize)> = BTreeMap::new();
        for record in &ready {
            let entry = newest
                .entry(record.original_job_name.as_str())
                .or_insert((record, 0));
            entry.1 += 1;
            if record.record_id > entry.0.record_id {
                entry.0 = record;
            }
        }

        let mut restored = 0;
        for (original_job_name, (record, count)) in newest {
            if record.invoke_service_class.unwrap_or_default() != self.profile.kind {
                continue;
            }
            let job_name = &record.job_name;
            if count > 1 {
                warn!(
                    %original_job_name,
                    count,
                    %job_name,
                    "multiple READY records for one logical job, restoring the newest only"
                );
            }
            match self.try_restore(record).await {
                Ok(true) => {
                    restored += 1;
                    info!(%original_job_name, %job_name, "job restored");
                }
                Ok(false) => debug!(%job_name, "job already live, skipping restore"),
                Err(e) => {
                    error!(%job_name, "{}-{}", self.profile.failure_message(job_name), e);
                }
            }
        }
        Ok(restored)
    }

    /// Register one record unless it is already live. Returns whether it was registered.
    async fn try_restore(&self, record: &JobInfo) -> LifecycleResult<bool> {
        if self.scheduler.get_configuration(&record.job_name).await?.is_some() {
            return Ok(false);
        }
        let config = record.to_configuration()?;
        self.scheduler.register(&config).await?;
        Ok(true)
    }

    async fn guard(&self, original_job_name: &str) -> Option<NameGuard> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(original_job_name).await),
            None => None,
        }
    }
}

fn require_name(name: &str, what: &str) -> LifecycleResult<()> {
    if name.trim().is_empty() {
        return Err(LifecycleError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Physical names in record order, each once.
fn physical_names(records: &[JobInfo]) -> Vec<&str> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.job_name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

fn to_json(job: &JobInfo) -> String {
    serde_json::to_string(job).unwrap_or_else(|_| job.job_name.clone())
}
