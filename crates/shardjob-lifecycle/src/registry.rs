//! HandlerRegistry - routes operations to the handler owning a job family.
//!
//! Several job families share one record store and one coordinator. Each
//! record remembers the family that created it, so removals, updates and
//! restores reach the same handler that registered the job.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use shardjob_core::{HandlerKind, JobInfo, JobStatus, ShardjobConfig};
use shardjob_scheduler::JobScheduler;
use shardjob_state::JobRecordStore;

use crate::error::{LifecycleError, LifecycleResult};
use crate::handler::{HandlerProfile, JobLifecycleHandler};
use crate::locks::NameLocks;

pub struct HandlerRegistry {
    handlers: BTreeMap<HandlerKind, Arc<JobLifecycleHandler>>,
    store: Arc<dyn JobRecordStore>,
}

impl HandlerRegistry {
    pub fn new(store: Arc<dyn JobRecordStore>) -> Self {
        Self {
            handlers: BTreeMap::new(),
            store,
        }
    }

    /// One handler per known family, sharing a single per-name guard so
    /// cross-family operations on the same logical job are serialized too.
    pub fn from_config(
        config: &ShardjobConfig,
        store: Arc<dyn JobRecordStore>,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Self {
        let locks = config.lifecycle.serialize_by_name.then(NameLocks::new);
        let mut registry = Self::new(store.clone());
        for kind in HandlerKind::ALL {
            let profile =
                HandlerProfile::new(kind).with_error_message_format(config.error_message_format(kind));
            let handler = JobLifecycleHandler::new(profile, store.clone(), scheduler.clone())
                .with_name_locks(locks.clone());
            registry.register(handler);
        }
        registry
    }

    /// Add (or replace) the handler for its family.
    pub fn register(&mut self, handler: JobLifecycleHandler) {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    pub fn kinds(&self) -> Vec<HandlerKind> {
        self.handlers.keys().copied().collect()
    }

    pub fn route(&self, kind: HandlerKind) -> LifecycleResult<Arc<JobLifecycleHandler>> {
        self.handlers
            .get(&kind)
            .cloned()
            .ok_or(LifecycleError::UnsupportedHandler(kind))
    }

    /// Handler that created a record; records without a stamp belong to `Simple`.
    pub fn route_record(&self, record: &JobInfo) -> LifecycleResult<Arc<JobLifecycleHandler>> {
        self.route(record.invoke_service_class.unwrap_or_default())
    }

    /// Handler owning a logical job: the READY record's family, else the
    /// latest record's family, else `Simple`.
    pub async fn route_name(&self, original_job_name: &str) -> LifecycleResult<Arc<JobLifecycleHandler>> {
        let records = self.store.find_by_original_name(original_job_name, None).await?;
        let owner = records
            .iter()
            .find(|r| r.status == JobStatus::Ready)
            .or_else(|| records.last());
        match owner {
            Some(record) => self.route_record(record),
            None => self.route(HandlerKind::default()),
        }
    }

    /// Records across all families, optionally filtered by status.
    pub async fn list_records(&self, status: Option<JobStatus>) -> LifecycleResult<Vec<JobInfo>> {
        Ok(self.store.list_by_status(status).await?)
    }

    /// Run startup restore on every handler. Returns the total registered.
    pub async fn restore_all(&self) -> LifecycleResult<usize> {
        let mut total = 0;
        for (kind, handler) in &self.handlers {
            let restored = handler.restore_ready_jobs().await?;
            if restored > 0 {
                info!(%kind, restored, "restored READY jobs");
            }
            total += restored;
        }
        Ok(total)
    }
}
