//! LocalCoordinator - in-process coordinator registry.
//!
//! Holds one registration per physical job name. A registration carries the
//! submitted specification, its parsed cron schedule, and an enabled flag.
//! Registering a name that is already present is rejected; disabling and
//! removing unknown names are no-ops so teardown can be replayed safely.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use tokio::sync::RwLock;
use tracing::{debug, info};

use async_trait::async_trait;
use shardjob_core::{BriefStatus, JobBriefInfo, JobConfiguration, parse_cron};

use crate::error::{SchedulerError, SchedulerResult};
use crate::job_scheduler::JobScheduler;

/// Per-job registration held in memory.
struct Registration {
    /// The registered specification; `disabled` tracks the live flag.
    config: JobConfiguration,
    /// Parsed trigger schedule.
    schedule: Schedule,
}

impl Registration {
    fn brief(&self, instance_count: u32) -> JobBriefInfo {
        let (status, next_fire_time) = if self.config.disabled {
            (BriefStatus::Disabled, None)
        } else {
            let next = self.schedule.upcoming(Utc).next().map(|t| t.to_rfc3339());
            (BriefStatus::Ok, next)
        };
        JobBriefInfo {
            job_name: self.config.job_name.clone(),
            status,
            cron: self.config.cron.clone(),
            sharding_total_count: self.config.sharding_total_count,
            instance_count,
            next_fire_time,
        }
    }
}

/// In-process coordinator keyed by physical job name.
#[derive(Clone)]
pub struct LocalCoordinator {
    registrations: Arc<RwLock<HashMap<String, Registration>>>,
    /// Executor instances this coordinator reports per job.
    instance_count: u32,
}

impl Default for LocalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCoordinator {
    /// Create an empty coordinator with a single executor instance.
    pub fn new() -> Self {
        Self::with_instance_count(1)
    }

    pub fn with_instance_count(instance_count: u32) -> Self {
        Self {
            registrations: Arc::new(RwLock::new(HashMap::new())),
            instance_count,
        }
    }

    /// Names of all registered jobs, sorted.
    pub async fn registered_jobs(&self) -> Vec<String> {
        let registrations = self.registrations.read().await;
        let mut names: Vec<String> = registrations.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_registered(&self, job_name: &str) -> bool {
        self.registrations.read().await.contains_key(job_name)
    }

    /// Whether a job is registered and currently triggering.
    pub async fn is_enabled(&self, job_name: &str) -> bool {
        self.registrations
            .read()
            .await
            .get(job_name)
            .is_some_and(|r| !r.config.disabled)
    }

    fn check(config: &JobConfiguration) -> SchedulerResult<Schedule> {
        if config.job_name.trim().is_empty() {
            return Err(SchedulerError::InvalidConfiguration(
                "job name must not be empty".to_string(),
            ));
        }
        if config.sharding_total_count == 0 {
            return Err(SchedulerError::InvalidConfiguration(format!(
                "job {} must have at least one shard",
                config.job_name
            )));
        }
        if let Some(index) = config
            .sharding_item_parameters
            .keys()
            .find(|&&index| index >= config.sharding_total_count)
        {
            return Err(SchedulerError::InvalidConfiguration(format!(
                "job {} has a parameter for shard {index} but only {} shards",
                config.job_name, config.sharding_total_count
            )));
        }
        parse_cron(&config.cron).map_err(|e| SchedulerError::InvalidCron {
            job: config.job_name.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl JobScheduler for LocalCoordinator {
    async fn register(&self, config: &JobConfiguration) -> SchedulerResult<()> {
        let schedule = Self::check(config)?;
        let mut registrations = self.registrations.write().await;
        if registrations.contains_key(&config.job_name) {
            return Err(SchedulerError::AlreadyRegistered(config.job_name.clone()));
        }
        let mut config = config.clone();
        config.disabled = false;
        let job_name = config.job_name.clone();
        registrations.insert(job_name.clone(), Registration { config, schedule });
        info!(%job_name, "job registered with coordinator");
        Ok(())
    }

    async fn disable(&self, job_name: &str) -> SchedulerResult<()> {
        let mut registrations = self.registrations.write().await;
        match registrations.get_mut(job_name) {
            Some(registration) => {
                registration.config.disabled = true;
                info!(%job_name, "job disabled");
            }
            None => debug!(%job_name, "job not registered, nothing to disable"),
        }
        Ok(())
    }

    async fn remove(&self, job_name: &str) -> SchedulerResult<()> {
        let removed = self.registrations.write().await.remove(job_name);
        match removed {
            Some(_) => info!(%job_name, "job removed from coordinator"),
            None => debug!(%job_name, "job not registered, nothing to remove"),
        }
        Ok(())
    }

    async fn get_configuration(&self, job_name: &str) -> SchedulerResult<Option<JobConfiguration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.get(job_name).map(|r| r.config.clone()))
    }

    async fn get_brief_info(&self, job_name: &str) -> SchedulerResult<Option<JobBriefInfo>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .get(job_name)
            .map(|r| r.brief(self.instance_count)))
    }
}
