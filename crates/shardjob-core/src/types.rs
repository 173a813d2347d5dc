//! Job record and scheduler-facing types.
//!
//! A logical job (`original_job_name`) keeps its identity across renames;
//! each physical incarnation (`job_name`) is what the coordinator registers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::schedule::validate_cron;
use crate::sharding::parse_sharding_parameter;

/// Lifecycle status of a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Actively scheduled.
    #[default]
    Ready,
    /// Deactivated; kept as history.
    Over,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Ready => "READY",
            JobStatus::Over => "OVER",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "READY" => Ok(JobStatus::Ready),
            "OVER" => Ok(JobStatus::Over),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Job family that owns a record.
///
/// Several families share one record store; the kind stamped on each record
/// routes later operations back to the handler that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    #[default]
    Simple,
    Dataflow,
    Script,
    Http,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 4] = [
        HandlerKind::Simple,
        HandlerKind::Dataflow,
        HandlerKind::Script,
        HandlerKind::Http,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Simple => "simple",
            HandlerKind::Dataflow => "dataflow",
            HandlerKind::Script => "script",
            HandlerKind::Http => "http",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownHandlerKind(s.to_string()))
    }
}

// ── Job record ─────────────────────────────────────────────────────

/// A job specification as supplied by callers and persisted as a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobInfo {
    /// Assigned by the record store on insert.
    #[serde(default)]
    pub record_id: Option<u64>,
    /// Stable logical identity across renames.
    pub original_job_name: String,
    /// Physical name registered with the coordinator.
    pub job_name: String,
    pub cron: String,
    pub sharding_total_count: u32,
    /// `index=value` list, e.g. `0=a,1=b`.
    #[serde(default)]
    pub sharding_parameter: Option<String>,
    /// Opaque parameter handed to executors.
    #[serde(default)]
    pub job_parameter: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    /// Handler family that created this record.
    #[serde(default)]
    pub invoke_service_class: Option<HandlerKind>,
    /// Unix timestamp (seconds) when the record was inserted.
    #[serde(default)]
    pub created_at: u64,
    /// Unix timestamp (seconds) of the last status change.
    #[serde(default)]
    pub updated_at: u64,
}

impl JobInfo {
    /// Minimal record for a logical/physical name pair.
    pub fn new(original_job_name: &str, job_name: &str, cron: &str, sharding_total_count: u32) -> Self {
        Self {
            record_id: None,
            original_job_name: original_job_name.to_string(),
            job_name: job_name.to_string(),
            cron: cron.to_string(),
            sharding_total_count,
            sharding_parameter: None,
            job_parameter: None,
            status: JobStatus::Ready,
            invoke_service_class: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn with_sharding_parameter(mut self, parameter: &str) -> Self {
        self.sharding_parameter = Some(parameter.to_string());
        self
    }

    pub fn with_job_parameter(mut self, parameter: &str) -> Self {
        self.job_parameter = Some(parameter.to_string());
        self
    }

    pub fn is_ready(&self) -> bool {
        self.status == JobStatus::Ready
    }

    /// Check required fields, shard count, cron, and sharding parameters.
    pub fn validate(&self) -> CoreResult<()> {
        if self.original_job_name.trim().is_empty() {
            return Err(CoreError::MissingField("original_job_name"));
        }
        if self.job_name.trim().is_empty() {
            return Err(CoreError::MissingField("job_name"));
        }
        if self.sharding_total_count == 0 {
            return Err(CoreError::InvalidShardCount(self.sharding_total_count));
        }
        validate_cron(&self.cron)?;
        if let Some(parameter) = &self.sharding_parameter {
            parse_sharding_parameter(parameter, self.sharding_total_count)?;
        }
        Ok(())
    }

    /// Build the coordinator specification for this record. Failover is always on.
    pub fn to_configuration(&self) -> CoreResult<JobConfiguration> {
        self.validate()?;
        let sharding_item_parameters = match &self.sharding_parameter {
            Some(parameter) => parse_sharding_parameter(parameter, self.sharding_total_count)?,
            None => BTreeMap::new(),
        };
        Ok(JobConfiguration {
            job_name: self.job_name.clone(),
            sharding_total_count: self.sharding_total_count,
            cron: self.cron.clone(),
            job_parameter: self.job_parameter.clone(),
            sharding_item_parameters,
            failover: true,
            disabled: false,
        })
    }
}

// ── Coordinator views ──────────────────────────────────────────────

/// Specification registered with (and reported back by) the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfiguration {
    pub job_name: String,
    pub sharding_total_count: u32,
    pub cron: String,
    pub job_parameter: Option<String>,
    pub sharding_item_parameters: BTreeMap<u32, String>,
    pub failover: bool,
    pub disabled: bool,
}

/// Coarse run state reported by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BriefStatus {
    Ok,
    Disabled,
    Crashed,
}

/// Summary of a live registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobBriefInfo {
    pub job_name: String,
    pub status: BriefStatus,
    pub cron: String,
    pub sharding_total_count: u32,
    /// Number of executor instances serving the job.
    pub instance_count: u32,
    /// RFC 3339 timestamp of the next trigger, if any.
    pub next_fire_time: Option<String>,
}
