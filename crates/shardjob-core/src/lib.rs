//! shardjob-core - shared types for the shardjob workspace.
//!
//! Holds the job record model (`JobInfo`), the scheduler-facing job
//! specification (`JobConfiguration`), brief status views, and the small
//! parsers every other crate leans on: sharding item parameters, cron
//! expressions, and the `shardjob.toml` configuration file.

pub mod config;
pub mod error;
pub mod schedule;
pub mod sharding;
pub mod types;

pub use config::ShardjobConfig;
pub use error::{CoreError, CoreResult};
pub use schedule::{normalize_cron, parse_cron, validate_cron};
pub use sharding::parse_sharding_parameter;
pub use types::*;
