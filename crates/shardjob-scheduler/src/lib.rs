//! shardjob-scheduler - the coordination layer seen from the lifecycle handler.
//!
//! The distributed coordinator that actually runs sharded jobs on worker
//! nodes is an external collaborator. This crate pins down the contract the
//! lifecycle layer needs from it ([`JobScheduler`]) and ships an in-process
//! registry ([`LocalCoordinator`]) that honours the same contract for
//! standalone deployments and tests.
//!
//! # Architecture
//!
//! ```text
//! JobLifecycleHandler
//!   └── dyn JobScheduler
//!         ├── register(JobConfiguration)   persist config + start scheduling
//!         ├── disable(job_name)            stop triggering, keep registration
//!         ├── remove(job_name)             drop registration entirely
//!         └── get_configuration / get_brief_info
//! ```

pub mod coordinator;
pub mod error;
pub mod job_scheduler;

pub use coordinator::LocalCoordinator;
pub use error::{SchedulerError, SchedulerResult};
pub use job_scheduler::JobScheduler;
