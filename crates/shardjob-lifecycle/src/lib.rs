//! shardjob-lifecycle - create, replace, and retire sharded cron jobs.
//!
//! The [`JobLifecycleHandler`] is the single point that keeps two views of
//! the world consistent: the job records in a [`JobRecordStore`] and the live
//! registrations in a [`JobScheduler`].
//!
//! ```text
//!         create_job                        remove_job
//!   (no READY record) ---------> READY ------------------> OVER
//!         ^                        |
//!         |   update_job: remove + create (never in place)  |
//!         +-------------------------------------------------+
//! ```
//!
//! Updates always tear down the old incarnation before registering the new
//! one. If the physical job name changes and only the record were patched, a
//! crash mid-update could leave both names enabled after the next bootstrap;
//! delete-then-create limits the failure window to "nothing scheduled".
//!
//! [`JobRecordStore`]: shardjob_state::JobRecordStore
//! [`JobScheduler`]: shardjob_scheduler::JobScheduler

pub mod error;
pub mod handler;
pub mod locks;
pub mod registry;

pub use error::{LifecycleError, LifecycleResult};
pub use handler::{HandlerProfile, JobLifecycleHandler};
pub use locks::NameLocks;
pub use registry::HandlerRegistry;
