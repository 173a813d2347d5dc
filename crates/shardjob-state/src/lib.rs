//! shardjob-state - durable job record store.
//!
//! Backed by [redb](https://docs.rs/redb). Records are JSON-serialized into
//! `&[u8]` value columns under composite keys
//! `{original_job_name}:{record_id:020}`, so every incarnation of a logical
//! job sits in one contiguous, id-ordered key range.
//!
//! The lifecycle layer talks to the [`JobRecordStore`] trait; [`RecordStore`]
//! is the embedded implementation. It is `Clone + Send + Sync` (backed by
//! `Arc<Database>`) and can be shared across async tasks.

pub mod error;
pub mod record_store;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use record_store::JobRecordStore;
pub use store::RecordStore;
