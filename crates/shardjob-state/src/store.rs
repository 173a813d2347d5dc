//! RecordStore - redb-backed job record persistence.
//!
//! Records are JSON-serialized into redb's `&[u8]` value columns. The record
//! id sequence lives in its own table and is advanced inside the same write
//! transaction as the insert, so ids are never reused. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use shardjob_core::{JobInfo, JobStatus};

use crate::error::{StateError, StateResult};
use crate::record_store::JobRecordStore;
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe job record store backed by redb.
#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Database>,
}

impl RecordStore {
    /// Open (or create) a persistent record store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "record store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory record store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory record store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
        txn.open_table(RECORD_META).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Insert a new record, assigning the next record id.
    pub fn insert_record(&self, job: &JobInfo) -> StateResult<JobInfo> {
        let now = epoch_secs();
        let mut record = job.clone();
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut meta = txn.open_table(RECORD_META).map_err(map_err!(Table))?;
            let record_id = meta
                .get(NEXT_RECORD_ID)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value())
                .unwrap_or(1);
            meta.insert(NEXT_RECORD_ID, record_id + 1)
                .map_err(map_err!(Write))?;

            record.record_id = Some(record_id);
            if record.created_at == 0 {
                record.created_at = now;
            }
            record.updated_at = now;

            let key = record_key(&record.original_job_name, record_id);
            let value = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
            let mut table = txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            original_job_name = %record.original_job_name,
            job_name = %record.job_name,
            record_id = ?record.record_id,
            "job record inserted"
        );
        Ok(record)
    }

    /// Overwrite an existing record. The record must carry an id the store knows.
    pub fn update_record(&self, job: &JobInfo) -> StateResult<JobInfo> {
        let record_id = job.record_id.ok_or_else(|| {
            StateError::NotFound(format!("record for job {} has no id", job.job_name))
        })?;
        let key = record_key(&job.original_job_name, record_id);
        let mut record = job.clone();
        record.updated_at = epoch_secs();
        let value = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
            let exists = table.get(key.as_str()).map_err(map_err!(Read))?.is_some();
            if !exists {
                return Err(StateError::NotFound(key));
            }
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, status = %record.status, "job record updated");
        Ok(record)
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Get a single record by logical name and id.
    pub fn get_record(&self, original_job_name: &str, record_id: u64) -> StateResult<Option<JobInfo>> {
        let key = record_key(original_job_name, record_id);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: JobInfo =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Records for one logical job, in record id order.
    pub fn list_records_for_job(
        &self,
        original_job_name: &str,
        status: Option<JobStatus>,
    ) -> StateResult<Vec<JobInfo>> {
        let prefix = format!("{original_job_name}:");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.range(prefix.as_str()..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if !key.value().starts_with(&prefix) {
                break;
            }
            let record: JobInfo =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            // "a:" also prefixes records of a logical job named "a:b".
            if record.original_job_name != original_job_name {
                continue;
            }
            if status.is_none_or(|s| record.status == s) {
                results.push(record);
            }
        }
        Ok(results)
    }

    /// All records, optionally filtered by status.
    pub fn list_records(&self, status: Option<JobStatus>) -> StateResult<Vec<JobInfo>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(JOB_RECORDS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: JobInfo =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if status.is_none_or(|s| record.status == s) {
                results.push(record);
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl JobRecordStore for RecordStore {
    async fn find_by_original_name(
        &self,
        original_job_name: &str,
        status: Option<JobStatus>,
    ) -> StateResult<Vec<JobInfo>> {
        self.list_records_for_job(original_job_name, status)
    }

    async fn insert(&self, job: &JobInfo) -> StateResult<u64> {
        let record = self.insert_record(job)?;
        record
            .record_id
            .ok_or_else(|| StateError::Write(format!("no id assigned to {}", job.job_name)))
    }

    async fn update(&self, job: &JobInfo) -> StateResult<()> {
        self.update_record(job).map(|_| ())
    }

    async fn list_by_status(&self, status: Option<JobStatus>) -> StateResult<Vec<JobInfo>> {
        self.list_records(status)
    }
}

/// Current Unix epoch in seconds.
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
