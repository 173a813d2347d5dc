//! redb table definitions for the job record store.

use redb::TableDefinition;

/// Job records keyed by `{original_job_name}:{record_id:020}`.
pub const JOB_RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("job_records");

/// Store bookkeeping (record id sequence).
pub const RECORD_META: TableDefinition<&str, u64> = TableDefinition::new("record_meta");

/// Key in `RECORD_META` holding the next record id to hand out.
pub const NEXT_RECORD_ID: &str = "next_record_id";

/// Build the composite record key.
pub fn record_key(original_job_name: &str, record_id: u64) -> String {
    format!("{original_job_name}:{record_id:020}")
}
