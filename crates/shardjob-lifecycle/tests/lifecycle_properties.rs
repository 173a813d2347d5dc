//! End-to-end lifecycle properties over the embedded store and the local
//! coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use shardjob_core::{HandlerKind, JobInfo, JobStatus};
use shardjob_lifecycle::{HandlerProfile, JobLifecycleHandler, LifecycleError};
use shardjob_scheduler::{JobScheduler, LocalCoordinator};
use shardjob_state::RecordStore;

fn setup() -> (JobLifecycleHandler, RecordStore, LocalCoordinator) {
    let store = RecordStore::open_in_memory().unwrap();
    let coordinator = LocalCoordinator::new();
    let handler = JobLifecycleHandler::new(
        HandlerProfile::new(HandlerKind::Simple),
        Arc::new(store.clone()),
        Arc::new(coordinator.clone()),
    );
    (handler, store, coordinator)
}

/// At most one READY record per logical name.
fn assert_single_ready(store: &RecordStore) {
    let mut ready: HashMap<String, usize> = HashMap::new();
    for record in store.list_records(Some(JobStatus::Ready)).unwrap() {
        *ready.entry(record.original_job_name).or_default() += 1;
    }
    for (name, count) in ready {
        assert_eq!(count, 1, "{name} has {count} READY records");
    }
}

#[tokio::test]
async fn billing_sync_rename_scenario() {
    let (handler, store, coordinator) = setup();

    handler
        .create_job(JobInfo::new("billing-sync", "billing-sync-v1", "0 0 * * *", 2))
        .await
        .unwrap();
    assert_eq!(
        store.list_records_for_job("billing-sync", Some(JobStatus::Ready)).unwrap().len(),
        1
    );
    assert_eq!(handler.get_job_brief_info("billing-sync").await.unwrap().len(), 1);

    handler
        .update_job(JobInfo::new("billing-sync", "billing-sync-v2", "0 */6 * * *", 3))
        .await
        .unwrap();

    assert!(!coordinator.is_registered("billing-sync-v1").await);
    assert!(coordinator.is_enabled("billing-sync-v2").await);

    let records = store.list_records_for_job("billing-sync", None).unwrap();
    let v1 = records.iter().find(|r| r.job_name == "billing-sync-v1").unwrap();
    let v2 = records.iter().find(|r| r.job_name == "billing-sync-v2").unwrap();
    assert_eq!(v1.status, JobStatus::Over);
    assert_eq!(v2.status, JobStatus::Ready);

    let configs = handler.get_job("billing-sync").await.unwrap().unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].job_name, "billing-sync-v2");
    assert_eq!(configs[0].cron, "0 */6 * * *");
    assert_eq!(configs[0].sharding_total_count, 3);

    assert_single_ready(&store);
}

#[tokio::test]
async fn second_create_is_duplicate_and_registers_nothing() {
    let (handler, store, coordinator) = setup();
    handler
        .create_job(JobInfo::new("billing-sync", "billing-sync-v1", "0 0 * * *", 2))
        .await
        .unwrap();

    let result = handler
        .create_job(JobInfo::new("billing-sync", "billing-sync-v1b", "0 0 * * *", 2))
        .await;

    assert!(matches!(result, Err(LifecycleError::DuplicateJob(_))));
    assert_eq!(coordinator.registered_jobs().await, ["billing-sync-v1"]);
    assert_single_ready(&store);
}

#[tokio::test]
async fn update_of_unknown_matches_create() {
    let (created, created_store, created_coordinator) = setup();
    let (updated, updated_store, updated_coordinator) = setup();
    let job = JobInfo::new("reports", "reports-v1", "30 2 * * *", 4)
        .with_sharding_parameter("0=a,1=b,2=c,3=d")
        .with_job_parameter("full-refresh");

    created.create_job(job.clone()).await.unwrap();
    updated.update_job(job).await.unwrap();

    let mut a = created_store.list_records(None).unwrap();
    let mut b = updated_store.list_records(None).unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    for record in a.iter_mut().chain(b.iter_mut()) {
        record.created_at = 0;
        record.updated_at = 0;
    }
    assert_eq!(a, b);

    assert_eq!(
        created_coordinator.get_configuration("reports-v1").await.unwrap(),
        updated_coordinator.get_configuration("reports-v1").await.unwrap()
    );
}

#[tokio::test]
async fn remove_of_unknown_returns_normally() {
    let (handler, store, _) = setup();
    handler.remove_job("never-created").await.unwrap();
    assert!(store.list_records(None).unwrap().is_empty());
}

#[tokio::test]
async fn recreate_after_remove_starts_fresh_incarnation() {
    let (handler, store, coordinator) = setup();
    handler
        .create_job(JobInfo::new("cleanup", "cleanup-v1", "0 0 * * *", 1))
        .await
        .unwrap();
    handler.remove_job("cleanup").await.unwrap();
    handler
        .create_job(JobInfo::new("cleanup", "cleanup-v1", "0 0 * * *", 1))
        .await
        .unwrap();

    let records = store.list_records_for_job("cleanup", None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, JobStatus::Over);
    assert_eq!(records[1].status, JobStatus::Ready);
    assert_ne!(records[0].record_id, records[1].record_id);
    assert!(coordinator.is_enabled("cleanup-v1").await);

    // Both records point at the same live registration; it is reported once.
    assert_eq!(handler.get_job("cleanup").await.unwrap().unwrap().len(), 1);
    assert_single_ready(&store);
}

#[tokio::test]
async fn mixed_sequence_keeps_single_ready_invariant() {
    let (handler, store, _) = setup();
    let names = ["alpha", "beta", "gamma"];

    for (round, name) in names.iter().cycle().take(12).enumerate() {
        let job = JobInfo::new(name, &format!("{name}-r{round}"), "0 0 * * *", 1);
        match round % 4 {
            0 => {
                let _ = handler.create_job(job).await;
            }
            1 | 2 => handler.update_job(job).await.unwrap(),
            _ => handler.remove_job(name).await.unwrap(),
        }
        assert_single_ready(&store);
    }
}

#[tokio::test]
async fn queries_never_return_null_for_unknown_names() {
    let (handler, _, _) = setup();
    assert_eq!(handler.get_job("nobody").await.unwrap(), Some(Vec::new()));
    assert!(handler.get_job_brief_info("nobody").await.unwrap().is_empty());
}
