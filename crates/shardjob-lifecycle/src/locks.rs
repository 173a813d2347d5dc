//! Per-name async mutual exclusion.
//!
//! Serializes lifecycle operations on the same logical job inside one
//! process. It does nothing for callers in other processes sharing the same
//! store and coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held while an operation on one logical job is in flight.
pub type NameGuard = OwnedMutexGuard<()>;

/// Lazily created mutex per logical job name.
#[derive(Clone, Default)]
pub struct NameLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`.
    pub async fn acquire(&self, name: &str) -> NameGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on only have the map's reference.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(name.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of names currently held or awaited.
    pub async fn active(&self) -> usize {
        let locks = self.locks.lock().await;
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_name_is_exclusive() {
        let locks = NameLocks::new();
        let guard = locks.acquire("billing").await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.acquire("billing").await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_names_do_not_block() {
        let locks = NameLocks::new();
        let _billing = locks.acquire("billing").await;
        let reports = tokio::time::timeout(Duration::from_secs(1), locks.acquire("reports")).await;
        assert!(reports.is_ok());
    }

    #[tokio::test]
    async fn released_names_are_pruned() {
        let locks = NameLocks::new();
        {
            let _a = locks.acquire("a").await;
            let _b = locks.acquire("b").await;
            assert_eq!(locks.active().await, 2);
        }
        let _c = locks.acquire("c").await;
        assert_eq!(locks.active().await, 1);
        assert_eq!(locks.locks.lock().await.len(), 1);
    }
}
