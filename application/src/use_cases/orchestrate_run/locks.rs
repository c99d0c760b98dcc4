//! Per-run serialization.
//!
//! Every orchestrator operation that reads, modifies and writes a run holds
//! that run's lock for the whole cycle, so two concurrent passes can never
//! double-create an execution or race on a transition. Ad-hoc executions are
//! keyed by their execution id. Distinct keys never contend.

use super::types::OrchestratorError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Table of async mutexes, one per key.
///
/// A key's entry lives only while some caller holds or waits on it.
#[derive(Default)]
pub struct RunLockTable {
    locks: Slots,
    wait: Option<Duration>,
}

/// Held lock for one key; released on drop.
pub struct RunGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Slots,
    key: String,
    wait_time: Duration,
}

impl RunGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        // unlock before pruning so the slot's own reference is released
        self.guard.take();
        prune(&self.locks, &self.key);
    }
}

/// Remove `key` when nothing outside the table references its mutex.
fn prune(locks: &Mutex<HashMap<String, Arc<AsyncMutex<()>>>>, key: &str) {
    let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
    if locks
        .get(key)
        .is_some_and(|slot| Arc::strong_count(slot) == 1)
    {
        locks.remove(key);
    }
}

impl RunLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the time a caller waits for a busy key; `None` waits forever.
    pub fn with_wait(mut self, wait: Option<Duration>) -> Self {
        self.wait = wait;
        self
    }

    fn slot(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub async fn acquire(&self, key: &str) -> Result<RunGuard, OrchestratorError> {
        let start = Instant::now();
        let slot = self.slot(key);

        let guard = match self.wait {
            Some(limit) => match tokio::time::timeout(limit, slot.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    prune(&self.locks, key);
                    return Err(OrchestratorError::Busy(key.to_string()));
                }
            },
            None => slot.lock_owned().await,
        };

        let wait_time = start.elapsed();
        if wait_time > Duration::from_millis(100) {
            debug!(key, wait_ms = wait_time.as_millis() as u64, "Waited for run lock");
        }
        Ok(RunGuard {
            guard: Some(guard),
            locks: self.locks.clone(),
            key: key.to_string(),
            wait_time,
        })
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
