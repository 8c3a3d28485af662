//! Shared state store
//!
//! One cloneable handle owns the latest pipeline record, the inter-cycle
//! interval and a completed-cycle counter. The scheduler is the only writer
//! of the record; HTTP handlers read snapshots and may change the interval.

use crate::models::{CycleStatus, PipelineResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Inner>,
}

struct Inner {
    latest: RwLock<PipelineResult>,
    interval_secs: AtomicU64,
    cycles_completed: AtomicU64,
}

impl StateStore {
    pub fn new(interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                latest: RwLock::new(PipelineResult::default()),
                interval_secs: AtomicU64::new(interval.as_secs()),
                cycles_completed: AtomicU64::new(0),
            }),
        }
    }

    /// Copy of the record as it is right now
    pub async fn snapshot(&self) -> PipelineResult {
        self.inner.latest.read().await.clone()
    }

    /// Apply one in-place mutation to the record
    pub async fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut PipelineResult),
    {
        let mut latest = self.inner.latest.write().await;
        mutate(&mut latest);
    }

    pub async fn set_status(&self, status: &CycleStatus) {
        let status = status.to_string();
        self.update(|latest| latest.status = status).await;
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.inner.interval_secs.load(Ordering::SeqCst))
    }

    pub fn set_interval(&self, interval: Duration) {
        self.inner.interval_secs.store(interval.as_secs(), Ordering::SeqCst);
    }

    pub fn cycles_completed(&self) -> u64 {
        self.inner.cycles_completed.load(Ordering::SeqCst)
    }

    pub fn record_cycle_complete(&self) -> u64 {
        self.inner.cycles_completed.fetch_add(1, Ordering::SeqCst) + 1
    }
}
