//! Deferred and periodic task execution.
//!
//! Deferred actions are grouped under an entity key (`order:<id>`,
//! `shipment:<id>`) so that a terminal status change can cancel everything
//! still pending for that entity in one call. Periodic actions run until
//! [`Scheduler::shutdown`].
//!
//! All timing goes through `tokio::time`, so a paused runtime drives the
//! scheduler deterministically in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{CoreError, CoreResult};

pub type TaskId = u64;

struct PendingTask {
    id: TaskId,
    abort: AbortHandle,
}

struct SchedulerInner {
    handle: Handle,
    pending: Mutex<HashMap<String, Vec<PendingTask>>>,
    periodic: Mutex<Vec<JoinHandle<()>>>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

impl SchedulerInner {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, Vec<PendingTask>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims a fired task; false when it was cancelled in the meantime
    fn claim(&self, key: &str, id: TaskId) -> bool {
        let mut pending = self.lock_pending();
        let Some(tasks) = pending.get_mut(key) else {
            return false;
        };
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let claimed = tasks.len() != before;
        if tasks.is_empty() {
            pending.remove(key);
        }
        claimed
    }
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                handle,
                pending: Mutex::new(HashMap::new()),
                periodic: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Binds to the runtime of the calling context
    pub fn current() -> CoreResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| CoreError::InternalError(format!("no tokio runtime: {}", e)))
    }

    /// Run `action` once after `delay`, unless `cancel(key)` comes first
    pub fn schedule<F>(&self, key: impl Into<String>, delay: Duration, action: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let key = key.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        // Hold the table while spawning so a zero-delay task cannot fire before it is registered
        let mut pending = self.inner.lock_pending();
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = self.inner.handle.spawn(async move {
            tokio::select! {
                _ = inner.shutdown.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if inner.claim(&task_key, id) {
                action();
            }
        });
        tracing::debug!(key = %key, task_id = id, delay_secs = delay.as_secs(), "Scheduled deferred task");
        pending.entry(key).or_default().push(PendingTask {
            id,
            abort: handle.abort_handle(),
        });
        id
    }

    /// Cancel every pending task for `key`; returns how many were dropped
    pub fn cancel(&self, key: &str) -> usize {
        let tasks = self.inner.lock_pending().remove(key).unwrap_or_default();
        for task in &tasks {
            task.abort.abort();
        }
        if !tasks.is_empty() {
            tracing::debug!(key = %key, cancelled = tasks.len(), "Cancelled deferred tasks");
        }
        tasks.len()
    }

    pub fn pending(&self, key: &str) -> usize {
        self.inner.lock_pending().get(key).map_or(0, Vec::len)
    }

    pub fn pending_total(&self) -> usize {
        self.inner.lock_pending().values().map(Vec::len).sum()
    }

    /// Run `action` every `period`, first run one full period from now
    pub fn every<F>(&self, name: &'static str, period: Duration, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if period.is_zero() {
            tracing::error!(task = name, "Periodic task not registered, period is zero");
            return;
        }
        let shutdown = self.inner.shutdown.clone();
        let handle = self.inner.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!(task = name, "Running periodic task");
                        action();
                    }
                }
            }
            tracing::info!(task = name, "Periodic task stopped");
        });
        tracing::info!(task = name, period_secs = period.as_secs(), "Registered periodic task");
        self.inner
            .periodic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Stop periodic tasks and drop all deferred ones
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let drained: Vec<PendingTask> = self
            .inner
            .lock_pending()
            .drain()
            .flat_map(|(_, tasks)| tasks)
            .collect();
        for task in drained {
            task.abort.abort();
        }
    }
}
