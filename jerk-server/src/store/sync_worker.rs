//! Sync Worker - 重放失败的远端写入
//!
//! 定时扫描 `pending_sync` 队列，按指数退避重试；
//! 超过最大重试次数的条目进入 `dead_letter`，下次启动时恢复到待处理队列。
//!
//! 每个条目在记录锁内处理 (与 DataStore 写入同一把锁)：
//! 重放期间新的写入会等待，不会被旧值覆盖或被误删出队列。

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::local::{LocalStore, PendingSync};
use super::{RecordStore, StoreResult};

/// Sync worker configuration
pub const MAX_RETRY_COUNT: u32 = 5;
const RETRY_BASE_DELAY_SECS: u64 = 5;
const RETRY_MAX_DELAY_SECS: u64 = 60;

/// Outcome of one queue pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncPass {
    pub replayed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    pub deferred: usize,
    /// Cleared by a newer write before the worker got to it
    pub superseded: usize,
}

pub struct SyncWorker {
    local: LocalStore,
    remote: Arc<dyn RecordStore>,
    interval: Duration,
}

impl SyncWorker {
    pub fn new(local: LocalStore, remote: Arc<dyn RecordStore>, interval: Duration) -> Self {
        Self {
            local,
            remote,
            interval,
        }
    }

    /// Run until the shutdown token is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "SyncWorker started");

        match self.local.recover_dead_letters() {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "Recovered dead letter entries to pending queue"),
            Err(e) => tracing::error!(error = %e, "Failed to recover dead letter entries"),
        }

        let mut scan_interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("SyncWorker shutting down");
                    break;
                }
                _ = scan_interval.tick() => {
                    self.process_pending_queue(shared::util::now_millis()).await;
                }
            }
        }
    }

    /// Process all pending entries that are due at `now`
    pub async fn process_pending_queue(&self, now: i64) -> SyncPass {
        let mut pass = SyncPass::default();

        let pending = match self.local.get_pending_syncs() {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to get pending syncs");
                return pass;
            }
        };

        if pending.is_empty() {
            return pass;
        }

        tracing::debug!(count = pending.len(), "Processing pending sync queue");

        for queued in pending {
            let _guard = self.local.locks().lock(queued.collection, &queued.key).await;

            // Re-read under the lock, a facade write may have replayed or replaced it
            let entry = match self.local.get_pending_sync(queued.collection, &queued.key) {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    pass.superseded += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read pending sync entry");
                    continue;
                }
            };

            if entry.retry_count >= MAX_RETRY_COUNT {
                tracing::error!(
                    collection = %entry.collection,
                    key = %entry.key,
                    retry_count = entry.retry_count,
                    last_error = ?entry.last_error,
                    "Max retry count exceeded, moving to dead letter queue"
                );
                let error = entry.last_error.as_deref().unwrap_or("Unknown error");
                if let Err(e) = self.local.move_to_dead_letter(entry.collection, &entry.key, error) {
                    tracing::error!(error = %e, "Failed to move entry to dead letter queue");
                }
                pass.dead_lettered += 1;
                continue;
            }

            if !is_due(&entry, now) {
                pass.deferred += 1;
                continue;
            }

            match self.replay(&entry).await {
                Ok(()) => {
                    tracing::info!(collection = %entry.collection, key = %entry.key, "Pending write synced");
                    if let Err(e) = self.local.remove_from_pending(entry.collection, &entry.key) {
                        tracing::error!(error = %e, "Failed to remove synced entry");
                    }
                    pass.replayed += 1;
                }
                Err(e) => {
                    tracing::warn!(collection = %entry.collection, key = %entry.key, error = %e, "Sync replay failed");
                    if let Err(e2) = self.local.mark_sync_failed(entry.collection, &entry.key, &e.to_string()) {
                        tracing::error!(error = %e2, "Failed to mark sync failure");
                    }
                    pass.failed += 1;
                }
            }
        }

        pass
    }

    /// Push the current local state of the entry's key
    async fn replay(&self, entry: &PendingSync) -> StoreResult<()> {
        match self.local.get_doc(entry.collection, &entry.key)? {
            Some(value) => self.remote.put(entry.collection, &entry.key, &value).await,
            None => self.remote.delete(entry.collection, &entry.key).await.map(|_| ()),
        }
    }
}

/// Exponential backoff: delay = base * 2^retry_count, capped at max
pub fn retry_delay_secs(retry_count: u32) -> u64 {
    RETRY_BASE_DELAY_SECS
        .saturating_mul(2u64.saturating_pow(retry_count))
        .min(RETRY_MAX_DELAY_SECS)
}

fn is_due(entry: &PendingSync, now: i64) -> bool {
    let last = entry.last_attempt_at.unwrap_or(entry.created_at);
    let retry_after_ms = last + (retry_delay_secs(entry.retry_count) as i64 * 1000);
    now >= retry_after_ms
}
