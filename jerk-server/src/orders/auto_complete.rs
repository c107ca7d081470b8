//! AutoCompleteWorker - 已取餐订单超时自动送达
//!
//! 定时扫描 `picked_up` 订单，超过配置时长的走同一状态机转为 `delivered`。

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::manager::OrdersManager;

/// Scan interval upper bound
const MAX_SCAN_INTERVAL: Duration = Duration::from_secs(60);

pub struct AutoCompleteWorker {
    manager: OrdersManager,
    after: Duration,
}

impl AutoCompleteWorker {
    pub fn new(manager: OrdersManager, after: Duration) -> Self {
        Self { manager, after }
    }

    /// Scan at most once a minute, more often for short thresholds
    pub fn scan_interval(&self) -> Duration {
        self.after.min(MAX_SCAN_INTERVAL).max(Duration::from_secs(1))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(after_secs = self.after.as_secs(), "AutoCompleteWorker started");

        let mut scan_interval = tokio::time::interval(self.scan_interval());
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("AutoCompleteWorker shutting down");
                    break;
                }
                _ = scan_interval.tick() => {
                    match self.manager.auto_complete(shared::util::now_millis(), self.after).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(count = n, "Auto-completed picked up orders"),
                        Err(e) => tracing::error!(error = %e, "Auto-complete pass failed"),
                    }
                }
            }
        }
    }
}
