use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};

use crate::catalog::CatalogService;
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::location::{DeliveryZoneRepository, LocationRepository, LocationVerifier};
use crate::orders::{AutoCompleteWorker, OrdersManager};
use crate::settings::SettingsService;
use crate::store::{DataStore, LocalStore, RecordStore, RemoteStore, SyncWorker};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 各服务内部都是 `Arc`，clone 只是浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 持久化门面 (本地 redb + 可选远端) |
/// | orders | 订单生命周期 |
/// | catalog | 菜品目录 |
/// | locations / zones | 门店与配送区域 |
/// | verifier | 位置校验 |
/// | settings | 用户设置 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub store: DataStore,
    pub orders: OrdersManager,
    pub catalog: CatalogService,
    pub locations: LocationRepository,
    pub zones: DeliveryZoneRepository,
    pub verifier: LocationVerifier,
    pub settings: SettingsService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 工作目录结构
    /// 2. 本地数据库 (work_dir/database/jerk.redb)
    /// 3. 远端存储 (配置了 REMOTE_STORE_URL 时)
    /// 4. 各服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config.ensure_work_dir_structure().map_err(|e| {
            AppError::with_message(
                ErrorCode::ConfigError,
                format!("Failed to create work directory {}: {e}", config.work_dir),
            )
        })?;

        let db_path = config.database_path();
        let local = LocalStore::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Local store opened");

        let remote: Option<Arc<dyn RecordStore>> = match &config.remote_store_url {
            Some(url) => {
                let remote = RemoteStore::new(
                    url,
                    config.remote_store_api_key.clone(),
                    config.remote_timeout(),
                )?;
                tracing::info!(url = %url, "Remote store configured");
                Some(Arc::new(remote))
            }
            None => {
                tracing::info!("No remote store configured, running local only");
                None
            }
        };

        Ok(Self::from_store(config.clone(), DataStore::new(local, remote)))
    }

    /// Wire all services on top of an existing store
    pub fn from_store(config: Config, store: DataStore) -> Self {
        let locations = LocationRepository::new(store.clone());
        let zones = DeliveryZoneRepository::new(store.clone());
        let verifier = LocationVerifier::new(locations.clone(), zones.clone());
        let catalog = CatalogService::new(store.clone());
        let orders = OrdersManager::new(
            store.clone(),
            catalog.clone(),
            verifier.clone(),
            config.location_verification,
            config.public_origin.clone(),
        );
        let settings = SettingsService::new(store.clone());

        Self {
            config,
            store,
            orders,
            catalog,
            locations,
            zones,
            verifier,
            settings,
        }
    }

    /// 启动后台任务
    ///
    /// - `sync_worker`: 仅在配置了远端存储时启动
    /// - `auto_complete`: 仅在 AUTO_COMPLETE_MINUTES > 0 时启动
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        if let Some(remote) = self.store.remote() {
            let worker = SyncWorker::new(
                self.store.local().clone(),
                remote.clone(),
                self.config.sync_interval(),
            );
            tasks.spawn("sync_worker", TaskKind::Worker, worker.run(tasks.shutdown_token()));
        }

        if let Some(after) = self.config.auto_complete_after() {
            let worker = AutoCompleteWorker::new(self.orders.clone(), after);
            tasks.spawn(
                "auto_complete",
                TaskKind::Periodic,
                worker.run(tasks.shutdown_token()),
            );
        }

        tasks.log_summary();
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_initialize_local_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let state = ServerState::initialize(&config).await.unwrap();

        assert_eq!(state.store.mode(), "local");
        assert!(config.database_path().exists());

        let tasks = state.start_background_tasks();
        assert!(tasks.is_empty());
        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_background_tasks_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.remote_store_url = Some("http://127.0.0.1:1".into());
        config.auto_complete_minutes = 15;
        let state = ServerState::initialize(&config).await.unwrap();
        assert_eq!(state.store.mode(), "remote");

        let tasks = state.start_background_tasks();
        assert_eq!(tasks.names(), vec!["sync_worker", "auto_complete"]);
        tokio::time::timeout(Duration::from_secs(5), tasks.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_remote_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.remote_store_url = Some("not a url".into());
        assert!(ServerState::initialize(&config).await.is_err());
    }
}
