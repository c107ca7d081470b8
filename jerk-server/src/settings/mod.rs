//! 用户设置服务
//!
//! 按邮箱 (去空格、小写) 存储；更新是把提交的 JSON 深度合并进已存值后整体覆盖。
//! DashMap 缓存读路径，写入时同步更新。同一邮箱的更新串行执行，
//! 缓存与存储始终是同一次写入的结果。

use dashmap::DashMap;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::UserSettings;
use shared::util::normalize_email;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::ValidateEmail;

use crate::store::{Collection, DataStore};

/// Merge `patch` into `base`
///
/// Objects merge key by key, any other value replaces the target.
/// `null` in the patch leaves the target untouched.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(target) => deep_merge(target, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (target, value) => *target = value,
    }
}

fn validate_email(email: &str) -> AppResult<String> {
    let normalized = normalize_email(email);
    if !normalized.validate_email() {
        return Err(AppError::with_message(
            ErrorCode::InvalidEmail,
            format!("Invalid email: {email}"),
        ));
    }
    Ok(normalized)
}

#[derive(Debug, Clone)]
pub struct SettingsService {
    store: DataStore,
    cache: Arc<DashMap<String, UserSettings>>,
    /// Per-email update locks
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl SettingsService {
    pub fn new(store: DataStore) -> Self {
        Self {
            store,
            cache: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Stored settings or defaults
    pub async fn get(&self, email: &str) -> AppResult<UserSettings> {
        let email = validate_email(email)?;
        if let Some(cached) = self.cache.get(&email) {
            return Ok(cached.clone());
        }

        let settings = self
            .store
            .get::<UserSettings>(Collection::UserSettings, &email)
            .await?
            .unwrap_or_else(|| UserSettings::defaults_for(email.clone()));
        // An update that finished meanwhile keeps its entry
        let cached = self.cache.entry(email).or_insert(settings).clone();
        Ok(cached)
    }

    /// Deep-merge `patch` into the stored settings (last write wins)
    pub async fn update(&self, email: &str, patch: Value) -> AppResult<UserSettings> {
        let email = validate_email(email)?;
        if !patch.is_object() {
            return Err(AppError::with_message(
                ErrorCode::SettingsInvalid,
                "Settings update must be a JSON object",
            ));
        }

        let lock = self.locks.entry(email.clone()).or_default().clone();
        let _guard = lock.lock().await;

        let current = match self
            .store
            .get::<UserSettings>(Collection::UserSettings, &email)
            .await?
        {
            Some(s) => s,
            None => UserSettings::defaults_for(email.clone()),
        };

        let mut merged = serde_json::to_value(&current)
            .map_err(|e| AppError::internal(format!("Failed to encode settings: {e}")))?;
        deep_merge(&mut merged, patch);

        let mut settings: UserSettings = serde_json::from_value(merged).map_err(|e| {
            AppError::with_message(ErrorCode::SettingsInvalid, format!("Invalid settings: {e}"))
        })?;
        settings.email = email.clone();
        settings.updated_at = shared::util::now_millis();

        self.store
            .put(Collection::UserSettings, &email, &settings)
            .await?;
        self.cache.insert(email.clone(), settings.clone());
        tracing::info!(email = %email, "User settings updated");
        Ok(settings)
    }
}
