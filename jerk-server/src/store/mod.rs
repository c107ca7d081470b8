//! 持久化层 - 远端文档存储 + 本地 redb 兜底
//!
//! # 结构
//!
//! - [`RecordStore`] - JSON 文档存储抽象 (按 `(Collection, key)` 寻址)
//! - [`LocalStore`] - redb 本地副本，附带 pending_sync / dead_letter 队列
//! - [`RemoteStore`] - HTTP 文档 API 客户端
//! - [`DataStore`] - 门面：先写本地，再尝试远端；读优先远端，失败回落本地
//! - [`SyncWorker`] - 重放失败的远端写入

pub mod facade;
pub mod local;
pub mod remote;
pub mod sync_worker;

pub use facade::DataStore;
pub use local::{DeadLetterEntry, KeyLocks, LocalStore, PendingSync, SyncOp};
pub use remote::RemoteStore;
pub use sync_worker::SyncWorker;

use async_trait::async_trait;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use std::fmt;
use thiserror::Error;

/// Document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Orders,
    FoodItems,
    Locations,
    DeliveryZones,
    UserSettings,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Orders,
        Collection::FoodItems,
        Collection::Locations,
        Collection::DeliveryZones,
        Collection::UserSettings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::FoodItems => "food_items",
            Collection::Locations => "locations",
            Collection::DeliveryZones => "delivery_zones",
            Collection::UserSettings => "user_settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote request failed: {0}")]
    Remote(String),

    #[error("Remote store returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },
}

impl StoreError {
    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Remote(_) | StoreError::RemoteStatus { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 将存储错误转换为错误码
fn classify_store_error(e: &StoreError) -> ErrorCode {
    match e {
        StoreError::Serialization(_) => return ErrorCode::InternalError,
        StoreError::Remote(_) | StoreError::RemoteStatus { .. } => {
            return ErrorCode::RemoteStoreUnavailable;
        }
        _ => {}
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();
    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }
    ErrorCode::DatabaseError
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = classify_store_error(&err);
        tracing::error!(error = %err, error_code = ?code, "Store error occurred");
        AppError::with_message(code, err.to_string())
    }
}

/// JSON document store addressed by `(collection, key)`
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>>;

    async fn put(&self, collection: Collection, key: &str, value: &Value) -> StoreResult<()>;

    /// Returns whether a record was removed
    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool>;

    /// All `(key, value)` pairs of a collection
    async fn list(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        let names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["orders", "food_items", "locations", "delivery_zones", "user_settings"]
        );
    }

    #[test]
    fn test_store_error_classification() {
        let err: AppError = StoreError::Remote("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::RemoteStoreUnavailable);

        let err: AppError = StoreError::RemoteStatus {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::RemoteStoreUnavailable);

        let json_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err: AppError = StoreError::Serialization(json_err).into();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
