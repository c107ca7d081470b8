//! DataStore - 远端优先、本地兜底的持久化门面
//!
//! ```text
//! write:  local (durable) ──► remote ──✗──► pending_sync queue (caller still succeeds)
//! read:   remote ──✓──► refresh local ──► value
//!            └──✗/absent──► local
//! ```
//!
//! Keys with an unreplayed local write are always served from local, the
//! local copy is newer than whatever the remote holds for them.
//!
//! With a remote configured, every step that touches one record on both
//! sides runs under that record's [`KeyLocks`](super::KeyLocks) entry, the
//! same lock the [`SyncWorker`](super::SyncWorker) takes before a replay.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::local::{LocalStats, LocalStore, SyncOp};
use super::{Collection, RecordStore, StoreResult};

#[derive(Clone)]
pub struct DataStore {
    local: LocalStore,
    remote: Option<Arc<dyn RecordStore>>,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("mode", &self.mode())
            .finish()
    }
}

impl DataStore {
    pub fn new(local: LocalStore, remote: Option<Arc<dyn RecordStore>>) -> Self {
        Self { local, remote }
    }

    /// Local-only store (no remote configured)
    pub fn local_only(local: LocalStore) -> Self {
        Self::new(local, None)
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn remote(&self) -> Option<&Arc<dyn RecordStore>> {
        self.remote.as_ref()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// `"remote"` or `"local"`
    pub fn mode(&self) -> &'static str {
        if self.has_remote() { "remote" } else { "local" }
    }

    pub fn stats(&self) -> StoreResult<LocalStats> {
        self.local.get_stats()
    }

    // ========== Raw JSON ==========

    pub async fn get_value(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        let Some(remote) = &self.remote else {
            return self.local.get_doc(collection, key);
        };

        let _guard = self.local.locks().lock(collection, key).await;
        if self.local.get_pending_sync(collection, key)?.is_some() {
            return self.local.get_doc(collection, key);
        }

        match remote.get(collection, key).await {
            Ok(Some(value)) => {
                if let Err(e) = self.local.put_doc(collection, key, &value) {
                    tracing::warn!(collection = %collection, key = %key, error = %e, "Failed to refresh local copy");
                }
                Ok(Some(value))
            }
            Ok(None) => self.local.get_doc(collection, key),
            Err(e) => {
                tracing::warn!(collection = %collection, key = %key, error = %e, "Remote read failed, falling back to local");
                self.local.get_doc(collection, key)
            }
        }
    }

    pub async fn put_value(&self, collection: Collection, key: &str, value: &Value) -> StoreResult<()> {
        let Some(remote) = &self.remote else {
            return self.local.put_doc(collection, key, value);
        };

        let _guard = self.local.locks().lock(collection, key).await;
        self.local.put_doc(collection, key, value)?;
        match remote.put(collection, key, value).await {
            Ok(()) => self.clear_pending(collection, key),
            Err(e) => self.enqueue(collection, key, SyncOp::Put, &e.to_string()),
        }
        Ok(())
    }

    pub async fn delete_value(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let Some(remote) = &self.remote else {
            return self.local.delete_doc(collection, key);
        };

        let _guard = self.local.locks().lock(collection, key).await;
        let removed = self.local.delete_doc(collection, key)?;
        match remote.delete(collection, key).await {
            Ok(remote_removed) => {
                self.clear_pending(collection, key);
                Ok(removed || remote_removed)
            }
            Err(e) => {
                self.enqueue(collection, key, SyncOp::Delete, &e.to_string());
                Ok(removed)
            }
        }
    }

    pub async fn list_values(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        let Some(remote) = &self.remote else {
            return self.local.list_docs(collection);
        };

        match remote.list(collection).await {
            Ok(remote_docs) => {
                // Records held by an in-flight write or replay keep their local value
                let mut guards = Vec::with_capacity(remote_docs.len());
                let mut busy = HashSet::new();
                for (key, _) in &remote_docs {
                    match self.local.locks().try_lock(collection, key) {
                        Some(guard) => guards.push(guard),
                        None => {
                            busy.insert(key.clone());
                        }
                    }
                }
                if let Err(e) = self.local.refresh_docs(collection, &remote_docs, &busy) {
                    tracing::warn!(collection = %collection, error = %e, "Failed to refresh local copy");
                }
                drop(guards);

                let pending = self.local.pending_keys(collection)?;
                let mut merged: BTreeMap<String, Value> = remote_docs.into_iter().collect();
                for key in pending.iter().chain(busy.iter()) {
                    match self.local.get_doc(collection, key)? {
                        Some(value) => {
                            merged.insert(key.clone(), value);
                        }
                        None if pending.contains(key) => {
                            merged.remove(key);
                        }
                        None => {}
                    }
                }
                Ok(merged.into_iter().collect())
            }
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Remote list failed, falling back to local");
                self.local.list_docs(collection)
            }
        }
    }

    // ========== Typed helpers ==========

    pub async fn get<T: DeserializeOwned>(&self, collection: Collection, key: &str) -> StoreResult<Option<T>> {
        match self.get_value(collection, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn put<T: Serialize>(&self, collection: Collection, key: &str, record: &T) -> StoreResult<()> {
        let value = serde_json::to_value(record)?;
        self.put_value(collection, key, &value).await
    }

    pub async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        self.delete_value(collection, key).await
    }

    /// All records of a collection, undecodable documents are skipped
    pub async fn list<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        let docs = self.list_values(collection).await?;
        let mut records = Vec::with_capacity(docs.len());
        for (key, value) in docs {
            match serde_json::from_value(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection = %collection, key = %key, error = %e, "Skipping undecodable record");
                }
            }
        }
        Ok(records)
    }

    // ========== Pending sync ==========

    fn enqueue(&self, collection: Collection, key: &str, op: SyncOp, error: &str) {
        tracing::warn!(
            collection = %collection,
            key = %key,
            op = ?op,
            error = %error,
            "Remote write failed, queued for sync"
        );
        if let Err(e) = self.local.queue_sync(collection, key, op, error) {
            tracing::error!(collection = %collection, key = %key, error = %e, "Failed to queue pending sync");
        }
    }

    fn clear_pending(&self, collection: Collection, key: &str) {
        if let Err(e) = self.local.remove_from_pending(collection, key) {
            tracing::warn!(collection = %collection, key = %key, error = %e, "Failed to clear pending sync");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Remote backed by another in-memory LocalStore, can be switched off
    struct FlakyRemote {
        inner: LocalStore,
        up: AtomicBool,
    }

    impl FlakyRemote {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: LocalStore::open_in_memory().unwrap(),
                up: AtomicBool::new(true),
            })
        }

        fn check(&self) -> StoreResult<()> {
            if self.up.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StoreError::Remote("connection refused".into()))
            }
        }
    }

    #[async_trait]
    impl RecordStore for FlakyRemote {
        async fn get(&self, c: Collection, k: &str) -> StoreResult<Option<Value>> {
            self.check()?;
            self.inner.get_doc(c, k)
        }
        async fn put(&self, c: Collection, k: &str, v: &Value) -> StoreResult<()> {
            self.check()?;
            self.inner.put_doc(c, k, v)
        }
        async fn delete(&self, c: Collection, k: &str) -> StoreResult<bool> {
            self.check()?;
            self.inner.delete_doc(c, k)
        }
        async fn list(&self, c: Collection) -> StoreResult<Vec<(String, Value)>> {
            self.check()?;
            self.inner.list_docs(c)
        }
    }

    fn facade(remote: &Arc<FlakyRemote>) -> DataStore {
        let remote: Arc<dyn RecordStore> = remote.clone();
        DataStore::new(LocalStore::open_in_memory().unwrap(), Some(remote))
    }

    #[tokio::test]
    async fn test_local_only_mode() {
        let store = DataStore::local_only(LocalStore::open_in_memory().unwrap());
        assert_eq!(store.mode(), "local");

        store.put_value(Collection::Orders, "o-1", &json!({"n": 1})).await.unwrap();
        assert_eq!(
            store.get_value(Collection::Orders, "o-1").await.unwrap().unwrap()["n"],
            1
        );
        assert_eq!(store.list_values(Collection::Orders).await.unwrap().len(), 1);
        assert!(store.delete_value(Collection::Orders, "o-1").await.unwrap());
        assert!(store.local().get_pending_syncs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_goes_to_both_stores() {
        let remote = FlakyRemote::new();
        let store = facade(&remote);
        assert_eq!(store.mode(), "remote");

        store.put_value(Collection::Orders, "o-1", &json!({"n": 1})).await.unwrap();

        assert!(store.local().get_doc(Collection::Orders, "o-1").unwrap().is_some());
        assert!(remote.inner.get_doc(Collection::Orders, "o-1").unwrap().is_some());
        assert!(store.local().get_pending_syncs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_queues_and_still_succeeds() {
        let remote = FlakyRemote::new();
        let store = facade(&remote);
        remote.up.store(false, Ordering::SeqCst);

        store.put_value(Collection::Orders, "o-1", &json!({"n": 1})).await.unwrap();

        let pending = store.local().get_pending_syncs().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].op, SyncOp::Put);

        // Reads and lists fall back to local
        assert!(store.get_value(Collection::Orders, "o-1").await.unwrap().is_some());
        assert_eq!(store.list_values(Collection::Orders).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_write_clears_stale_pending() {
        let remote = FlakyRemote::new();
        let store = facade(&remote);

        remote.up.store(false, Ordering::SeqCst);
        store.put_value(Collection::Orders, "o-1", &json!({"n": 1})).await.unwrap();
        remote.up.store(true, Ordering::SeqCst);
        store.put_value(Collection::Orders, "o-1", &json!({"n": 2})).await.unwrap();

        assert!(store.local().get_pending_syncs().unwrap().is_empty());
        assert_eq!(
            remote.inner.get_doc(Collection::Orders, "o-1").unwrap().unwrap()["n"],
            2
        );
    }

    #[tokio::test]
    async fn test_remote_read_refreshes_local() {
        let remote = FlakyRemote::new();
        let store = facade(&remote);
        remote
            .inner
            .put_doc(Collection::Locations, "l-1", &json!({"name": "Main"}))
            .unwrap();

        let v = store.get_value(Collection::Locations, "l-1").await.unwrap().unwrap();
        assert_eq!(v["name"], "Main");
        assert!(store.local().get_doc(Collection::Locations, "l-1").unwrap().is_some());

        remote
            .inner
            .put_doc(Collection::Locations, "l-2", &json!({"name": "Second"}))
            .unwrap();
        let listed = store.list_values(Collection::Locations).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(store.local().get_doc(Collection::Locations, "l-2").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pending_keys_win_over_remote() {
        let remote = FlakyRemote::new();
        let store = facade(&remote);

        store.put_value(Collection::Orders, "o-1", &json!({"v": "old"})).await.unwrap();
        store.put_value(Collection::Orders, "o-2", &json!({"v": "keep"})).await.unwrap();

        remote.up.store(false, Ordering::SeqCst);
        store.put_value(Collection::Orders, "o-1", &json!({"v": "new"})).await.unwrap();
        assert!(store.delete_value(Collection::Orders, "o-2").await.unwrap());
        remote.up.store(true, Ordering::SeqCst);

        // Remote still has stale data, local writes are not replayed yet
        let v = store.get_value(Collection::Orders, "o-1").await.unwrap().unwrap();
        assert_eq!(v["v"], "new");

        let listed = store.list_values(Collection::Orders).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, "o-1");
        assert_eq!(listed[0].1["v"], "new");
    }

    #[tokio::test]
    async fn test_typed_list_skips_bad_records() {
        #[derive(serde::Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let store = DataStore::local_only(LocalStore::open_in_memory().unwrap());
        store.put_value(Collection::Locations, "a", &json!({"name": "A"})).await.unwrap();
        store.put_value(Collection::Locations, "b", &json!({"nope": 1})).await.unwrap();

        let items: Vec<Named> = store.list(Collection::Locations).await.unwrap();
        assert_eq!(items.len(), 1);
    }
}
