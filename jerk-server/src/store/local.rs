//! redb-based local copy of every collection
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` / `food_items` / `locations` / `delivery_zones` / `user_settings` | record key | JSON document | Durable local copy |
//! | `pending_sync` | `collection/key` | `PendingSync` | Remote writes waiting for replay |
//! | `dead_letter` | `collection/key` | `DeadLetterEntry` | Writes that exhausted their retries |
//!
//! redb commits are durable as soon as `commit()` returns, so the local copy
//! survives a crash between the local and the remote write.
//!
//! [`KeyLocks`] serialize everything that moves one record between the local
//! copy and the remote: facade writes, remote-read refreshes and queue replays.

use async_trait::async_trait;
use dashmap::DashMap;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Collection, RecordStore, StoreResult};

type DocTable = TableDefinition<'static, &'static str, &'static [u8]>;

const ORDERS_TABLE: DocTable = TableDefinition::new("orders");
const FOOD_ITEMS_TABLE: DocTable = TableDefinition::new("food_items");
const LOCATIONS_TABLE: DocTable = TableDefinition::new("locations");
const DELIVERY_ZONES_TABLE: DocTable = TableDefinition::new("delivery_zones");
const USER_SETTINGS_TABLE: DocTable = TableDefinition::new("user_settings");

/// Pending remote writes: key = `collection/key`, value = JSON-serialized PendingSync
const PENDING_SYNC_TABLE: DocTable = TableDefinition::new("pending_sync");

/// Dead letter queue: key = `collection/key`, value = JSON-serialized DeadLetterEntry
const DEAD_LETTER_TABLE: DocTable = TableDefinition::new("dead_letter");

fn table_for(collection: Collection) -> DocTable {
    match collection {
        Collection::Orders => ORDERS_TABLE,
        Collection::FoodItems => FOOD_ITEMS_TABLE,
        Collection::Locations => LOCATIONS_TABLE,
        Collection::DeliveryZones => DELIVERY_ZONES_TABLE,
        Collection::UserSettings => USER_SETTINGS_TABLE,
    }
}

fn queue_key(collection: Collection, key: &str) -> String {
    format!("{}/{}", collection.as_str(), key)
}

/// Remote operation to replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOp {
    Put,
    Delete,
}

/// Pending sync queue entry
///
/// Only the address is queued. The replayed payload is whatever the local
/// copy holds at replay time, so a later write for the same key supersedes
/// an earlier failed one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PendingSync {
    pub collection: Collection,
    pub key: String,
    pub op: SyncOp,
    pub created_at: i64,
    pub retry_count: u32,
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_attempt_at: Option<i64>,
}

/// Dead letter queue entry (permanently failed remote writes)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeadLetterEntry {
    pub collection: Collection,
    pub key: String,
    pub op: SyncOp,
    pub created_at: i64,
    pub failed_at: i64,
    pub retry_count: u32,
    pub last_error: String,
}

/// Per-record async locks, keyed by `collection/key`
#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn slot(&self, collection: Collection, key: &str) -> Arc<Mutex<()>> {
        self.inner
            .entry(queue_key(collection, key))
            .or_default()
            .clone()
    }

    /// Wait for exclusive access to one record
    pub async fn lock(&self, collection: Collection, key: &str) -> OwnedMutexGuard<()> {
        self.slot(collection, key).lock_owned().await
    }

    /// `None` while another task holds the record
    pub fn try_lock(&self, collection: Collection, key: &str) -> Option<OwnedMutexGuard<()>> {
        self.slot(collection, key).try_lock_owned().ok()
    }
}

/// Local store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
    locks: KeyLocks,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for collection in Collection::ALL {
                let _ = write_txn.open_table(table_for(collection))?;
            }
            let _ = write_txn.open_table(PENDING_SYNC_TABLE)?;
            let _ = write_txn.open_table(DEAD_LETTER_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self {
            db: Arc::new(db),
            locks: KeyLocks::default(),
        })
    }

    /// Record locks shared by every clone of this store
    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    // ========== Documents ==========

    pub fn get_doc(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_for(collection))?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_doc(&self, collection: Collection, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table_for(collection))?;
            table.insert(key, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn delete_doc(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(table_for(collection))?;
            let removed = table.remove(key)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_docs(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_for(collection))?;

        let mut docs = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let doc: Value = serde_json::from_slice(value.value())?;
            docs.push((key.value().to_string(), doc));
        }
        Ok(docs)
    }

    /// Refresh the local copy from a remote listing in one transaction
    ///
    /// Keys in `skip` and keys with a queued write keep their local value.
    pub fn refresh_docs(
        &self,
        collection: Collection,
        docs: &[(String, Value)],
        skip: &HashSet<String>,
    ) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let pending = txn.open_table(PENDING_SYNC_TABLE)?;
            let mut table = txn.open_table(table_for(collection))?;
            for (key, value) in docs {
                if skip.contains(key) || pending.get(queue_key(collection, key).as_str())?.is_some() {
                    continue;
                }
                let bytes = serde_json::to_vec(value)?;
                table.insert(key.as_str(), bytes.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Pending Sync Queue ==========

    /// Queue a failed remote write (replaces any earlier entry for the key)
    pub fn queue_sync(
        &self,
        collection: Collection,
        key: &str,
        op: SyncOp,
        error: &str,
    ) -> StoreResult<()> {
        let pending = PendingSync {
            collection,
            key: key.to_string(),
            op,
            created_at: shared::util::now_millis(),
            retry_count: 0,
            last_error: Some(error.to_string()),
            last_attempt_at: None,
        };
        let value = serde_json::to_vec(&pending)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_SYNC_TABLE)?;
            table.insert(queue_key(collection, key).as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get all pending sync entries
    pub fn get_pending_syncs(&self) -> StoreResult<Vec<PendingSync>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SYNC_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let pending: PendingSync = serde_json::from_slice(value.value())?;
            entries.push(pending);
        }
        Ok(entries)
    }

    pub fn get_pending_sync(
        &self,
        collection: Collection,
        key: &str,
    ) -> StoreResult<Option<PendingSync>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SYNC_TABLE)?;
        match table.get(queue_key(collection, key).as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Keys of a collection with an unreplayed local write
    pub fn pending_keys(&self, collection: Collection) -> StoreResult<HashSet<String>> {
        Ok(self
            .get_pending_syncs()?
            .into_iter()
            .filter(|p| p.collection == collection)
            .map(|p| p.key)
            .collect())
    }

    /// Remove from pending queue (replayed or superseded)
    pub fn remove_from_pending(&self, collection: Collection, key: &str) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_SYNC_TABLE)?;
            table.remove(queue_key(collection, key).as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Mark replay as failed, increment retry count
    pub fn mark_sync_failed(&self, collection: Collection, key: &str, error: &str) -> StoreResult<()> {
        let qkey = queue_key(collection, key);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_SYNC_TABLE)?;

            let pending_opt = if let Some(value) = table.get(qkey.as_str())? {
                let pending: PendingSync = serde_json::from_slice(value.value())?;
                Some(pending)
            } else {
                None
            };

            if let Some(mut pending) = pending_opt {
                pending.retry_count += 1;
                pending.last_error = Some(error.to_string());
                pending.last_attempt_at = Some(shared::util::now_millis());
                let new_value = serde_json::to_vec(&pending)?;
                table.insert(qkey.as_str(), new_value.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Dead Letter Queue ==========

    /// Move entry from pending queue to dead letter queue
    pub fn move_to_dead_letter(&self, collection: Collection, key: &str, error: &str) -> StoreResult<()> {
        let qkey = queue_key(collection, key);
        let txn = self.db.begin_write()?;
        {
            let mut pending_table = txn.open_table(PENDING_SYNC_TABLE)?;
            let mut dead_letter_table = txn.open_table(DEAD_LETTER_TABLE)?;

            let pending_opt = if let Some(value) = pending_table.get(qkey.as_str())? {
                let pending: PendingSync = serde_json::from_slice(value.value())?;
                Some(pending)
            } else {
                None
            };

            if let Some(pending) = pending_opt {
                let dead_letter = DeadLetterEntry {
                    collection,
                    key: key.to_string(),
                    op: pending.op,
                    created_at: pending.created_at,
                    failed_at: shared::util::now_millis(),
                    retry_count: pending.retry_count,
                    last_error: error.to_string(),
                };
                let value = serde_json::to_vec(&dead_letter)?;
                dead_letter_table.insert(qkey.as_str(), value.as_slice())?;
                pending_table.remove(qkey.as_str())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Get all dead letter entries
    pub fn get_dead_letters(&self) -> StoreResult<Vec<DeadLetterEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEAD_LETTER_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let entry: DeadLetterEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Move all dead letter entries back to pending queue (reset retry count)
    ///
    /// Used at startup so a remote that was down for a long time gets the
    /// writes eventually.
    pub fn recover_dead_letters(&self) -> StoreResult<usize> {
        let txn = self.db.begin_write()?;
        let count = {
            let mut pending_table = txn.open_table(PENDING_SYNC_TABLE)?;
            let mut dead_letter_table = txn.open_table(DEAD_LETTER_TABLE)?;

            let mut dead: Vec<(String, DeadLetterEntry)> = Vec::new();
            for result in dead_letter_table.iter()? {
                let (key, value) = result?;
                let entry: DeadLetterEntry = serde_json::from_slice(value.value())?;
                dead.push((key.value().to_string(), entry));
            }

            let now = shared::util::now_millis();
            for (qkey, entry) in &dead {
                let pending = PendingSync {
                    collection: entry.collection,
                    key: entry.key.clone(),
                    op: entry.op,
                    created_at: now,
                    retry_count: 0,
                    last_error: None,
                    last_attempt_at: None,
                };
                let value = serde_json::to_vec(&pending)?;
                pending_table.insert(qkey.as_str(), value.as_slice())?;
                dead_letter_table.remove(qkey.as_str())?;
            }
            dead.len()
        };
        txn.commit()?;
        Ok(count)
    }

    // ========== Statistics ==========

    pub fn get_stats(&self) -> StoreResult<LocalStats> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let pending = read_txn.open_table(PENDING_SYNC_TABLE)?;
        let dead = read_txn.open_table(DEAD_LETTER_TABLE)?;

        Ok(LocalStats {
            order_count: orders.len()?,
            pending_sync_count: pending.len()?,
            dead_letter_count: dead.len()?,
        })
    }
}

/// Local store statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct LocalStats {
    pub order_count: u64,
    pub pending_sync_count: u64,
    pub dead_letter_count: u64,
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        self.get_doc(collection, key)
    }

    async fn put(&self, collection: Collection, key: &str, value: &Value) -> StoreResult<()> {
        self.put_doc(collection, key, value)
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        self.delete_doc(collection, key)
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        self.list_docs(collection)
    }
}
