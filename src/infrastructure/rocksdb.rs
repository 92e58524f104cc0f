use super::row_lock::{HeldLocks, RowLocks, StoreConfig};
use crate::domain::ports::{WalletStore, WalletTransaction, WalletTransactionBox};
use crate::domain::wallet::{Money, WalletId, WalletRecord};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing wallet rows.
pub const CF_WALLETS: &str = "wallets";

/// A persistent wallet store backed by RocksDB.
///
/// Rows are JSON-encoded `WalletRecord`s keyed by the big-endian wallet id.
/// Transactions lock rows through a shared [`RowLocks`] table and commit all of
/// their writes with a single `WriteBatch`, which RocksDB applies atomically.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBWalletStore {
    db: Arc<DB>,
    locks: RowLocks,
}

impl RocksDBWalletStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "wallets" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_wallets = ColumnFamilyDescriptor::new(CF_WALLETS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_wallets])?;

        Ok(Self {
            db: Arc::new(db),
            locks: RowLocks::new(config),
        })
    }
}

fn wallets_cf(db: &DB) -> Result<&ColumnFamily> {
    db.cf_handle(CF_WALLETS)
        .ok_or_else(|| WalletError::internal("Wallets column family not found"))
}

fn encode(record: &WalletRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| {
        WalletError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode(bytes: &[u8]) -> Result<WalletRecord> {
    serde_json::from_slice(bytes).map_err(|e| {
        WalletError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

fn read_record(db: &DB, id: WalletId) -> Result<Option<WalletRecord>> {
    let cf = wallets_cf(db)?;
    match db.get_cf(cf, id.to_be_bytes())? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn write_batch(db: &DB, records: &BTreeMap<WalletId, WalletRecord>) -> Result<()> {
    let cf = wallets_cf(db)?;
    let mut batch = WriteBatch::default();
    for (id, record) in records {
        batch.put_cf(cf, id.to_be_bytes(), encode(record)?);
    }
    db.write(batch)?;
    Ok(())
}

#[async_trait]
impl WalletStore for RocksDBWalletStore {
    async fn begin(&self) -> Result<WalletTransactionBox> {
        Ok(Box::new(RocksDBTransaction {
            db: self.db.clone(),
            locks: self.locks.clone(),
            held: HeldLocks::default(),
            staged: BTreeMap::new(),
        }))
    }

    async fn store(&self, record: WalletRecord) -> Result<()> {
        let _row = self.locks.lock_row(record.id).await?;
        let cf = wallets_cf(&self.db)?;
        self.db.put_cf(cf, record.id.to_be_bytes(), encode(&record)?)?;
        Ok(())
    }

    async fn get(&self, id: WalletId) -> Result<Option<WalletRecord>> {
        read_record(&self.db, id)
    }

    async fn get_all(&self) -> Result<Vec<WalletRecord>> {
        let cf = wallets_cf(&self.db)?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode(&value)?);
        }
        records.sort_by_key(|record| record.id);

        Ok(records)
    }
}

/// Unit of work over a [`RocksDBWalletStore`].
pub struct RocksDBTransaction {
    db: Arc<DB>,
    locks: RowLocks,
    held: HeldLocks,
    staged: BTreeMap<WalletId, WalletRecord>,
}

impl RocksDBTransaction {
    fn current(&self, id: WalletId) -> Result<Option<WalletRecord>> {
        if let Some(record) = self.staged.get(&id) {
            return Ok(Some(*record));
        }
        read_record(&self.db, id)
    }
}

#[async_trait]
impl WalletTransaction for RocksDBTransaction {
    async fn get_for_update(&mut self, id: WalletId) -> Result<Option<WalletRecord>> {
        self.held.lock(&self.locks, id).await?;
        self.current(id)
    }

    async fn update_balance(&mut self, id: WalletId, balance: Money) -> Result<()> {
        self.held.ensure_held(id)?;
        let record = self
            .current(id)?
            .ok_or_else(|| WalletError::internal(format!("wallet {id} vanished while locked")))?;
        self.staged.insert(id, WalletRecord { balance, ..record });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if !self.staged.is_empty() {
            write_batch(&self.db, &self.staged)?;
        }
        tracing::debug!(rows = self.staged.len(), "RocksDB transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        tracing::debug!(rows = self.staged.len(), "RocksDB transaction rolled back");
        Ok(())
    }
}
