use super::wallet::{Money, WalletId, WalletRecord};
use crate::error::Result;
use async_trait::async_trait;

/// Persistent wallet storage.
///
/// Balances are only ever changed through a [`WalletTransaction`] obtained from
/// [`WalletStore::begin`]; `store` exists for seeding rows.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn begin(&self) -> Result<WalletTransactionBox>;
    /// Inserts or replaces a whole row. Waits for the row lock, so it never
    /// interleaves with a transaction that holds that row.
    async fn store(&self, record: WalletRecord) -> Result<()>;
    async fn get(&self, id: WalletId) -> Result<Option<WalletRecord>>;
    /// All rows, ordered by id.
    async fn get_all(&self) -> Result<Vec<WalletRecord>>;
}

/// One unit of work against a [`WalletStore`].
///
/// Row locks taken by `get_for_update` are held until the transaction is
/// committed, rolled back or dropped. Dropping without `commit` discards every
/// staged write.
#[async_trait]
pub trait WalletTransaction: Send {
    /// Locks the row, then reads it. Locking a row twice in the same
    /// transaction is a no-op.
    async fn get_for_update(&mut self, id: WalletId) -> Result<Option<WalletRecord>>;
    /// Stages a new balance for a row previously locked by this transaction.
    async fn update_balance(&mut self, id: WalletId, balance: Money) -> Result<()>;
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;
pub type WalletTransactionBox = Box<dyn WalletTransaction>;
