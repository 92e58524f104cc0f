use super::row_lock::{HeldLocks, RowLocks, StoreConfig};
use crate::domain::ports::{WalletStore, WalletTransaction, WalletTransactionBox};
use crate::domain::wallet::{Money, WalletId, WalletRecord};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory wallet store.
///
/// Rows live in an `Arc<RwLock<BTreeMap<WalletId, WalletRecord>>>`; row-level
/// exclusion for transactions comes from a shared [`RowLocks`] table.
/// Ideal for testing or for runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    records: Arc<RwLock<BTreeMap<WalletId, WalletRecord>>>,
    locks: RowLocks,
}

impl InMemoryWalletStore {
    /// Creates a new, empty store whose row locks never time out.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            records: Arc::default(),
            locks: RowLocks::new(config),
        }
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn begin(&self) -> Result<WalletTransactionBox> {
        Ok(Box::new(InMemoryTransaction {
            records: self.records.clone(),
            locks: self.locks.clone(),
            held: HeldLocks::default(),
            staged: BTreeMap::new(),
        }))
    }

    async fn store(&self, record: WalletRecord) -> Result<()> {
        let _row = self.locks.lock_row(record.id).await?;
        let mut records = self.records.write().await;
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: WalletId) -> Result<Option<WalletRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&id).copied())
    }

    async fn get_all(&self) -> Result<Vec<WalletRecord>> {
        let records = self.records.read().await;
        Ok(records.values().copied().collect())
    }
}

/// Unit of work over an [`InMemoryWalletStore`].
///
/// Writes are staged locally and applied under a single write lock on commit,
/// so readers never observe half of a transfer.
pub struct InMemoryTransaction {
    records: Arc<RwLock<BTreeMap<WalletId, WalletRecord>>>,
    locks: RowLocks,
    held: HeldLocks,
    staged: BTreeMap<WalletId, WalletRecord>,
}

impl InMemoryTransaction {
    async fn current(&self, id: WalletId) -> Option<WalletRecord> {
        if let Some(record) = self.staged.get(&id) {
            return Some(*record);
        }
        self.records.read().await.get(&id).copied()
    }
}

#[async_trait]
impl WalletTransaction for InMemoryTransaction {
    async fn get_for_update(&mut self, id: WalletId) -> Result<Option<WalletRecord>> {
        self.held.lock(&self.locks, id).await?;
        Ok(self.current(id).await)
    }

    async fn update_balance(&mut self, id: WalletId, balance: Money) -> Result<()> {
        self.held.ensure_held(id)?;
        let record = self
            .current(id)
            .await
            .ok_or_else(|| WalletError::internal(format!("wallet {id} vanished while locked")))?;
        self.staged.insert(id, WalletRecord { balance, ..record });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut records = self.records.write().await;
        for (id, record) in &self.staged {
            records.insert(*id, *record);
        }
        tracing::debug!(rows = self.staged.len(), "In-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        tracing::debug!(rows = self.staged.len(), "In-memory transaction rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: WalletId, balance: Money) -> WalletRecord {
        WalletRecord {
            id,
            owner_id: id,
            balance,
        }
    }

    #[tokio::test]
    async fn test_in_memory_wallet_store() {
        let store = InMemoryWalletStore::new();
        store.store(record(2, 500)).await.unwrap();
        store.store(record(1, 100)).await.unwrap();

        assert_eq!(store.get(1).await.unwrap(), Some(record(1, 100)));
        assert!(store.get(3).await.unwrap().is_none());

        let all = store.get_all().await.unwrap();
        assert_eq!(all, vec![record(1, 100), record(2, 500)]);
    }

    #[tokio::test]
    async fn test_commit_applies_staged_writes() {
        let store = InMemoryWalletStore::new();
        store.store(record(1, 100)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_for_update(1).await.unwrap(), Some(record(1, 100)));
        tx.update_balance(1, 40).await.unwrap();

        // Not visible before commit
        assert_eq!(store.get(1).await.unwrap(), Some(record(1, 100)));

        tx.commit().await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some(record(1, 40)));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes_and_releases_locks() {
        let store = InMemoryWalletStore::new();
        store.store(record(1, 100)).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.get_for_update(1).await.unwrap();
            tx.update_balance(1, 0).await.unwrap();
        }

        assert_eq!(store.get(1).await.unwrap(), Some(record(1, 100)));

        let mut tx = store.begin().await.unwrap();
        let locked = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            tx.get_for_update(1),
        )
        .await
        .expect("lock should have been released");
        assert_eq!(locked.unwrap(), Some(record(1, 100)));
    }

    #[tokio::test]
    async fn test_update_requires_lock() {
        let store = InMemoryWalletStore::new();
        store.store(record(1, 100)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.update_balance(1, 50).await.is_err());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_missing_row() {
        let store = InMemoryWalletStore::new();
        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_for_update(42).await.unwrap().is_none());
        assert!(tx.update_balance(42, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_lock_table_empty_after_transactions() {
        use crate::application::coordinator::TransferCoordinator;

        let store = InMemoryWalletStore::new();
        store.store(record(1, 5000)).await.unwrap();
        let coordinator = TransferCoordinator::new(Box::new(store.clone()));

        for id in 1..=1000 {
            let mut tx = store.begin().await.unwrap();
            tx.get_for_update(id).await.unwrap();
            tx.rollback().await.unwrap();
        }
        for recipient in 2..=500 {
            assert!(coordinator.transfer_funds(1, recipient, 1).await.is_err());
        }

        assert_eq!(store.locks.tracked_rows(), 0);
        assert_eq!(store.get(1).await.unwrap(), Some(record(1, 5000)));
    }

    #[tokio::test]
    async fn test_store_waits_for_row_lock() {
        let store = InMemoryWalletStore::new();
        store
            .store(WalletRecord {
                id: 1,
                owner_id: 7,
                balance: 100,
            })
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.get_for_update(1).await.unwrap();
        tx.update_balance(1, 40).await.unwrap();

        let reseed = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .store(WalletRecord {
                        id: 1,
                        owner_id: 9,
                        balance: 900,
                    })
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!reseed.is_finished());

        tx.commit().await.unwrap();
        reseed.await.unwrap().unwrap();

        // The later write wins whole; the committed row does not clobber it.
        assert_eq!(
            store.get(1).await.unwrap(),
            Some(WalletRecord {
                id: 1,
                owner_id: 9,
                balance: 900,
            })
        );
        assert_eq!(store.locks.tracked_rows(), 0);
    }
}
