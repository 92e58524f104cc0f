#![allow(dead_code)]

use async_trait::async_trait;
use std::io::Write;
use tempfile::NamedTempFile;
use wallet_transfer::application::coordinator::TransferCoordinator;
use wallet_transfer::domain::ports::{WalletStore, WalletTransaction, WalletTransactionBox};
use wallet_transfer::domain::wallet::{Money, WalletId, WalletRecord};
use wallet_transfer::error::{Result, WalletError};
use wallet_transfer::infrastructure::StoreConfig;
use wallet_transfer::infrastructure::in_memory::InMemoryWalletStore;

pub fn record(id: WalletId, balance: Money) -> WalletRecord {
    WalletRecord {
        id,
        owner_id: id,
        balance,
    }
}

pub async fn seeded_store(rows: &[(WalletId, Money)], config: StoreConfig) -> InMemoryWalletStore {
    let store = InMemoryWalletStore::with_config(config);
    for &(id, balance) in rows {
        store.store(record(id, balance)).await.unwrap();
    }
    store
}

pub async fn seeded_coordinator(rows: &[(WalletId, Money)]) -> TransferCoordinator {
    TransferCoordinator::new(Box::new(seeded_store(rows, StoreConfig::default()).await))
}

pub async fn balance(coordinator: &TransferCoordinator, id: WalletId) -> Money {
    coordinator.store().get(id).await.unwrap().unwrap().balance
}

pub fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// Wraps an in-memory store and fails any balance write to `fail_on`.
#[derive(Clone)]
pub struct FailingWriteStore {
    pub inner: InMemoryWalletStore,
    pub fail_on: WalletId,
}

#[async_trait]
impl WalletStore for FailingWriteStore {
    async fn begin(&self) -> Result<WalletTransactionBox> {
        Ok(Box::new(FailingWriteTransaction {
            inner: self.inner.begin().await?,
            fail_on: self.fail_on,
        }))
    }

    async fn store(&self, record: WalletRecord) -> Result<()> {
        self.inner.store(record).await
    }

    async fn get(&self, id: WalletId) -> Result<Option<WalletRecord>> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<WalletRecord>> {
        self.inner.get_all().await
    }
}

struct FailingWriteTransaction {
    inner: WalletTransactionBox,
    fail_on: WalletId,
}

#[async_trait]
impl WalletTransaction for FailingWriteTransaction {
    async fn get_for_update(&mut self, id: WalletId) -> Result<Option<WalletRecord>> {
        self.inner.get_for_update(id).await
    }

    async fn update_balance(&mut self, id: WalletId, balance: Money) -> Result<()> {
        if id == self.fail_on {
            return Err(WalletError::IoError(std::io::Error::other(
                "injected write failure",
            )));
        }
        self.inner.update_balance(id, balance).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.inner.rollback().await
    }
}
