use crate::domain::wallet::WalletId;
use crate::error::{Result, WalletError};
use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = HashMap<WalletId, Arc<Mutex<()>>>;

/// Settings shared by the store adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// How long a transaction waits for a row lock. `None` waits forever.
    pub lock_timeout: Option<Duration>,
}

/// Exclusive per-row lock table.
///
/// Each wallet id maps to its own `tokio::sync::Mutex`, so transactions on
/// disjoint rows never contend while transactions sharing a row queue on it.
/// An entry only lives while someone holds or waits for that row; the last
/// one out removes it. Cloning shares the table.
#[derive(Clone, Default)]
pub struct RowLocks {
    rows: Arc<std::sync::Mutex<LockTable>>,
    lock_timeout: Option<Duration>,
}

impl RowLocks {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            rows: Arc::default(),
            lock_timeout: config.lock_timeout,
        }
    }

    // Never held across an await.
    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of rows currently held or waited on.
    pub fn tracked_rows(&self) -> usize {
        self.table().len()
    }

    /// Waits for the exclusive lock on one row.
    pub async fn lock_row(&self, id: WalletId) -> Result<RowGuard> {
        let row = self.table().entry(id).or_default().clone();

        let guard = match self.lock_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, row.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    // Our handle on the row is gone with the cancelled wait.
                    remove_if_idle(&mut self.table(), id);
                    return Err(WalletError::LockTimeout(id));
                }
            },
            None => row.lock_owned().await,
        };

        Ok(RowGuard {
            id,
            guard: Some(guard),
            locks: self.clone(),
        })
    }
}

// The table's own `Arc` is the only one left once nobody holds or awaits the row.
fn remove_if_idle(rows: &mut LockTable, id: WalletId) {
    if rows.get(&id).is_some_and(|row| Arc::strong_count(row) == 1) {
        rows.remove(&id);
    }
}

/// Exclusive lock on one row, released on drop.
pub struct RowGuard {
    id: WalletId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: RowLocks,
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        let mut rows = self.locks.table();
        self.guard.take();
        remove_if_idle(&mut rows, self.id);
    }
}

/// The row locks owned by a single transaction. Dropping it releases them all.
#[derive(Default)]
pub struct HeldLocks {
    guards: HashMap<WalletId, RowGuard>,
}

impl HeldLocks {
    pub async fn lock(&mut self, locks: &RowLocks, id: WalletId) -> Result<()> {
        if self.guards.contains_key(&id) {
            return Ok(());
        }
        let guard = locks.lock_row(id).await?;
        tracing::trace!(wallet_id = id, "Row lock acquired");
        self.guards.insert(id, guard);
        Ok(())
    }

    pub fn ensure_held(&self, id: WalletId) -> Result<()> {
        if self.guards.contains_key(&id) {
            Ok(())
        } else {
            Err(WalletError::internal(format!(
                "wallet {id} was not locked by this transaction"
            )))
        }
    }
}
