use crate::domain::ports::{WalletStore, WalletStoreBox, WalletTransactionBox};
use crate::domain::wallet::{Money, Wallet, WalletId, WalletRole};
use crate::error::{Result, WalletError};
use tracing::{debug, error, info};

/// Moves money between two wallets inside one store transaction.
///
/// The coordinator holds no in-process locks of its own. Mutual exclusion over
/// wallet rows comes entirely from the store's row locks, so a single
/// coordinator can be shared (e.g. behind an `Arc`) by any number of tasks.
pub struct TransferCoordinator {
    store: WalletStoreBox,
}

impl TransferCoordinator {
    pub fn new(store: WalletStoreBox) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn WalletStore {
        self.store.as_ref()
    }

    /// Transfers `amount` minor units from `sender_id` to `recipient_id`.
    ///
    /// Returns the updated `(sender, recipient)` wallets. On any failure the
    /// transaction is rolled back and neither row changes.
    pub async fn transfer_funds(
        &self,
        sender_id: WalletId,
        recipient_id: WalletId,
        amount: Money,
    ) -> Result<(Wallet, Wallet)> {
        if sender_id == recipient_id {
            return Err(WalletError::SameWallet);
        }

        let mut tx = self.store.begin().await?;

        match Self::apply(&mut tx, sender_id, recipient_id, amount).await {
            Ok((sender, recipient)) => {
                tx.commit().await?;
                info!(
                    sender_id,
                    recipient_id,
                    amount,
                    sender_balance = sender.balance(),
                    recipient_balance = recipient.balance(),
                    "Transfer committed"
                );
                Ok((sender, recipient))
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(sender_id, recipient_id, error = %rollback_err, "Rollback failed");
                }
                info!(sender_id, recipient_id, amount, kind = ?e.kind(), error = %e, "Transfer rejected");
                Err(e)
            }
        }
    }

    async fn apply(
        tx: &mut WalletTransactionBox,
        sender_id: WalletId,
        recipient_id: WalletId,
        amount: Money,
    ) -> Result<(Wallet, Wallet)> {
        // Rows are always locked lowest id first so two transfers over the same
        // pair, in either direction, cannot deadlock.
        let (first, second) = if sender_id < recipient_id {
            (sender_id, recipient_id)
        } else {
            (recipient_id, sender_id)
        };
        let first_row = tx.get_for_update(first).await?;
        let second_row = tx.get_for_update(second).await?;
        debug!(first, second, "Wallet rows locked");

        let (sender_row, recipient_row) = if first == sender_id {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let sender_row = sender_row.ok_or(WalletError::WalletNotFound(WalletRole::Sender))?;
        let recipient_row =
            recipient_row.ok_or(WalletError::WalletNotFound(WalletRole::Recipient))?;

        let sender = Wallet::try_from(sender_row)?;
        let recipient = Wallet::try_from(recipient_row)?;

        let (new_sender, new_recipient) = sender.transfer(amount, &recipient)?;

        tx.update_balance(new_sender.id(), new_sender.balance()).await?;
        tx.update_balance(new_recipient.id(), new_recipient.balance()).await?;

        Ok((new_sender, new_recipient))
    }
}
