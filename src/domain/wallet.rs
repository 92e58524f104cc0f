use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a wallet row (and of its owner).
pub type WalletId = i64;

/// An amount of money in minor currency units (e.g. cents).
pub type Money = i64;

/// Which side of a transfer a wallet plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletRole {
    Sender,
    Recipient,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletRole::Sender => f.write_str("Sender"),
            WalletRole::Recipient => f.write_str("Recipient"),
        }
    }
}

/// A wallet row exactly as it is persisted.
///
/// No invariants are enforced here: storage is allowed to hold whatever was
/// written to it, and rows are only trusted once turned into a [`Wallet`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct WalletRecord {
    pub id: WalletId,
    pub owner_id: WalletId,
    pub balance: Money,
}

/// Validated, immutable wallet value.
///
/// Every operation returns fresh instances and leaves `self` untouched.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Wallet {
    id: WalletId,
    owner_id: WalletId,
    balance: Money,
}

impl Wallet {
    pub fn new(id: WalletId, owner_id: WalletId, balance: Money) -> Result<Self> {
        if id <= 0 {
            return Err(WalletError::InvalidWallet("ID must be positive".to_string()));
        }
        if owner_id <= 0 {
            return Err(WalletError::InvalidWallet(
                "Owner ID must be positive".to_string(),
            ));
        }
        if balance < 0 {
            return Err(WalletError::InvalidWallet(
                "Balance cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            id,
            owner_id,
            balance,
        })
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn owner_id(&self) -> WalletId {
        self.owner_id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Returns a copy of this wallet credited with `amount`.
    pub fn deposit(&self, amount: Money) -> Result<Self> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(
                "Deposit amount must be positive".to_string(),
            ));
        }
        let balance = self.balance.checked_add(amount).ok_or_else(|| {
            WalletError::InvalidAmount("Deposit amount would overflow balance".to_string())
        })?;
        Self::new(self.id, self.owner_id, balance)
    }

    /// Returns a copy of this wallet debited by `amount`.
    pub fn withdraw(&self, amount: Money) -> Result<Self> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(
                "Withdrawal amount must be positive".to_string(),
            ));
        }
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds(
                "Insufficient funds".to_string(),
            ));
        }
        Self::new(self.id, self.owner_id, self.balance - amount)
    }

    /// Moves `amount` from this wallet to `recipient`.
    ///
    /// Returns the new `(sender, recipient)` pair. Both are rebuilt through
    /// [`Wallet::new`], so the invariants are checked again on the way out.
    pub fn transfer(&self, amount: Money, recipient: &Wallet) -> Result<(Wallet, Wallet)> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(
                "Transfer amount must be positive".to_string(),
            ));
        }
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds(
                "Insufficient funds for transfer".to_string(),
            ));
        }
        let credited = recipient.balance.checked_add(amount).ok_or_else(|| {
            WalletError::InvalidAmount(
                "Transfer amount would overflow recipient balance".to_string(),
            )
        })?;

        let new_sender = Wallet::new(self.id, self.owner_id, self.balance - amount)?;
        let new_recipient = Wallet::new(recipient.id, recipient.owner_id, credited)?;
        Ok((new_sender, new_recipient))
    }
}

impl TryFrom<WalletRecord> for Wallet {
    type Error = WalletError;

    fn try_from(record: WalletRecord) -> Result<Self> {
        Self::new(record.id, record.owner_id, record.balance)
    }
}

impl From<Wallet> for WalletRecord {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            owner_id: wallet.owner_id,
            balance: wallet.balance,
        }
    }
}
