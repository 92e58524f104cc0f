use crate::domain::wallet::{WalletId, WalletRole};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("{0}")]
    InvalidWallet(String),
    #[error("{0}")]
    InvalidAmount(String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("{0} wallet not found")]
    WalletNotFound(WalletRole),
    #[error("Sender and recipient must be different wallets")]
    SameWallet,
    #[error("Timed out waiting for lock on wallet {0}")]
    LockTimeout(WalletId),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

/// Failure kind a caller can branch on without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidWallet,
    InvalidAmount,
    InsufficientFunds,
    WalletNotFound(WalletRole),
    SameWallet,
    LockTimeout,
    InvalidRequest,
    Storage,
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidWallet(_) => ErrorKind::InvalidWallet,
            WalletError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            WalletError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            WalletError::WalletNotFound(role) => ErrorKind::WalletNotFound(*role),
            WalletError::SameWallet => ErrorKind::SameWallet,
            WalletError::LockTimeout(_) => ErrorKind::LockTimeout,
            WalletError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            _ => ErrorKind::Storage,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        WalletError::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
