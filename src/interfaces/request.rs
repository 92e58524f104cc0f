use crate::application::coordinator::TransferCoordinator;
use crate::domain::wallet::{Money, Wallet, WalletId};
use crate::error::{ErrorKind, Result, WalletError};
use serde::Deserialize;
use std::fmt;

/// A transfer request as received at the boundary.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct TransferRequest {
    pub sender: WalletId,
    pub recipient: WalletId,
    pub amount: Money,
}

impl TransferRequest {
    /// Coarse checks done before the coordinator is involved.
    pub fn validate(&self) -> Result<()> {
        if self.sender <= 0 || self.recipient <= 0 {
            return Err(WalletError::InvalidRequest(
                "wallet IDs must be positive integers".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(WalletError::InvalidRequest(
                "Transfer amount must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates the request and hands it to the coordinator.
    pub async fn submit(&self, coordinator: &TransferCoordinator) -> Result<(Wallet, Wallet)> {
        self.validate()?;
        coordinator
            .transfer_funds(self.sender, self.recipient, self.amount)
            .await
    }
}

/// Coarse response class reported to whoever submitted the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Failure,
}

impl From<&WalletError> for ErrorCategory {
    fn from(error: &WalletError) -> Self {
        match error.kind() {
            ErrorKind::WalletNotFound(_) => ErrorCategory::NotFound,
            ErrorKind::InsufficientFunds | ErrorKind::InvalidRequest => ErrorCategory::Validation,
            _ => ErrorCategory::Failure,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::NotFound => f.write_str("not_found"),
            ErrorCategory::Validation => f.write_str("validation"),
            ErrorCategory::Failure => f.write_str("failure"),
        }
    }
}
