//! Transfer and entry models.

use super::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;

/// A single money movement between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Immutable ledger line. Negative amounts are debits, positive are credits.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub transfer_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Request to move `amount` minor units between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

impl TransferInput {
    /// Checks that need no database access.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.amount <= 0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "amount must be greater than zero"
            )));
        }
        if self.from_account_id == self.to_account_id {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "cannot transfer to the same account"
            )));
        }
        Ok(())
    }
}

/// Everything written by one committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}
