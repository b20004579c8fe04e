//! Transfer engine: moves money between two accounts in one transaction.

use crate::models::{Account, TransferInput, TransferResult};
use crate::services::metrics::{DB_QUERY_DURATION, TRANSFERS_TOTAL};
use crate::services::{queries, Database};
use service_core::db::{exec_tx, IsolationLevel};
use service_core::error::AppError;
use sqlx::PgConnection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct TransferEngine {
    db: Arc<Database>,
}

impl TransferEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Move `input.amount` from the source to the destination account.
    ///
    /// Either the transfer row, both entries and both balance updates commit
    /// together, or nothing is written.
    #[instrument(
        skip(self),
        fields(
            from_account_id = input.from_account_id,
            to_account_id = input.to_account_id,
            amount = input.amount
        )
    )]
    pub async fn transfer(&self, input: TransferInput) -> Result<TransferResult, AppError> {
        if let Err(e) = input.validate() {
            TRANSFERS_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(e);
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["transfer"])
            .start_timer();

        let result = exec_tx(self.db.pool(), IsolationLevel::ReadCommitted, move |conn| {
            Box::pin(apply_transfer(conn, input))
        })
        .await;

        timer.observe_duration();

        match &result {
            Ok(res) => {
                TRANSFERS_TOTAL.with_label_values(&["ok"]).inc();
                info!(
                    transfer_id = res.transfer.id,
                    from_balance = res.from_account.balance,
                    to_balance = res.to_account.balance,
                    "Transfer committed"
                );
            }
            Err(e) => {
                TRANSFERS_TOTAL.with_label_values(&[outcome_label(e)]).inc();
                warn!(error = %e, "Transfer aborted");
            }
        }

        result
    }
}

fn outcome_label(err: &AppError) -> &'static str {
    match err.root() {
        AppError::BadRequest(_) | AppError::ValidationError(_) => "rejected",
        AppError::NotFound(_) => "not_found",
        AppError::Conflict(_) => "conflict",
        _ => "error",
    }
}

/// The transfer unit of work.
///
/// Both account rows are locked first, then the writes happen in a fixed
/// order: transfer record, debit entry, credit entry, balances.
pub async fn apply_transfer(
    conn: &mut PgConnection,
    input: TransferInput,
) -> Result<TransferResult, AppError> {
    let TransferInput {
        from_account_id,
        to_account_id,
        amount,
    } = input;

    let locked = queries::lock_accounts(conn, &[from_account_id, to_account_id]).await?;
    let from = find_account(&locked, from_account_id)?;
    let to = find_account(&locked, to_account_id)?;

    if from.currency != to.currency {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "currency mismatch: account {} holds {} but account {} holds {}",
            from.id,
            from.currency,
            to.id,
            to.currency
        )));
    }
    if from.balance < amount {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "insufficient funds: account {} has {} but the transfer needs {}",
            from.id,
            from.balance,
            amount
        )));
    }
    check_credit(to, amount)?;

    let transfer = queries::insert_transfer(conn, from_account_id, to_account_id, amount).await?;
    let from_entry = queries::insert_entry(conn, from_account_id, transfer.id, -amount).await?;
    let to_entry = queries::insert_entry(conn, to_account_id, transfer.id, amount).await?;

    // Same order as the row locks.
    let (from_account, to_account) = if from_account_id < to_account_id {
        let from_account = queries::add_account_balance(conn, from_account_id, -amount).await?;
        let to_account = queries::add_account_balance(conn, to_account_id, amount).await?;
        (from_account, to_account)
    } else {
        let to_account = queries::add_account_balance(conn, to_account_id, amount).await?;
        let from_account = queries::add_account_balance(conn, from_account_id, -amount).await?;
        (from_account, to_account)
    };

    Ok(TransferResult {
        transfer,
        from_entry,
        to_entry,
        from_account,
        to_account,
    })
}

fn check_credit(to: &Account, amount: i64) -> Result<(), AppError> {
    match to.balance.checked_add(amount) {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(anyhow::anyhow!(
            "transfer would overflow the balance of account {}",
            to.id
        ))),
    }
}

fn find_account(accounts: &[Account], id: i64) -> Result<&Account, AppError> {
    accounts
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("account {} not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(id: i64, balance: i64) -> Account {
        Account {
            id,
            owner: format!("owner-{}", id),
            balance,
            currency: "USD".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn find_account_reports_missing_id() {
        let accounts = vec![account(1, 500)];
        assert_eq!(find_account(&accounts, 1).unwrap().balance, 500);

        let err = find_account(&accounts, 2).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(err.to_string().contains("account 2 not found"));
    }

    #[test]
    fn credit_that_overflows_the_balance_is_rejected() {
        assert!(check_credit(&account(2, 1_000), 500).is_ok());
        assert!(check_credit(&account(2, i64::MAX - 500), 500).is_ok());

        let err = check_credit(&account(2, i64::MAX), 1).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("overflow the balance of account 2"));
    }

    #[test]
    fn outcome_label_looks_through_rollback_failures() {
        let err = AppError::RollbackFailed {
            original: Box::new(AppError::NotFound(anyhow::anyhow!("account 9 not found"))),
            rollback: anyhow::anyhow!("connection closed"),
        };
        assert_eq!(outcome_label(&err), "not_found");
        assert_eq!(
            outcome_label(&AppError::DatabaseError(anyhow::anyhow!("boom"))),
            "error"
        );
    }
}
