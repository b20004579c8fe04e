//! Statements that run on a transaction-scoped connection.
//!
//! Everything here takes `&mut PgConnection` so it can only be composed inside
//! [`service_core::db::exec_tx`] (or a plain connection in tests).

use crate::models::{Account, Entry, Transfer};
use service_core::db::map_db_error;
use service_core::error::AppError;
use sqlx::PgConnection;
use tracing::instrument;

/// Lock the given accounts in ascending id order for the rest of the transaction.
///
/// Two transfers touching the same pair of accounts always take the row locks
/// in the same order, so they queue instead of deadlocking.
#[instrument(skip(conn))]
pub async fn lock_accounts(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Account>, AppError> {
    let ids = ids.to_vec();
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM account
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_db_error("lock accounts", e))
}

#[instrument(skip(conn))]
pub async fn insert_transfer(
    conn: &mut PgConnection,
    from_account_id: i64,
    to_account_id: i64,
    amount: i64,
) -> Result<Transfer, AppError> {
    sqlx::query_as::<_, Transfer>(
        r#"
        INSERT INTO transfer (from_account_id, to_account_id, amount)
        VALUES ($1, $2, $3)
        RETURNING id, from_account_id, to_account_id, amount, created_at
        "#,
    )
    .bind(from_account_id)
    .bind(to_account_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error("create transfer", e))
}

#[instrument(skip(conn))]
pub async fn insert_entry(
    conn: &mut PgConnection,
    account_id: i64,
    transfer_id: i64,
    amount: i64,
) -> Result<Entry, AppError> {
    sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entry (account_id, transfer_id, amount)
        VALUES ($1, $2, $3)
        RETURNING id, account_id, transfer_id, amount, created_at
        "#,
    )
    .bind(account_id)
    .bind(transfer_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error("create entry", e))
}

/// Apply a signed delta to an account balance.
#[instrument(skip(conn))]
pub async fn add_account_balance(
    conn: &mut PgConnection,
    account_id: i64,
    delta: i64,
) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>(
        r#"
        UPDATE account
        SET balance = balance + $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(account_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_db_error("update account balance", e))?
    .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("account {} not found", account_id)))
}
