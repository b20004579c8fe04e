//! PostgreSQL helpers shared by the services.
//!
//! [`exec_tx`] is the only place a multi-statement unit of work is opened,
//! committed or rolled back. Callers hand it a closure that receives the
//! transaction-scoped connection and returns a boxed future:
//!
//! ```ignore
//! let transfer = exec_tx(&pool, IsolationLevel::ReadCommitted, move |conn| {
//!     Box::pin(async move {
//!         let transfer = insert_transfer(&mut *conn, from, to, amount).await?;
//!         insert_entry(&mut *conn, from, transfer.id, -amount).await?;
//!         insert_entry(&mut *conn, to, transfer.id, amount).await?;
//!         Ok(transfer)
//!     })
//! })
//! .await?;
//! ```
//!
//! Dropping the returned future (deadline, client disconnect) drops the open
//! transaction, which sqlx rolls back.

use crate::error::AppError;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnection, PgPool};
use tracing::{debug, error};

/// Isolation level applied right after `BEGIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    Serializable,
}

impl IsolationLevel {
    fn set_statement(self) -> &'static str {
        match self {
            Self::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            Self::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Run `work` inside one database transaction.
///
/// Commits when `work` succeeds. When it fails the transaction is rolled back
/// and the original error is returned; if the rollback fails as well the
/// result is [`AppError::RollbackFailed`] carrying both.
pub async fn exec_tx<T, F>(pool: &PgPool, isolation: IsolationLevel, work: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
{
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e)))?;

    if isolation != IsolationLevel::ReadCommitted {
        sqlx::query(isolation.set_statement())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("set isolation level", e))?;
    }

    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| map_db_error("commit transaction", e))?;
            Ok(value)
        }
        Err(err) => match tx.rollback().await {
            Ok(()) => {
                debug!(error = %err, "Transaction rolled back");
                Err(err)
            }
            Err(rollback_err) => {
                error!(error = %rollback_err, original = %err, "Transaction rollback failed");
                Err(AppError::RollbackFailed {
                    original: Box::new(err),
                    rollback: anyhow::Error::new(rollback_err),
                })
            }
        },
    }
}

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Classify a driver error into the service error taxonomy.
///
/// `context` names the operation, e.g. `"create reservation"`.
pub fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        ) {
            return AppError::Conflict(anyhow::anyhow!(
                "{}: conflicting concurrent transaction, retry the request",
                context
            ));
        }
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return AppError::BadRequest(anyhow::anyhow!("{}: numeric value out of range", context));
        }
        if db_err.is_unique_violation() {
            return AppError::Conflict(anyhow::anyhow!("{}: record already exists", context));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(anyhow::anyhow!(
                "{}: referenced record is missing or still in use",
                context
            ));
        }
        if db_err.is_check_violation() {
            return AppError::BadRequest(anyhow::anyhow!("{}: {}", context, db_err.message()));
        }
    }

    AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", context, err))
}
