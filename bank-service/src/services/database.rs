//! Database service for bank-service.

use crate::config::DatabaseConfig;
use crate::models::{Account, CreateAccount, Entry, Transfer};
use crate::services::metrics::{ACCOUNTS_CREATED, DB_QUERY_DURATION};
use service_core::db::map_db_error;
use service_core::error::AppError;
use service_core::utils::Page;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(config), fields(service = "bank-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Account Operations
    // -------------------------------------------------------------------------

    /// Open an account with a zero balance.
    #[instrument(skip(self, input), fields(owner = %input.owner, currency = %input.currency))]
    pub async fn create_account(&self, input: &CreateAccount) -> Result<Account, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_account"])
            .start_timer();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO account (owner, balance, currency)
            VALUES ($1, 0, $2)
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(&input.owner)
        .bind(input.currency.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("create account", e))?;

        timer.observe_duration();

        ACCOUNTS_CREATED
            .with_label_values(&[input.currency.as_str()])
            .inc();
        info!(account_id = account.id, "Account created");

        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_account"])
            .start_timer();

        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get account", e))?;

        timer.observe_duration();

        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(&self, page: Page) -> Result<Vec<Account>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_accounts"])
            .start_timer();

        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM account
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list accounts", e))?;

        timer.observe_duration();

        Ok(accounts)
    }

    // -------------------------------------------------------------------------
    // Ledger Reads
    // -------------------------------------------------------------------------

    /// Entries of one account, newest first.
    #[instrument(skip(self))]
    pub async fn list_entries(&self, account_id: i64, page: Page) -> Result<Vec<Entry>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_entries"])
            .start_timer();

        let entries = sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, account_id, transfer_id, amount, created_at
            FROM entry
            WHERE account_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list entries", e))?;

        timer.observe_duration();

        Ok(entries)
    }

    #[instrument(skip(self))]
    pub async fn get_transfer(&self, id: i64) -> Result<Option<Transfer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_transfer"])
            .start_timer();

        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfer
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get transfer", e))?;

        timer.observe_duration();

        Ok(transfer)
    }

    /// The debit and credit entries written by one transfer.
    #[instrument(skip(self))]
    pub async fn transfer_entries(&self, transfer_id: i64) -> Result<Vec<Entry>, AppError> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, account_id, transfer_id, amount, created_at
            FROM entry
            WHERE transfer_id = $1
            ORDER BY id
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list transfer entries", e))
    }
}
