use marquee_core::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Transaction};
use std::time::Duration;
use tracing::{info, warn};

use crate::app_config::DatabaseConfig;

// Postgres SQLSTATE codes the ledger distinguishes.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Opens a transaction whose lock waits give up after `lock_wait` and then
/// takes the transaction-scoped advisory lock for `scope`. The lock is
/// released by commit or rollback.
pub(crate) async fn begin_scoped(
    pool: &Pool<Postgres>,
    scope: &str,
    lock_wait: Duration,
) -> Result<Transaction<'static, Postgres>, StoreError> {
    let mut tx = pool.begin().await.map_err(store_error)?;

    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(format!("{}ms", lock_wait.as_millis()))
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(scope)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

    Ok(tx)
}

/// Maps driver errors onto the store taxonomy. Contention and connectivity
/// become `Busy` so callers can retry; constraint hits are left to the
/// repositories, which know which constraint they were writing against.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            warn!("Database unavailable: {}", err);
            StoreError::Busy(err.to_string())
        }
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) | Some(LOCK_NOT_AVAILABLE)
            | Some(QUERY_CANCELED) => {
                warn!("Database contention: {}", db_err);
                StoreError::Busy(db_err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        },
        _ => StoreError::Backend(err.to_string()),
    }
}
