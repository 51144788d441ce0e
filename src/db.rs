//! Database module
//!
//! Database connection and schema utilities.

use sqlx::{Executor, PgPool};

/// Schema applied by [`apply_schema`]
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Tables the server refuses to start without
pub const REQUIRED_TABLES: &[&str] = &["accounts", "wallets", "deposits", "withdrawals"];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create any missing tables and indexes. Safe to run repeatedly.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(SCHEMA_SQL).await?;
    tracing::info!("Database schema applied");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
