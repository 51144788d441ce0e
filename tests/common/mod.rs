//! Common test utilities

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// Setup test database - connect and make sure the schema exists.
///
/// Tests run in parallel against the same database, so nothing is
/// truncated here; every test works on its own customer (see [`customer`]).
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    SCHEMA
        .get_or_init(|| async {
            mini_wallet::db::apply_schema(&pool)
                .await
                .expect("Failed to apply schema");
        })
        .await;

    pool
}

/// Unique customer id so tests sharing a database do not collide
pub fn customer(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Reference id scoped to a customer
pub fn reference(customer_xid: &str, name: &str) -> String {
    format!("{}-{}", customer_xid, name)
}
