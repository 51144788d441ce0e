//! mini_wallet server
//!
//! Account initialization, wallet enable/disable, deposits and withdrawals
//! over HTTP, backed by PostgreSQL.

use std::net::SocketAddr;

use axum::Router;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mini_wallet::api::{self, AppState};
use mini_wallet::{db, Config, LogFormat};

const DEFAULT_LOG_FILTER: &str = "mini_wallet=debug,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Open the pool and refuse to start against an incomplete schema
async fn connect_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    db::verify_connection(&pool).await?;
    if !db::check_schema(&pool).await? {
        anyhow::bail!("wallet tables missing; apply migrations/0001_init.sql first");
    }

    tracing::info!(
        max_connections = config.database_max_connections,
        "Wallet database ready"
    );
    Ok(pool)
}

/// Permissive CORS outside production
fn with_cors(app: Router, config: &Config) -> Router {
    if config.is_production() {
        return app;
    }
    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(environment = %config.environment, "Starting mini_wallet");

    let pool = connect_database(&config).await?;
    let app = with_cors(api::build_app(AppState::postgres(pool.clone(), &config)), &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Accepting wallet requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("mini_wallet stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "ctrl_c", "Draining in-flight requests"),
        _ = terminate => tracing::info!(signal = "sigterm", "Draining in-flight requests"),
    }
}
