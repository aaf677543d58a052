//! Payments Backoffice - Main Application Entry Point
//!
//! Read-only REST API behind the payments dashboard. It derives the running
//! balance, today's activity, pending payouts, the success rate and a 7-day
//! rollup from the transaction ledger.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries), behind the
//!   `TransactionStore` trait
//! - **Money**: `rust_decimal`, rounded half away from zero
//! - **Format**: JSON responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool, if `DATABASE_URL` is set
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port
//!
//! Without a `DATABASE_URL` the server answers every endpoint with
//! placeholder data. A configured database that is down serves degraded
//! payloads until it comes back.

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::handlers::AppState;
use crate::store::postgres::PgTransactionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let store = connect_store(&config).await;
    let state = AppState {
        store: Arc::new(store),
        database_url_set: config.database_configured(),
    };

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the transaction store.
///
/// Only a missing or unparsable `DATABASE_URL` puts the service in demo mode.
/// A configured database that cannot be reached yet is still handed to the
/// store; its queries fail until it comes back.
async fn connect_store(config: &config::Config) -> PgTransactionStore {
    let Some(url) = config.database_url.as_deref().filter(|_| config.database_configured()) else {
        tracing::warn!("DATABASE_URL not set, serving placeholder data");
        return PgTransactionStore::unavailable();
    };

    let pool = match db::create_pool(url, config.database_max_connections, config.query_timeout()) {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "Invalid DATABASE_URL, serving placeholder data");
            return PgTransactionStore::unavailable();
        }
    };
    tracing::info!("Database pool created");

    if config.run_migrations {
        match db::run_migrations(&pool).await {
            Ok(()) => tracing::info!("Database migrations complete"),
            Err(err) => tracing::warn!(error = %err, "Database migrations failed"),
        }
    }

    PgTransactionStore::new(pool, config.query_timeout())
}
