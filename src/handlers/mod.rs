//! HTTP request handlers (route handlers).
//!
//! Handlers are thin: they read request parameters, call the aggregation
//! service with the shared store, and serialize the result.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::TransactionStore;

/// Liveness and store diagnostics
pub mod health;
/// Dashboard metrics endpoint
pub mod metrics;
/// Latest transactions and weekly rollup endpoints
pub mod transactions;

/// State shared by all handlers.
///
/// The store handle is read-only and shared by every concurrent request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,

    /// Reported by the diagnostic endpoint
    pub database_url_set: bool,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/test", get(health::store_diagnostics))
        .route("/api/metrics", get(metrics::get_metrics))
        .route("/api/transactions", get(transactions::list_transactions))
        .route(
            "/api/transactions/weekly",
            get(transactions::weekly_transactions),
        )
        // The dashboard front-end is served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
