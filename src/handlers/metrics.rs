//! Metrics HTTP handler.

use crate::{handlers::AppState, models::metrics::MetricsSnapshot, services::aggregation_service};
use axum::{Json, extract::State};
use chrono::Utc;

/// Top-line dashboard metrics.
///
/// # Endpoint
///
/// `GET /api/metrics`
///
/// Always answers 200. When the store is offline or a query fails, the body
/// holds placeholder figures.
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(aggregation_service::metrics_snapshot(state.store.as_ref(), Utc::now()).await)
}
