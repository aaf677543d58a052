//! Transaction HTTP handlers.
//!
//! This module implements the transaction listing endpoints:
//! - GET /api/transactions?limit=N - Latest transactions, newest first
//! - GET /api/transactions/weekly - Amounts per day over the last 7 days

use crate::{
    error::AppError,
    handlers::AppState,
    models::{metrics::WeeklyBucket, transaction::TransactionView},
    services::aggregation_service::{self, DEFAULT_LATEST_LIMIT},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;

/// Query string of the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    /// Number of transactions to return (defaults to 5, capped at 500)
    pub limit: Option<i64>,
}

/// List the latest transactions.
///
/// # Response (200)
///
/// ```json
/// [
///   {
///     "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
///     "amount": 123.45,
///     "currency": "EUR",
///     "status": "completed",
///     "type": "payin",
///     "partner": "Pharmacie Centrale",
///     "reference": "INV-20251221-0",
///     "occurred_at": "2025-12-21T16:00:00Z"
///   }
/// ]
/// ```
///
/// # Errors
///
/// - `InvalidRequest` (400): `limit` is zero or negative
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<TransactionView>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    if limit < 1 {
        return Err(AppError::InvalidRequest(
            "limit must be a positive integer".to_string(),
        ));
    }

    let transactions =
        aggregation_service::latest_transactions(state.store.as_ref(), limit, Utc::now()).await;
    Ok(Json(transactions))
}

/// Amounts per calendar day for the last 7 days, oldest first.
///
/// # Response (200)
///
/// ```json
/// [
///   { "date": "2025-12-15", "amount": 1520.4 },
///   ...
///   { "date": "2025-12-21", "amount": 980.0 }
/// ]
/// ```
pub async fn weekly_transactions(State(state): State<AppState>) -> Json<Vec<WeeklyBucket>> {
    Json(aggregation_service::weekly_rollup(state.store.as_ref(), Utc::now()).await)
}
