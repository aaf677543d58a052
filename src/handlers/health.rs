//! Liveness and store diagnostic endpoints for service monitoring.

use crate::handlers::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

/// Longest store error message echoed back by the diagnostic endpoint.
const MAX_ERROR_CHARS: usize = 50;

/// Static liveness message.
///
/// # Endpoint
///
/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Health Payments Backoffice API" }))
}

/// Store connectivity report.
#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    /// Always "running" when the handler answers
    pub backend: String,

    /// Store state, including a truncated error when the probe failed
    pub database: String,

    /// Whether `DATABASE_URL` was set; the URL itself is never returned
    pub database_url: String,

    pub database_name: Option<String>,

    pub connection_status: String,

    /// Up to ten table names
    pub collections: Vec<String>,
}

/// Store diagnostic handler.
///
/// # Endpoint
///
/// `GET /test`
///
/// Unlike the aggregation endpoints, this reports store errors to the
/// caller, cut to the first 50 characters. It still answers 200.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "backend": "running",
///   "database": "connected & working",
///   "database_url": "set",
///   "database_name": "backoffice",
///   "connection_status": "Connected",
///   "collections": ["_sqlx_migrations", "transactions"]
/// }
/// ```
pub async fn store_diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "running".to_string(),
        database: "not available".to_string(),
        database_url: (if state.database_url_set { "set" } else { "not set" }).to_string(),
        database_name: None,
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    if !state.store.is_available().await {
        return Json(response);
    }

    response.connection_status = "Connected".to_string();
    match state.store.probe().await {
        Ok(probe) => {
            response.database = "connected & working".to_string();
            response.database_name = Some(probe.database_name);
            response.collections = probe.collections;
        }
        Err(err) => {
            tracing::warn!(error = %err, "Store probe failed");
            let message: String = err.to_string().chars().take(MAX_ERROR_CHARS).collect();
            response.database = format!("connected but error: {message}");
        }
    }

    Json(response)
}
