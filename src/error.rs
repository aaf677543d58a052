//! Error types and HTTP error response handling.
//!
//! Two families live here:
//! - [`StoreError`]: failures reported by a transaction store. These never
//!   reach the HTTP caller; the aggregation service turns them into
//!   placeholder payloads.
//! - [`AppError`]: request-level errors that do become HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

/// Failure of a transaction store operation.
///
/// `Unavailable` means the store was never configured or could not be
/// reached at startup. Every other variant is a query that failed after the
/// store reported itself available.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No database handle is configured.
    #[error("Transaction store unavailable")]
    Unavailable,

    /// The database rejected or failed a query.
    #[error("Store query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The query did not complete within the configured timeout.
    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),

    /// A row could not be turned into a transaction record.
    #[error("Could not decode transaction: {0}")]
    Decode(String),
}

impl StoreError {
    /// True for the "store not configured" kind, false for query failures.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable)
    }
}

/// Request-level error type.
///
/// Aggregation endpoints never fail because of the store; the only errors a
/// caller can see come from invalid request parameters.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_request",
///     "message": "limit must be a positive integer"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
