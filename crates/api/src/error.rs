//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use card_store::CardStoreError;

/// Body text sent when the store cannot be reached.
pub const CONNECT_ERROR_MESSAGE: &str = "Unable to connect to the MySQL server.";

/// Body text sent when the store was reached but the read failed.
pub const QUERY_ERROR_MESSAGE: &str = "Unable to query card status.";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The card store could not be reached.
    StoreUnavailable(String),
    /// Internal server error. The detail is logged, never sent.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "card store unavailable");
                CONNECT_ERROR_MESSAGE
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                QUERY_ERROR_MESSAGE
            }
        };

        let body = serde_json::json!({ "error": message });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl From<CardStoreError> for ApiError {
    fn from(err: CardStoreError) -> Self {
        metrics::counter!("card_status_store_errors_total", "kind" => err.kind()).increment(1);
        match err {
            CardStoreError::Connection(_) => ApiError::StoreUnavailable(err.to_string()),
            CardStoreError::Query(_) => ApiError::Internal(err.to_string()),
        }
    }
}
