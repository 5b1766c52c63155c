//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::{CartError, CheckoutError};

/// API-level error type that maps to HTTP responses.
///
/// Rendered as `{ "detail": <reason> }`, the body shape the storefront
/// client parses for every failure.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "detail": detail });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match &err {
            // The storefront client matches on this exact message.
            CartError::UnknownProduct(_) => ApiError::NotFound("Item not found".to_string()),
            CartError::InvalidQuantity => ApiError::BadRequest(err.to_string()),
            CartError::QuantityOverflow => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::EmptyCart => ApiError::BadRequest(err.to_string()),
            CheckoutError::UnknownProduct(_) => ApiError::NotFound(err.to_string()),
            CheckoutError::Discount(inner) => ApiError::BadRequest(inner.to_string()),
        }
    }
}
