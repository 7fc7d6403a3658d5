//! API key middleware for axum.
//!
//! Every relay endpoint sits behind this layer. The middleware uses the
//! `ApiKeyValidator` port, so key storage can change without touching it.
//!
//! Expects the key in the `x-api-key` header:
//! ```text
//! x-api-key: <key>
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::ports::ApiKeyValidator;

/// API key middleware state - wraps the validator.
pub type ApiKeyState = Arc<dyn ApiKeyValidator>;

/// Middleware that rejects requests without a valid API key.
///
/// 1. Extracts the key from the `x-api-key` header
/// 2. Validates it using the `ApiKeyValidator` port
/// 3. On success, passes the request through unchanged
/// 4. On missing or invalid key, returns 401 Unauthorized
pub async fn api_key_middleware(
    State(validator): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    match key {
        Some(key) if validator.is_valid(key).await => next.run(request).await,
        Some(_) => {
            tracing::warn!("request rejected: invalid API key");
            unauthorized("Invalid API key", "INVALID_API_KEY")
        }
        None => unauthorized("API key required", "MISSING_API_KEY"),
    }
}

fn unauthorized(message: &str, code: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": code
        })),
    )
        .into_response()
}
