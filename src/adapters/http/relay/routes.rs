//! Route configuration for relay endpoints.
//!
//! Configures Axum router with relay-related routes.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health, list_groups, send_ai_message, send_custom_message, RelayAppState};

/// Creates the relay router with all endpoints.
///
/// Routes:
/// - `POST /send-ai-message` - Relay a message and wait for the correlated reply
/// - `POST /send-custom-message` - Queue an untagged message for a group
/// - `GET /groups` - List chats visible to the relay's account
pub fn relay_router() -> Router<RelayAppState> {
    Router::new()
        .route("/send-ai-message", post(send_ai_message))
        .route("/send-custom-message", post(send_custom_message))
        .route("/groups", get(list_groups))
}

/// Creates the unauthenticated health router.
///
/// Routes:
/// - `GET /health` - Liveness probe
pub fn health_router() -> Router<RelayAppState> {
    Router::new().route("/health", get(health))
}
