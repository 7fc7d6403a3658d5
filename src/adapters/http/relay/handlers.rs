//! HTTP handlers for relay endpoints.
//!
//! These handlers connect Axum routes to the application-layer relay
//! service and translate its errors into status codes:
//!
//! - expired wait -> 504, so callers can distinguish "no reply yet" from a
//!   broken upstream and simply retry
//! - transport failures -> 502
//! - full dispatch queue -> 503
//! - preamble problems -> 500 (operator misconfiguration)

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{DispatchError, RelayError, RelayService};
use crate::domain::correlation::CorrelationError;
use crate::domain::foundation::{ConversationId, GroupId};

use super::dto::{
    ErrorResponse, GroupListResponse, QueuedResponse, SendAiMessageRequest,
    SendCustomMessageRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for the relay endpoints.
#[derive(Clone)]
pub struct RelayAppState {
    pub service: Arc<RelayService>,
}

impl RelayAppState {
    pub fn new(service: Arc<RelayService>) -> Self {
        Self { service }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /send-ai-message - Relay a message and wait for the correlated reply.
///
/// The response body is the extracted reply payload as-is; the handler adds
/// no envelope around it.
pub async fn send_ai_message(
    State(state): State<RelayAppState>,
    Json(request): Json<SendAiMessageRequest>,
) -> Result<impl IntoResponse, RelayApiError> {
    let message = require_field(request.message, "message")?;
    let session_id = require_field(request.session_id, "session_id")?;
    let conversation_id = ConversationId::new(&session_id)
        .map_err(|_| RelayApiError::BadRequest("session_id must not be blank".to_string()))?;

    let payload = state
        .service
        .send_ai_message(conversation_id, &message)
        .await?;

    Ok((StatusCode::OK, Json(payload.into_value())))
}

/// POST /send-custom-message - Queue an untagged message for a group.
pub async fn send_custom_message(
    State(state): State<RelayAppState>,
    Json(request): Json<SendCustomMessageRequest>,
) -> Result<impl IntoResponse, RelayApiError> {
    let group_id = require_field(request.group_id, "group_id")?;
    let message = require_field(request.message, "message")?;
    let group_id = GroupId::new(&group_id)
        .map_err(|_| RelayApiError::BadRequest("group_id must not be blank".to_string()))?;

    state.service.send_custom_message(group_id, &message)?;

    Ok((StatusCode::ACCEPTED, Json(QueuedResponse::new())))
}

/// GET /groups - List the chats visible to the relay's account.
///
/// Discovery aid for operators picking a group id to configure; the listing
/// is read straight from the chat backend on every call.
pub async fn list_groups(
    State(state): State<RelayAppState>,
) -> Result<impl IntoResponse, RelayApiError> {
    let groups = state.service.list_groups().await?;
    Ok(Json(GroupListResponse::new(groups)))
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn require_field(value: Option<String>, name: &'static str) -> Result<String, RelayApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayApiError::BadRequest(format!("{name} is required"))),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Errors produced by the relay endpoints.
#[derive(Debug)]
pub enum RelayApiError {
    /// Malformed or incomplete request body.
    BadRequest(String),
    /// Failure from the relay service.
    Relay(RelayError),
}

impl From<RelayError> for RelayApiError {
    fn from(err: RelayError) -> Self {
        Self::Relay(err)
    }
}

impl IntoResponse for RelayApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(message))
            }
            Self::Relay(RelayError::Correlation(CorrelationError::Timeout { waited_secs })) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorResponse::new(
                    format!("No reply within {waited_secs}s. Try again."),
                    "REPLY_TIMEOUT",
                ),
            ),
            Self::Relay(RelayError::Transport(err))
            | Self::Relay(RelayError::Correlation(CorrelationError::Transport(err))) => {
                let code = if err.is_authentication() {
                    "UPSTREAM_AUTH"
                } else {
                    "UPSTREAM_ERROR"
                };
                tracing::error!(error = %err, "chat backend failure");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("Chat backend unavailable", code),
                )
            }
            Self::Relay(RelayError::Dispatch(DispatchError::QueueFull)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("Dispatch queue is full, retry later", "QUEUE_FULL"),
            ),
            Self::Relay(RelayError::Dispatch(DispatchError::WorkerStopped)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("Dispatch worker unavailable", "DISPATCH_STOPPED"),
            ),
            Self::Relay(RelayError::Preamble(err)) => {
                tracing::error!(error = %err, "preamble loading failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Relay misconfigured", "PREAMBLE_ERROR"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
