//! HTTP DTOs (Data Transfer Objects) for relay endpoints.
//!
//! These types define the JSON request/response structure for the relay API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::ports::ChatSummary;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to relay a message and wait for the correlated reply.
///
/// Fields are optional at the deserialization boundary so that a missing
/// field yields a 400 with a named field instead of a generic body-rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct SendAiMessageRequest {
    /// The human message to relay.
    pub message: Option<String>,
    /// Caller-supplied conversation identifier, echoed into the tagged body.
    pub session_id: Option<String>,
}

/// Request to queue an untagged message for an arbitrary group.
#[derive(Debug, Clone, Deserialize)]
pub struct SendCustomMessageRequest {
    /// Target group.
    pub group_id: Option<String>,
    /// The message body to send verbatim.
    pub message: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for an accepted custom message.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedResponse {
    /// Always "queued".
    pub status: &'static str,
}

impl QueuedResponse {
    pub fn new() -> Self {
        Self { status: "queued" }
    }
}

impl Default for QueuedResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// One chat in the discovery listing.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummaryResponse {
    /// Group id to put in the relay configuration.
    pub id: String,
    /// Display name, when the backend reports one.
    pub name: Option<String>,
}

impl From<ChatSummary> for GroupSummaryResponse {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
        }
    }
}

/// Response for the chat discovery endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupSummaryResponse>,
}

impl GroupListResponse {
    pub fn new(summaries: Vec<ChatSummary>) -> Self {
        Self {
            groups: summaries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code.
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(error, "BAD_REQUEST")
    }
}
