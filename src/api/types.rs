//! API request and response types

use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Query typed into the page search box
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub query: String,
}

/// Request to open or close the Nexus panel
#[derive(Debug, Deserialize)]
pub struct PanelRequest {
    pub open: bool,
}

/// Draft input buffers; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub chat: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Response for a newly created session
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

/// Response for actions handed to the session runtime
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub ok: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
