use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// Body of a `POST /chat` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Identifies the client so the endpoint can keep conversation state.
    pub session_id: SessionId,

    /// The trimmed text the user submitted.
    pub message: String,
}

impl ChatRequest {
    /// Creates a new request for the given session.
    pub fn new(session_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
        }
    }
}
