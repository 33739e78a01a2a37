use serde::{Deserialize, Serialize};

/// Body of a successful `/chat` response.
///
/// Only `response` is consumed; any other fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// The reply text, possibly containing line breaks.
    pub response: String,
}

impl ChatResponse {
    /// Creates a new response.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}
