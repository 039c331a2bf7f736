//! Request and response types for the collector HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Response for POST /api/event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    /// `success` or `error`.
    pub status: String,
    /// Error details, when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EventResponse {
    /// Create a success response.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

/// Query parameters for GET /api/events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return.
    pub limit: Option<usize>,
}
