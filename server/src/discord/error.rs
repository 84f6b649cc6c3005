//! Fetch Gateway Errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while reading guild data from the Discord API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure.
    #[error("Discord API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response.
    #[error("Discord API error: {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body did not match the expected payload (including malformed bitfields).
    #[error("Discord API returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// HTTP status of the failed response, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(e) => e.status(),
            Self::Status { status, .. } => Some(*status),
            Self::Decode(_) => None,
        }
    }
}
