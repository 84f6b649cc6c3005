//! Notifier Errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while delivering an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Connection, TLS, or timeout failure.
    #[error("Alert delivery failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the webhook or message endpoint.
    #[error("Alert delivery rejected: {status}: {body}")]
    Status { status: StatusCode, body: String },
}
