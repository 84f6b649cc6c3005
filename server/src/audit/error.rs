//! Audit Error Types

use thiserror::Error;

use crate::discord::FetchError;
use crate::notify::NotifyError;

/// Failure of one guild's audit pass. Never escapes the pass itself.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl AuditError {
    /// Stage that failed, for log fields.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Notify(_) => "notify",
        }
    }
}
