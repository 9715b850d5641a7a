//! Fetch error taxonomy for retry classification.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a single remote operation (list refresh, keyed read, or
/// write submission). Classified by the retry policy before being surfaced.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connectivity state was offline; no network attempt was made.
    #[error("offline: request not attempted")]
    Offline,
    /// The attempt exceeded the wall-clock timeout and was aborted.
    #[error("timed out after {limit:?}")]
    Timeout { limit: Duration },
    /// Non-2xx status, failure envelope, or a body that could not be parsed.
    #[error("server error: {message}")]
    ServerError {
        /// HTTP status when the response got far enough to carry one.
        status: Option<u32>,
        message: String,
    },
    /// Superseded by a newer refresh. Never shown to the end user.
    #[error("superseded by a newer refresh")]
    Cancelled,
    /// Connection-level curl failure (reset, DNS, etc.).
    #[error("network error: {0}")]
    Transport(#[from] curl::Error),
}

impl FetchError {
    /// Shorthand for a `ServerError` without an HTTP status.
    pub fn server(message: impl Into<String>) -> Self {
        FetchError::ServerError {
            status: None,
            message: message.into(),
        }
    }

    /// True for outcomes the end user should see a message for.
    /// Cancellation is silent by contract.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, FetchError::Cancelled)
    }
}
