//! Source adapter error types.

use thiserror::Error;

/// Failure of one backend source fetch.
///
/// These never abort an aggregation call; the aggregation core logs them
/// and lets the source contribute zero events.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but `success: false`.
    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SourceError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            SourceError::Http { status, .. } if *status >= 500 => {
                "The school server is experiencing issues. Please try again later."
            }
            SourceError::Http { .. } => "The request failed. Please try again.",
            SourceError::Rejected(_) => "The school server declined the request.",
            SourceError::Decode(_) => "Received an unexpected response. Please try again.",
            SourceError::Network(_) => "Network error. Check your connection.",
        }
    }
}
