//! Aggregation core error types.
//!
//! Containment policy: only configuration failure may abort
//! initialization; everything else is scoped to a single call or a single
//! source. Source failures inside an aggregation never surface here at
//! all — they are logged and the source contributes zero events.

use thiserror::Error;

use scola_core::ConfigError;
use scola_google::GoogleError;
use scola_sources::SourceError;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// School configuration missing or invalid. Fatal to `initialize`.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed date range or month. Fatal to the offending call only.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Google-side failure surfaced by an explicit Google operation
    /// (never by aggregation, which degrades instead).
    #[error("Google calendar error: {0}")]
    Google(#[from] GoogleError),

    /// Backend source failure surfaced by an explicit adapter operation
    /// (never by aggregation, which degrades instead).
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message().to_string(),
            Self::InvalidArgument(msg) => format!("Invalid request: {}", msg),
            Self::Google(e) => e.user_message(),
            Self::Source(e) => e.user_message().to_string(),
        }
    }
}
