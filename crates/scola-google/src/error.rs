//! Google Calendar error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoogleError {
    /// `get_calendar_events` was called on the interactive service before a
    /// successful sign-in.
    #[error("Not signed in to Google")]
    NotAuthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("No calendars are bound for this school")]
    NoCalendars,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GoogleError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please sign in to your Google account".to_string(),
            Self::TokenExpired => "Your Google session has expired. Please sign in again.".to_string(),
            Self::AuthRequired => "Google Calendar access was denied for this account".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::NoCalendars => "No school calendars are configured".to_string(),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error should trigger a token refresh.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::AuthRequired)
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Network(_))
    }
}
