//! Configuration error types.

use thiserror::Error;

/// Errors from school/tenant configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No school matched the login. Fatal: login cannot proceed against a
    /// guessed tenant.
    #[error("No school configuration found for login: {0}")]
    SchoolNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::SchoolNotFound(_) => {
                "We couldn't find your school. Check your username and try again."
            }
            ConfigError::Invalid(_) => "Invalid school configuration. Contact your administrator.",
            ConfigError::ParseError(_) => {
                "School configuration is malformed. Contact your administrator."
            }
            ConfigError::MissingSetting(_) => {
                "A required school setting is missing. Contact your administrator."
            }
        }
    }
}
