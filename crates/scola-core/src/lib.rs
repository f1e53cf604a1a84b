pub mod config;
pub mod error;
pub mod session;
pub mod user;

pub use config::{FeatureFlags, GoogleConfig, SchoolConfig, SchoolDirectory, ValidationResult};
pub use error::ConfigError;
pub use session::{SessionState, SessionStore};
pub use user::{UserContext, UserType};

use anyhow::Result;

/// Initialize the core: install the tracing subscriber.
///
/// Call once at process start, before any service is constructed.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Scola core initialized");
    Ok(())
}
