//! Sign-in-gated Google Calendar access.
//!
//! Wraps the API client behind an explicit sign-in lifecycle: event fetches
//! before `sign_in` fail with [`GoogleError::NotAuthenticated`] and never
//! touch the network.

use tracing::instrument;

use scola_core::GoogleConfig;

use crate::client::{Auth, GoogleApiClient};
use crate::error::GoogleError;
use crate::types::{EventRange, RawGoogleEvent};

const PRIMARY_CALENDAR: &str = "primary";

pub struct GoogleCalendarService {
    base_url: Option<String>,
    client: Option<GoogleApiClient>,
}

impl GoogleCalendarService {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            client: None,
        }
    }

    /// Bind the service to a signed-in account.
    ///
    /// The access token comes from the platform's auth shell; acquiring it
    /// is not this crate's job.
    pub fn sign_in(&mut self, access_token: &str) {
        let auth = Auth::Bearer(access_token.to_string());
        self.client = Some(match &self.base_url {
            Some(base) => GoogleApiClient::with_base_url(auth, base),
            None => GoogleApiClient::new(auth),
        });
        tracing::info!("Google calendar signed in");
    }

    /// Drop the session. Subsequent fetches fail until the next sign-in.
    pub fn sign_out(&mut self) {
        if self.client.take().is_some() {
            tracing::info!("Google calendar signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.client.is_some()
    }

    /// Fetch events from the signed-in account's primary calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn get_calendar_events(
        &self,
        range: EventRange,
    ) -> Result<Vec<RawGoogleEvent>, GoogleError> {
        let client = self.client.as_ref().ok_or(GoogleError::NotAuthenticated)?;

        let response = client.list_events(PRIMARY_CALENDAR, range).await?;
        let events = response
            .items
            .into_iter()
            .filter(|e| !e.is_cancelled())
            .map(|e| e.into_raw(range.time_min, None))
            .collect();
        Ok(events)
    }
}
