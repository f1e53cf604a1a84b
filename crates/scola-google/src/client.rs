//! Low-level Google Calendar API client.

use tracing::instrument;

use crate::error::GoogleError;
use crate::types::{EventListResponse, EventRange};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// How requests are authenticated against the Calendar API.
#[derive(Debug, Clone)]
pub enum Auth {
    /// End-user OAuth access token (interactive variant).
    Bearer(String),
    /// School-scoped API key for public/shared calendars (read-only variant).
    ApiKey(String),
}

pub struct GoogleApiClient {
    client: reqwest::Client,
    auth: Auth,
    base_url: String,
}

impl GoogleApiClient {
    pub fn new(auth: Auth) -> Self {
        Self::with_base_url(auth, CALENDAR_API_BASE)
    }

    /// Point the client at a non-default endpoint (tests, proxies).
    pub fn with_base_url(auth: Auth, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// List events from a calendar within a time range, following
    /// `nextPageToken` until `range.max_results` events are collected.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        range: EventRange,
    ) -> Result<EventListResponse, GoogleError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_events_page(calendar_id, range, page_token.as_deref()).await?;
            items.extend(page.items);

            if items.len() as u32 >= range.max_results {
                items.truncate(range.max_results as usize);
                return Ok(EventListResponse {
                    items,
                    next_page_token: page.next_page_token,
                });
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => {
                    return Ok(EventListResponse {
                        items,
                        next_page_token: None,
                    })
                }
            }
        }
    }

    async fn list_events_page(
        &self,
        calendar_id: &str,
        range: EventRange,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, GoogleError> {
        let mut url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults={}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&range.time_min.to_rfc3339()),
            urlencoding::encode(&range.time_max.to_rfc3339()),
            range.max_results,
        );

        if let Auth::ApiKey(key) = &self.auth {
            url.push_str(&format!("&key={}", urlencoding::encode(key)));
        }

        if let Some(pt) = page_token {
            url.push_str(&format!("&pageToken={}", pt));
        }

        let mut request = self.client.get(&url);
        if let Auth::Bearer(token) = &self.auth {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GoogleError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GoogleError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(GoogleError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(GoogleError::AuthRequired)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(GoogleError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(GoogleError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
