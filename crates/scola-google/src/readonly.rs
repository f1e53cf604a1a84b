//! Credential-free Google Calendar access scoped to branch calendars.
//!
//! Constructed from the school's `GoogleConfig`: an API key plus a
//! branch -> calendar-id mapping. No end-user sign-in is involved; every
//! fetched event is tagged with the branch that owns its calendar.

use std::collections::BTreeMap;

use tracing::instrument;

use scola_core::GoogleConfig;

use crate::client::{Auth, GoogleApiClient};
use crate::error::GoogleError;
use crate::types::{EventRange, RawGoogleEvent};

/// One branch calendar binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCalendar {
    pub branch_id: String,
    pub calendar_id: String,
}

pub struct ReadOnlyGoogleCalendarService {
    client: GoogleApiClient,
    calendars: Vec<BranchCalendar>,
}

impl ReadOnlyGoogleCalendarService {
    /// Bind to the school's branch calendars.
    ///
    /// Fails with [`GoogleError::NoCalendars`] when the mapping is empty —
    /// a read-only service with nothing to read is a configuration bug the
    /// caller should fall back from.
    pub fn new(config: &GoogleConfig) -> Result<Self, GoogleError> {
        if config.branch_calendars.is_empty() {
            return Err(GoogleError::NoCalendars);
        }

        let auth = Auth::ApiKey(config.api_key.clone());
        let client = match &config.api_base_url {
            Some(base) => GoogleApiClient::with_base_url(auth, base),
            None => GoogleApiClient::new(auth),
        };

        Ok(Self {
            client,
            calendars: to_bindings(&config.branch_calendars),
        })
    }

    /// The branch calendars this service is bound to.
    pub fn get_branch_calendars(&self) -> &[BranchCalendar] {
        &self.calendars
    }

    /// The calendar binding for one branch, if mapped.
    pub fn get_branch_info(&self, branch_id: &str) -> Option<&BranchCalendar> {
        self.calendars.iter().find(|c| c.branch_id == branch_id)
    }

    /// Fetch events from every bound branch calendar concurrently.
    ///
    /// A failing calendar contributes nothing; the remaining branches are
    /// still returned. Only when every calendar fails is the first error
    /// surfaced, so the caller can distinguish "quiet month" from "Google
    /// is down".
    #[instrument(skip(self), level = "info")]
    pub async fn get_calendar_events(
        &self,
        range: EventRange,
    ) -> Result<Vec<RawGoogleEvent>, GoogleError> {
        let fetches = self.calendars.iter().map(|binding| async move {
            let result = self.client.list_events(&binding.calendar_id, range).await;
            (binding, result)
        });

        let mut events = Vec::new();
        let mut first_error = None;
        let mut any_ok = false;

        for (binding, result) in futures::future::join_all(fetches).await {
            match result {
                Ok(response) => {
                    any_ok = true;
                    events.extend(
                        response
                            .items
                            .into_iter()
                            .filter(|e| !e.is_cancelled())
                            .map(|e| e.into_raw(range.time_min, Some(&binding.branch_id))),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        branch = %binding.branch_id,
                        error = %e,
                        "Branch calendar fetch failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match (any_ok, first_error) {
            (false, Some(e)) => Err(e),
            _ => Ok(events),
        }
    }
}

fn to_bindings(map: &BTreeMap<String, String>) -> Vec<BranchCalendar> {
    map.iter()
        .map(|(branch_id, calendar_id)| BranchCalendar {
            branch_id: branch_id.clone(),
            calendar_id: calendar_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::{DateTime, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GoogleConfig {
        let mut branch_calendars = BTreeMap::new();
        branch_calendars.insert("primary".to_string(), "cal-primary".to_string());
        branch_calendars.insert("secondary".to_string(), "cal-secondary".to_string());
        GoogleConfig {
            api_key: "AIza-test".to_string(),
            api_base_url: Some(base_url.to_string()),
            branch_calendars,
        }
    }

    fn range() -> EventRange {
        let time_min = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        EventRange::new(time_min, time_min + chrono::Duration::days(31))
    }

    #[test]
    fn test_empty_mapping_is_rejected() {
        let config = GoogleConfig {
            api_key: "k".to_string(),
            api_base_url: None,
            branch_calendars: BTreeMap::new(),
        };
        assert!(matches!(
            ReadOnlyGoogleCalendarService::new(&config),
            Err(GoogleError::NoCalendars)
        ));
    }

    #[test]
    fn test_branch_info() {
        let service = ReadOnlyGoogleCalendarService::new(&config("http://x.invalid")).unwrap();
        assert_eq!(service.get_branch_calendars().len(), 2);
        assert_eq!(
            service.get_branch_info("secondary").unwrap().calendar_id,
            "cal-secondary"
        );
        assert!(service.get_branch_info("kindergarten").is_none());
    }

    #[tokio::test]
    async fn test_events_tagged_with_owning_branch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/cal-primary/events"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "p1", "summary": "Primary Assembly",
                           "start": {"dateTime": "2025-01-10T08:00:00Z"},
                           "end": {"dateTime": "2025-01-10T09:00:00Z"}}]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/cal-secondary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "s1", "summary": "Secondary Exams",
                           "start": {"dateTime": "2025-01-12T08:00:00Z"},
                           "end": {"dateTime": "2025-01-12T10:00:00Z"}}]
            })))
            .mount(&mock_server)
            .await;

        let service = ReadOnlyGoogleCalendarService::new(&config(&mock_server.uri())).unwrap();
        let events = service.get_calendar_events(range()).await.unwrap();

        assert_eq!(events.len(), 2);
        let primary = events.iter().find(|e| e.id == "p1").unwrap();
        assert_eq!(primary.branch_id, Some("primary".to_string()));
        let secondary = events.iter().find(|e| e.id == "s1").unwrap();
        assert_eq!(secondary.branch_id, Some("secondary".to_string()));
    }

    #[tokio::test]
    async fn test_one_failing_branch_degrades_not_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/cal-primary/events"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/cal-secondary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "s1", "summary": "Still Here",
                           "start": {"dateTime": "2025-01-12T08:00:00Z"},
                           "end": {"dateTime": "2025-01-12T10:00:00Z"}}]
            })))
            .mount(&mock_server)
            .await;

        let service = ReadOnlyGoogleCalendarService::new(&config(&mock_server.uri())).unwrap();
        let events = service.get_calendar_events(range()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "s1");
    }

    #[tokio::test]
    async fn test_all_branches_failing_surfaces_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let service = ReadOnlyGoogleCalendarService::new(&config(&mock_server.uri())).unwrap();
        let result = service.get_calendar_events(range()).await;
        assert!(matches!(result, Err(GoogleError::ApiError(_))));
    }
}
