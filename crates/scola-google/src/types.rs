//! Google Calendar API types.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;

/// Time window and result cap for an event fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRange {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub max_results: u32,
}

impl EventRange {
    pub const DEFAULT_MAX_RESULTS: u32 = 100;

    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            time_min,
            time_max,
            max_results: Self::DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

/// A Google event after time parsing, before normalization into the
/// app-wide calendar model. Branch tagging happens at the service level:
/// only the read-only service knows which branch calendar produced it.
#[derive(Debug, Clone)]
pub struct RawGoogleEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    /// Branch owning the calendar this event came from, when known.
    pub branch_id: Option<String>,
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl ApiEvent {
    /// Whether this event was cancelled and should be dropped.
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Convert the API shape into a `RawGoogleEvent`.
    ///
    /// Events with no parseable start are anchored at the range start so a
    /// malformed payload cannot invent times outside the requested window.
    pub fn into_raw(self, fallback_start: DateTime<Utc>, branch_id: Option<&str>) -> RawGoogleEvent {
        let (start, all_day) = self
            .start
            .as_ref()
            .and_then(parse_event_time)
            .unwrap_or((fallback_start, false));

        let end = self
            .end
            .as_ref()
            .and_then(parse_event_time)
            .map(|(t, _)| t)
            .unwrap_or(start);

        // A source misreporting end < start must not break downstream
        // ordering invariants.
        let end = end.max(start);

        RawGoogleEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            description: self.description,
            location: self.location,
            start,
            end,
            all_day,
            branch_id: branch_id.map(str::to_string),
        }
    }
}

fn parse_event_time(api: &ApiEventTime) -> Option<(DateTime<Utc>, bool)> {
    if let Some(dt_str) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return Some((dt.with_timezone(&Utc), false));
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
            return Some((midnight, true));
        }
    }
    None
}

impl RawGoogleEvent {
    /// Duration helper used by callers that bucket events per day.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
