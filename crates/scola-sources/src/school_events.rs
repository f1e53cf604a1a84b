//! School events source adapter.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SourceError;
use crate::rest::RestClient;

/// Priority as served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPriority {
    Low,
    Medium,
    High,
}

/// A school-wide or branch event (trips, assemblies, closures).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEventRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    /// `None` marks a school-wide event visible to every branch.
    pub branch_id: Option<String>,
    pub priority: Option<RecordPriority>,
}

#[derive(Clone)]
pub struct SchoolEventsClient {
    rest: RestClient,
}

impl SchoolEventsClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Events overlapping the window. Branch filtering happens in the
    /// aggregation core; the backend returns everything the auth code may
    /// list.
    pub async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SchoolEventRecord>, SourceError> {
        let query = vec![
            ("startDate", start.to_rfc3339()),
            ("endDate", end.to_rfc3339()),
        ];
        self.rest.get_enveloped("events/school", &query).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "id": "ev-5",
            "title": "Winter Concert",
            "location": "Auditorium",
            "startsAt": "2025-01-22T18:00:00Z",
            "endsAt": "2025-01-22T20:00:00Z",
            "branchId": null,
            "priority": "high"
        }"#;

        let record: SchoolEventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Winter Concert");
        assert!(record.branch_id.is_none());
        assert_eq!(record.priority, Some(RecordPriority::High));
        assert!(!record.all_day);
    }

    #[test]
    fn test_all_day_defaults_false() {
        let json = r#"{
            "id": "ev-6",
            "title": "Founders Day",
            "startsAt": "2025-03-03T00:00:00Z",
            "endsAt": "2025-03-03T23:59:59Z",
            "branchId": "primary"
        }"#;
        let record: SchoolEventRecord = serde_json::from_str(json).unwrap();
        assert!(!record.all_day);
        assert!(record.priority.is_none());
    }
}
