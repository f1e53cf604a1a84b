//! Announcements source adapter.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SourceError;
use crate::rest::RestClient;
use crate::school_events::RecordPriority;

/// A dated school announcement surfaced on the calendar.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub branch_id: Option<String>,
    pub priority: Option<RecordPriority>,
}

#[derive(Clone)]
pub struct NotificationsClient {
    rest: RestClient,
}

impl NotificationsClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Announcements posted within the window.
    pub async fn announcements(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Announcement>, SourceError> {
        let query = vec![
            ("postedFrom", start.to_rfc3339()),
            ("postedTo", end.to_rfc3339()),
        ];
        self.rest.get_enveloped("notifications", &query).await
    }
}
