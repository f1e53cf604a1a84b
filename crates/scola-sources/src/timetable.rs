//! Timetable source adapter.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SourceError;
use crate::rest::RestClient;

/// One scheduled lesson as served by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub subject: String,
    pub teacher_name: Option<String>,
    pub room: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub branch_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Clone)]
pub struct TimetableClient {
    rest: RestClient,
}

impl TimetableClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Lessons within the window, scoped to a branch and optionally to one
    /// student (parent/student views).
    pub async fn entries(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        branch_id: Option<&str>,
        student_id: Option<&str>,
    ) -> Result<Vec<TimetableEntry>, SourceError> {
        let mut query = vec![
            ("startDate", start.to_rfc3339()),
            ("endDate", end.to_rfc3339()),
        ];
        if let Some(branch) = branch_id {
            query.push(("branchId", branch.to_string()));
        }
        if let Some(student) = student_id {
            query.push(("studentId", student.to_string()));
        }

        self.rest.get_enveloped("timetable/entries", &query).await
    }
}
