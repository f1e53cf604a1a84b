//! Homework source adapter.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SourceError;
use crate::rest::RestClient;

/// A homework assignment with its due instant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkAssignment {
    pub id: String,
    pub title: String,
    pub subject: Option<String>,
    pub notes: Option<String>,
    pub due_at: DateTime<Utc>,
    pub branch_id: Option<String>,
    pub student_id: Option<String>,
    pub teacher_id: Option<String>,
}

#[derive(Clone)]
pub struct HomeworkClient {
    rest: RestClient,
}

impl HomeworkClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Assignments due within the window, optionally scoped to one student.
    pub async fn assignments(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        student_id: Option<&str>,
    ) -> Result<Vec<HomeworkAssignment>, SourceError> {
        let mut query = vec![
            ("dueFrom", start.to_rfc3339()),
            ("dueTo", end.to_rfc3339()),
        ];
        if let Some(student) = student_id {
            query.push(("studentId", student.to_string()));
        }

        self.rest.get_enveloped("homework/assignments", &query).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_assignment_deserialization() {
        let json = r#"{
            "id": "hw-88",
            "title": "Algebra worksheet",
            "subject": "Mathematics",
            "dueAt": "2025-01-15T16:00:00Z",
            "branchId": "secondary",
            "studentId": "s-17",
            "teacherId": "t-3"
        }"#;

        let hw: HomeworkAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(hw.title, "Algebra worksheet");
        assert_eq!(hw.teacher_id, Some("t-3".to_string()));
        assert!(hw.notes.is_none());
    }
}
