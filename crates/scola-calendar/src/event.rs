//! The unified calendar event model and per-source normalizers.
//!
//! Every source's native shape is converted into [`CalendarEvent`] here,
//! and nowhere else. Ids are prefixed with the event type so they stay
//! unique across sources within one merged result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scola_google::RawGoogleEvent;
use scola_sources::{
    Announcement, HomeworkAssignment, RecordPriority, SchoolEventRecord, TimetableEntry,
};

/// Which kind of calendar entry this is.
///
/// The declaration order doubles as the sort tiebreak order for events
/// starting at the same instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CalendarType {
    Google,
    Timetable,
    Homework,
    SchoolEvent,
    Notification,
}

impl CalendarType {
    pub fn as_str(self) -> &'static str {
        match self {
            CalendarType::Google => "google",
            CalendarType::Timetable => "timetable",
            CalendarType::Homework => "homework",
            CalendarType::SchoolEvent => "schoolEvent",
            CalendarType::Notification => "notification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl From<RecordPriority> for Priority {
    fn from(p: RecordPriority) -> Self {
        match p {
            RecordPriority::Low => Priority::Low,
            RecordPriority::Medium => Priority::Medium,
            RecordPriority::High => Priority::High,
        }
    }
}

/// Which adapter produced an event. Set at construction, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceTag {
    GoogleInteractive,
    GoogleReadOnly,
    Timetable,
    Homework,
    SchoolEvents,
    Notifications,
}

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Globally unique within a merged result: `"{type}-{source id}"`.
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub calendar_type: CalendarType,
    /// Owning branch; `None` for school-wide events.
    pub branch_id: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub student_id: Option<String>,
    pub teacher_id: Option<String>,
    pub priority: Priority,
    pub source: SourceTag,
}

impl CalendarEvent {
    /// `start_time <= end_time` must hold for every event we hand out.
    pub fn is_well_formed(&self) -> bool {
        self.start_time <= self.end_time
    }

    pub fn from_google(raw: RawGoogleEvent, source: SourceTag) -> Self {
        Self {
            id: format!("google-{}", raw.id),
            title: raw.summary,
            start_time: raw.start,
            // Raw events already clamp end >= start.
            end_time: raw.end,
            all_day: raw.all_day,
            calendar_type: CalendarType::Google,
            branch_id: raw.branch_id,
            location: raw.location,
            description: raw.description,
            student_id: None,
            teacher_id: None,
            priority: Priority::Medium,
            source,
        }
    }

    pub fn from_timetable(entry: TimetableEntry) -> Self {
        let end = entry.ends_at.max(entry.starts_at);
        let description = entry
            .teacher_name
            .as_ref()
            .map(|teacher| format!("{} with {}", entry.subject, teacher));
        Self {
            id: format!("timetable-{}", entry.id),
            title: entry.subject,
            start_time: entry.starts_at,
            end_time: end,
            all_day: false,
            calendar_type: CalendarType::Timetable,
            branch_id: entry.branch_id,
            location: entry.room,
            description,
            student_id: entry.student_id,
            teacher_id: None,
            priority: Priority::Medium,
            source: SourceTag::Timetable,
        }
    }

    /// Homework shows up as a zero-length marker at its due instant.
    pub fn from_homework(hw: HomeworkAssignment) -> Self {
        let title = match &hw.subject {
            Some(subject) => format!("{}: {}", subject, hw.title),
            None => hw.title.clone(),
        };
        Self {
            id: format!("homework-{}", hw.id),
            title,
            start_time: hw.due_at,
            end_time: hw.due_at,
            all_day: false,
            calendar_type: CalendarType::Homework,
            branch_id: hw.branch_id,
            location: None,
            description: hw.notes,
            student_id: hw.student_id,
            teacher_id: hw.teacher_id,
            priority: Priority::High,
            source: SourceTag::Homework,
        }
    }

    pub fn from_school_event(record: SchoolEventRecord) -> Self {
        let end = record.ends_at.max(record.starts_at);
        Self {
            id: format!("schoolEvent-{}", record.id),
            title: record.title,
            start_time: record.starts_at,
            end_time: end,
            all_day: record.all_day,
            calendar_type: CalendarType::SchoolEvent,
            branch_id: record.branch_id,
            location: record.location,
            description: record.description,
            student_id: None,
            teacher_id: None,
            priority: record.priority.map(Priority::from).unwrap_or(Priority::Medium),
            source: SourceTag::SchoolEvents,
        }
    }

    pub fn from_announcement(announcement: Announcement) -> Self {
        Self {
            id: format!("notification-{}", announcement.id),
            title: announcement.title,
            start_time: announcement.posted_at,
            end_time: announcement.posted_at,
            all_day: false,
            calendar_type: CalendarType::Notification,
            branch_id: announcement.branch_id,
            location: None,
            description: announcement.body,
            student_id: None,
            teacher_id: None,
            priority: announcement
                .priority
                .map(Priority::from)
                .unwrap_or(Priority::Low),
            source: SourceTag::Notifications,
        }
    }
}

/// Deduplicate by id (first occurrence wins), then sort ascending by start
/// time with deterministic tiebreaks: calendar type, then title, then id.
pub fn merge_events(mut events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut seen = std::collections::HashSet::with_capacity(events.len());
    events.retain(|e| seen.insert(e.id.clone()));
    events.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.calendar_type.cmp(&b.calendar_type))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
    events
}
