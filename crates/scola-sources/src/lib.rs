//! School REST backend source adapters.
//!
//! Each adapter produces typed records from one origin (timetable,
//! homework, school events, announcements) through a shared envelope-aware
//! REST client. Adapters never interpret events; normalization into the
//! unified calendar model happens in `scola-calendar`.

pub mod error;
pub mod homework;
pub mod notifications;
pub mod rest;
pub mod retry;
pub mod school_events;
pub mod timetable;

pub use error::SourceError;
pub use homework::{HomeworkAssignment, HomeworkClient};
pub use notifications::{Announcement, NotificationsClient};
pub use rest::{Envelope, RestClient};
pub use retry::RetryPolicy;
pub use school_events::{RecordPriority, SchoolEventRecord, SchoolEventsClient};
pub use timetable::{TimetableClient, TimetableEntry};
