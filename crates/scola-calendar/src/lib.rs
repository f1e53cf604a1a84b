//! Calendar aggregation core for Scola.
//!
//! Merges events from Google Calendar, the timetable, homework due dates,
//! school events and announcements into one normalized, branch-filtered,
//! cached stream. The UI layer talks only to [`CalendarService`]; source
//! adapters are an implementation detail behind it.

pub mod cache;
pub mod error;
pub mod event;
pub mod security;
pub mod service;

pub use cache::{CacheConfig, CacheStats};
pub use error::CalendarError;
pub use event::{merge_events, CalendarEvent, CalendarType, Priority, SourceTag};
pub use security::{can_access_branch, can_access_google_calendar, can_create_calendar_events};
pub use service::{CalendarService, EventQuery, ServiceState};
