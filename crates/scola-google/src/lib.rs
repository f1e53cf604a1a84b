//! Google Calendar access for Scola.
//!
//! Two variants share one fetch contract: the interactive service gated on
//! end-user sign-in, and the read-only service bound to pre-configured
//! branch calendars requiring no sign-in at all.

pub mod client;
pub mod error;
pub mod interactive;
pub mod readonly;
pub mod types;

pub use client::{Auth, GoogleApiClient};
pub use error::GoogleError;
pub use interactive::GoogleCalendarService;
pub use readonly::{BranchCalendar, ReadOnlyGoogleCalendarService};
pub use types::{ApiEvent, ApiEventTime, EventListResponse, EventRange, RawGoogleEvent};
