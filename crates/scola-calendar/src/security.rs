//! Access-control predicates for calendar data.
//!
//! Pure functions of (user, config); no state, no I/O. The aggregation
//! core applies `can_access_branch` per event after merging, so adapters
//! stay free of access logic.

use scola_core::{SchoolConfig, UserContext};

/// Whether the user may read Google Calendar data at all.
///
/// Requires the school to have a Google Workspace with the calendar
/// feature enabled. Every current role may read; the role check exists so
/// future exclusions land in one place.
pub fn can_access_google_calendar(user: &UserContext, config: &SchoolConfig) -> bool {
    if !config.has_google_workspace {
        return false;
    }
    if !config.features.google_calendar && !config.features.google_calendar_read_only {
        return false;
    }
    let _ = user;
    true
}

/// Whether the user may create calendar events.
///
/// Staff-tier roles only, and only when the school's Google integration is
/// write-capable (interactive feature on, not just the read-only path).
pub fn can_create_calendar_events(user: &UserContext, config: &SchoolConfig) -> bool {
    user.user_type.is_staff_tier()
        && config.has_google_workspace
        && config.features.google_calendar
}

/// Whether the user may see events belonging to `branch_id`.
///
/// Global events (`None`) are visible to everyone; otherwise the event's
/// branch must match the user's, unless the role has cross-branch
/// visibility.
pub fn can_access_branch(user: &UserContext, branch_id: Option<&str>) -> bool {
    match branch_id {
        None => true,
        Some(branch) => {
            user.user_type.has_cross_branch_visibility()
                || user.branch_id.as_deref() == Some(branch)
        }
    }
}
