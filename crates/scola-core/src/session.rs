//! Session-scoped persistence of the resolved school config and user.
//!
//! An explicit store object owned by the application shell, handed to
//! whoever needs the active session. The calendar core only ever reads
//! from it; writing happens at login, branch switch, and logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::SchoolConfig;
use crate::user::UserContext;

/// The active session: who is signed in, against which school.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub config: SchoolConfig,
    pub user: UserContext,
    pub started_at: DateTime<Utc>,
}

/// Holds at most one active session. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the resolved config and user for the active session.
    ///
    /// Replaces any previous session (e.g. on branch switch re-resolution).
    pub fn save(&self, config: SchoolConfig, user: UserContext) {
        tracing::info!(school = %config.school_id, user = %user.user_id, "Session saved");
        *self.inner.write() = Some(SessionState {
            config,
            user,
            started_at: Utc::now(),
        });
    }

    /// The current session, if signed in.
    pub fn current(&self) -> Option<SessionState> {
        self.inner.read().clone()
    }

    /// Clear the session on logout.
    pub fn clear(&self) {
        if self.inner.write().take().is_some() {
            tracing::info!("Session cleared");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }
}
