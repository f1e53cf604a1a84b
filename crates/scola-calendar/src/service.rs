//! The calendar aggregation service.
//!
//! Composes the Google backend and the REST source adapters into one
//! normalized, de-duplicated, time-ordered, branch-filtered event stream
//! with a per-instance TTL cache. One broken source never blanks out the
//! calendar: every fetch failure is contained to its source.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use scola_core::{SchoolConfig, UserContext, UserType};
use scola_google::{
    EventRange, GoogleCalendarService, GoogleError, ReadOnlyGoogleCalendarService,
};
use scola_sources::{
    HomeworkClient, NotificationsClient, RestClient, SchoolEventsClient, TimetableClient,
};

use crate::cache::{CacheConfig, CacheKey, CacheStats, EventCache};
use crate::error::CalendarError;
use crate::event::{merge_events, CalendarEvent, SourceTag};
use crate::security;

/// Lifecycle of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Which Google backend was selected at initialization.
///
/// Enum dispatch, selected once; the aggregation path never inspects
/// runtime types to tell the variants apart.
enum GoogleBackend {
    /// Google sourcing skipped entirely (no workspace, feature off, or
    /// selection failed). Aggregation proceeds with the other sources.
    Disabled,
    Interactive(GoogleCalendarService),
    ReadOnly(ReadOnlyGoogleCalendarService),
}

impl GoogleBackend {
    fn is_available(&self) -> bool {
        !matches!(self, GoogleBackend::Disabled)
    }

    async fn fetch(&self, range: EventRange) -> Result<Vec<CalendarEvent>, GoogleError> {
        match self {
            GoogleBackend::Disabled => Ok(Vec::new()),
            GoogleBackend::Interactive(service) => Ok(service
                .get_calendar_events(range)
                .await?
                .into_iter()
                .map(|raw| CalendarEvent::from_google(raw, SourceTag::GoogleInteractive))
                .collect()),
            GoogleBackend::ReadOnly(service) => Ok(service
                .get_calendar_events(range)
                .await?
                .into_iter()
                .map(|raw| CalendarEvent::from_google(raw, SourceTag::GoogleReadOnly))
                .collect()),
        }
    }
}

/// Options for one aggregation call. All sources are included unless the
/// caller narrows the scope; `force_refresh` bypasses the cache read but
/// still writes the fresh result back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub include_google: bool,
    pub include_timetable: bool,
    pub include_homework: bool,
    pub include_school_events: bool,
    pub include_notifications: bool,
    pub force_refresh: bool,
}

impl EventQuery {
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            include_google: true,
            include_timetable: true,
            include_homework: true,
            include_school_events: true,
            include_notifications: true,
            force_refresh: false,
        }
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    fn source_flags(&self) -> u8 {
        (self.include_google as u8)
            | (self.include_timetable as u8) << 1
            | (self.include_homework as u8) << 2
            | (self.include_school_events as u8) << 3
            | (self.include_notifications as u8) << 4
    }
}

pub struct CalendarService {
    config: SchoolConfig,
    user: UserContext,
    google: GoogleBackend,
    /// Last Google fetch failed; cleared by the next success.
    google_degraded: AtomicBool,
    timetable: TimetableClient,
    homework: HomeworkClient,
    school_events: SchoolEventsClient,
    notifications: NotificationsClient,
    cache: EventCache,
    state: ServiceState,
}

impl CalendarService {
    /// Build the service for one signed-in user.
    ///
    /// Google backend selection never fails this call: when the read-only
    /// service cannot be built and the interactive feature is off, Google
    /// sourcing is disabled and the remaining sources carry the calendar.
    /// Only an invalid school configuration is fatal here.
    pub fn initialize(config: SchoolConfig, user: UserContext) -> Result<Self, CalendarError> {
        Self::with_cache_config(config, user, CacheConfig::default())
    }

    pub fn with_cache_config(
        config: SchoolConfig,
        user: UserContext,
        cache_config: CacheConfig,
    ) -> Result<Self, CalendarError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(CalendarError::Config(scola_core::ConfigError::Invalid(
                validation.error_summary(),
            )));
        }

        let google = select_google_backend(&config, &user);
        let (timetable, homework, school_events, notifications) = build_adapters(&config, &user);

        tracing::info!(
            school = %config.school_id,
            user = %user.user_id,
            google_available = google.is_available(),
            "Calendar service initialized"
        );

        Ok(Self {
            config,
            user,
            google,
            google_degraded: AtomicBool::new(false),
            timetable,
            homework,
            school_events,
            notifications,
            cache: EventCache::new(cache_config),
            state: ServiceState::Ready,
        })
    }

    /// Re-resolve configuration in place (branch switch, feature change).
    ///
    /// Drops the prior Google backend and the cache, so no session or
    /// stale entry leaks across the switch.
    pub fn reconfigure(
        &mut self,
        config: SchoolConfig,
        user: UserContext,
    ) -> Result<(), CalendarError> {
        self.state = ServiceState::Initializing;
        let fresh = Self::initialize(config, user)?;
        *self = fresh;
        Ok(())
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// True iff a Google backend was selected at initialization and its
    /// last fetch (if any) succeeded.
    pub fn is_google_calendar_available(&self) -> bool {
        self.google.is_available() && !self.google_degraded.load(Ordering::Relaxed)
    }

    /// Pass an access token through to the interactive backend.
    ///
    /// No-op for the read-only and disabled backends, which need no
    /// sign-in.
    pub fn sign_in_google(&mut self, access_token: &str) {
        if let GoogleBackend::Interactive(service) = &mut self.google {
            service.sign_in(access_token);
        }
    }

    pub fn sign_out_google(&mut self) {
        if let GoogleBackend::Interactive(service) = &mut self.google {
            service.sign_out();
        }
    }

    /// Fetch, normalize, merge and filter events from every enabled source.
    ///
    /// Sources are fetched concurrently; a failing source is logged and
    /// contributes zero events. The merged result is cached under
    /// (user, branch, sources, window) before being returned.
    pub async fn get_all_events(
        &self,
        query: EventQuery,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if query.start > query.end {
            return Err(CalendarError::InvalidArgument(format!(
                "start {} is after end {}",
                query.start, query.end
            )));
        }

        let key = self.cache_key(&query);
        if !query.force_refresh {
            if let Some(events) = self.cache.get(&key) {
                tracing::debug!(entries = events.len(), "Cache hit");
                return Ok(events);
            }
        }

        let range = EventRange::new(query.start, query.end);
        let student_scope = self.student_scope();

        let google_fut = async {
            if !query.include_google {
                return None;
            }
            let result = self.google.fetch(range).await;
            self.google_degraded
                .store(result.is_err(), Ordering::Relaxed);
            Some(result.map_err(CalendarError::from))
        };
        let timetable_fut = async {
            if !query.include_timetable {
                return None;
            }
            Some(
                self.timetable
                    .entries(
                        query.start,
                        query.end,
                        self.user.branch_id.as_deref(),
                        student_scope,
                    )
                    .await
                    .map(|entries| {
                        entries
                            .into_iter()
                            .map(CalendarEvent::from_timetable)
                            .collect()
                    })
                    .map_err(CalendarError::from),
            )
        };
        let homework_fut = async {
            if !query.include_homework {
                return None;
            }
            Some(
                self.homework
                    .assignments(query.start, query.end, student_scope)
                    .await
                    .map(|items| items.into_iter().map(CalendarEvent::from_homework).collect())
                    .map_err(CalendarError::from),
            )
        };
        let school_events_fut = async {
            if !query.include_school_events {
                return None;
            }
            Some(
                self.school_events
                    .events(query.start, query.end)
                    .await
                    .map(|records| {
                        records
                            .into_iter()
                            .map(CalendarEvent::from_school_event)
                            .collect()
                    })
                    .map_err(CalendarError::from),
            )
        };
        let notifications_fut = async {
            if !query.include_notifications {
                return None;
            }
            Some(
                self.notifications
                    .announcements(query.start, query.end)
                    .await
                    .map(|items| {
                        items
                            .into_iter()
                            .map(CalendarEvent::from_announcement)
                            .collect()
                    })
                    .map_err(CalendarError::from),
            )
        };

        let (google, timetable, homework, school_events, notifications) = tokio::join!(
            google_fut,
            timetable_fut,
            homework_fut,
            school_events_fut,
            notifications_fut
        );

        let mut events = Vec::new();
        events.extend(settle("google", google));
        events.extend(settle("timetable", timetable));
        events.extend(settle("homework", homework));
        events.extend(settle("schoolEvents", school_events));
        events.extend(settle("notifications", notifications));

        let merged = merge_events(events);
        let visible: Vec<CalendarEvent> = merged
            .into_iter()
            .filter(|e| security::can_access_branch(&self.user, e.branch_id.as_deref()))
            .collect();

        self.cache.put(key, visible.clone());
        Ok(visible)
    }

    /// Events starting within the next `days` days.
    pub async fn get_upcoming_events(
        &self,
        days: i64,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.upcoming_events_from(Utc::now(), days).await
    }

    /// `get_upcoming_events` with an explicit "now", so the window is
    /// reproducible.
    pub async fn upcoming_events_from(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if days < 0 {
            return Err(CalendarError::InvalidArgument(format!(
                "days must be non-negative, got {}",
                days
            )));
        }
        let query = EventQuery::range(now, now + Duration::days(days));
        let events = self.get_all_events(query).await?;
        // The cached window may predate `now`; drop anything already started.
        Ok(events.into_iter().filter(|e| e.start_time >= now).collect())
    }

    /// Events within one calendar month, in the caller's local time zone.
    ///
    /// Out-of-range months are rejected; December is handled by
    /// first-of-next-month arithmetic, so there is no rollover input.
    pub async fn get_monthly_events(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let (start, end) = monthly_range(year, month)?;
        self.get_all_events(EventQuery::range(start, end)).await
    }

    /// Diagnostic cache snapshot, non-authoritative.
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn cache_key(&self, query: &EventQuery) -> CacheKey {
        CacheKey {
            user_id: self.user.user_id.clone(),
            branch_id: self.user.branch_id.clone(),
            source_flags: query.source_flags(),
            start_ms: query.start.timestamp_millis(),
            end_ms: query.end.timestamp_millis(),
        }
    }

    /// Students see their own records; parents are scoped server-side by
    /// their auth code; staff see the branch.
    fn student_scope(&self) -> Option<&str> {
        (self.user.user_type == UserType::Student).then_some(self.user.user_id.as_str())
    }

    pub fn school_config(&self) -> &SchoolConfig {
        &self.config
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }
}

/// Collapse one source's outcome: skipped and failed sources contribute
/// zero events, failures are logged with their source name.
fn settle(
    source: &'static str,
    outcome: Option<Result<Vec<CalendarEvent>, CalendarError>>,
) -> Vec<CalendarEvent> {
    match outcome {
        None => Vec::new(),
        Some(Ok(events)) => {
            tracing::debug!(source, count = events.len(), "Source fetched");
            events
        }
        Some(Err(e)) => {
            tracing::warn!(source, error = %e, "Source fetch failed, contributing no events");
            Vec::new()
        }
    }
}

/// Select which Google backend (if any) serves this user.
///
/// Preference order: read-only when enabled and branch calendars are
/// mapped, interactive when the feature allows it, otherwise disabled.
/// Never fails; a broken Google setup degrades to `Disabled`.
fn select_google_backend(config: &SchoolConfig, user: &UserContext) -> GoogleBackend {
    if !security::can_access_google_calendar(user, config) {
        tracing::info!("Google calendar not accessible for this user/school, skipping");
        return GoogleBackend::Disabled;
    }

    let Some(google) = &config.google else {
        return GoogleBackend::Disabled;
    };

    if config.features.google_calendar_read_only && google.has_branch_calendars() {
        match ReadOnlyGoogleCalendarService::new(google) {
            Ok(service) => return GoogleBackend::ReadOnly(service),
            Err(e) => {
                tracing::warn!(error = %e, "Read-only Google backend unavailable");
            }
        }
    }

    if config.features.google_calendar {
        return GoogleBackend::Interactive(GoogleCalendarService::new(google));
    }

    GoogleBackend::Disabled
}

fn build_adapters(
    config: &SchoolConfig,
    user: &UserContext,
) -> (
    TimetableClient,
    HomeworkClient,
    SchoolEventsClient,
    NotificationsClient,
) {
    let rest = RestClient::new(&config.api_base_url, &user.auth_code);
    (
        TimetableClient::new(rest.clone()),
        HomeworkClient::new(rest.clone()),
        SchoolEventsClient::new(rest.clone()),
        NotificationsClient::new(rest),
    )
}

/// [start, end) of a calendar month in the local time zone, as UTC instants.
fn monthly_range(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidArgument(format!(
            "month must be 1-12, got {}",
            month
        )));
    }

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let start = Local
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .earliest()
        .ok_or_else(|| CalendarError::InvalidArgument(format!("invalid month {}-{}", year, month)))?;
    let end = Local
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .earliest()
        .ok_or_else(|| {
            CalendarError::InvalidArgument(format!("invalid month {}-{}", next_year, next_month))
        })?;

    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
