//! In-memory TTL cache for merged event queries.
//!
//! Each `CalendarService` instance owns one cache; nothing is shared
//! across instances or users. Entries expire lazily: an expired entry is
//! treated as a miss and dropped on the access that finds it.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::event::CalendarEvent;

/// Cache tuning. TTL default matches the app's five-minute freshness
/// window; size is unbounded (a session produces a handful of distinct
/// query windows).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

/// Identity of one cached query: user, branch, enabled sources, window.
///
/// Derived `Hash`/`Eq` keep the key deterministic; source flags are a
/// bitmask so the set of enabled sources is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    pub branch_id: Option<String>,
    pub source_flags: u8,
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    events: Vec<CalendarEvent>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
}

/// Diagnostic snapshot, non-authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
}

pub struct EventCache {
    config: CacheConfig,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    counters: RwLock<Counters>,
}

impl EventCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Look up a fresh entry. Expired entries count as misses and are
    /// evicted by this access.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<CalendarEvent>> {
        let now = Utc::now();

        let fresh = {
            let entries = self.entries.read();
            entries.get(key).and_then(|entry| {
                if self.is_fresh(entry, now) {
                    Some(entry.events.clone())
                } else {
                    None
                }
            })
        };

        match fresh {
            Some(events) => {
                self.counters.write().hits += 1;
                Some(events)
            }
            None => {
                // Lazy eviction: drop the stale entry if one was there.
                let mut entries = self.entries.write();
                if let Some(entry) = entries.get(key) {
                    if !self.is_fresh(entry, now) {
                        entries.remove(key);
                    }
                }
                self.counters.write().misses += 1;
                None
            }
        }
    }

    /// Store the result of a fetch. Last writer wins per key.
    pub fn put(&self, key: CacheKey, events: Vec<CalendarEvent>) {
        let entry = CacheEntry {
            events,
            fetched_at: Utc::now(),
        };
        self.entries.write().insert(key, entry);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let counters = self.counters.read();
        let total = counters.hits + counters.misses;
        CacheStats {
            entries: entries.len(),
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                counters.hits as f64 / total as f64
            },
            oldest_entry: entries.values().map(|e| e.fetched_at).min(),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(entry.fetched_at);
        age.to_std().map_or(true, |age| age < self.config.ttl)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::event::{CalendarType, Priority, SourceTag};
    use chrono::TimeZone;

    fn key(user: &str, start_ms: i64) -> CacheKey {
        CacheKey {
            user_id: user.to_string(),
            branch_id: Some("secondary".to_string()),
            source_flags: 0b11111,
            start_ms,
            end_ms: start_ms + 86_400_000,
        }
    }

    fn sample_events() -> Vec<CalendarEvent> {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).single().unwrap();
        vec![CalendarEvent {
            id: "timetable-1".into(),
            title: "Maths".into(),
            start_time: start,
            end_time: start,
            all_day: false,
            calendar_type: CalendarType::Timetable,
            branch_id: Some("secondary".into()),
            location: None,
            description: None,
            student_id: None,
            teacher_id: None,
            priority: Priority::Medium,
            source: SourceTag::Timetable,
        }]
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = EventCache::new(CacheConfig::default());
        let k = key("u-1", 0);

        assert!(cache.get(&k).is_none());
        cache.put(k.clone(), sample_events());
        assert_eq!(cache.get(&k).unwrap(), sample_events());

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let cache = EventCache::new(CacheConfig::default());
        cache.put(key("u-1", 0), sample_events());

        assert!(cache.get(&key("u-2", 0)).is_none());
        assert!(cache.get(&key("u-1", 1)).is_none());

        let mut other_sources = key("u-1", 0);
        other_sources.source_flags = 0b00001;
        assert!(cache.get(&other_sources).is_none());
    }

    #[test]
    fn test_expired_entry_is_miss_and_evicted() {
        let cache = EventCache::new(CacheConfig {
            ttl: Duration::from_millis(0),
        });
        let k = key("u-1", 0);
        cache.put(k.clone(), sample_events());
        assert_eq!(cache.len(), 1);

        // TTL of zero: the entry is already stale.
        assert!(cache.get(&k).is_none());
        assert_eq!(cache.len(), 0, "stale entry evicted on access");
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = EventCache::new(CacheConfig::default());
        let k = key("u-1", 0);

        cache.put(k.clone(), vec![]);
        cache.put(k.clone(), sample_events());
        assert_eq!(cache.get(&k).unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = EventCache::new(CacheConfig::default());
        cache.put(key("u-1", 0), sample_events());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_entry_tracked() {
        let cache = EventCache::new(CacheConfig::default());
        assert!(cache.stats().oldest_entry.is_none());

        cache.put(key("u-1", 0), sample_events());
        cache.put(key("u-1", 1), sample_events());
        let stats = cache.stats();
        assert!(stats.oldest_entry.is_some());
    }
}
