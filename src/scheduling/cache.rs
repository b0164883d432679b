//! Per-account cache of fetched calendar events.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::events::CalendarEvent;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct CacheEntry {
    events: Vec<CalendarEvent>,
    fetched_at: Instant,
}

/// Entries stay fresh for `ttl` after they were stored and are only
/// ever replaced, never explicitly invalidated.
#[derive(Debug)]
pub struct EventCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for EventCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl EventCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Events for `account` if they were stored less than `ttl` before
    /// `now` and the list isn't empty.
    pub fn get(&self, account: &str, now: Instant) -> Option<Vec<CalendarEvent>> {
        let entry = self.entries.get(account)?;
        let age = now.saturating_duration_since(entry.fetched_at);
        if age < self.ttl && !entry.events.is_empty() {
            Some(entry.events.clone())
        } else {
            None
        }
    }

    pub fn put(&mut self, account: &str, events: Vec<CalendarEvent>, now: Instant) {
        self.entries.insert(
            account.to_string(),
            CacheEntry {
                events,
                fetched_at: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<CalendarEvent> {
        vec![CalendarEvent {
            summary: String::from("Planning"),
            start: String::from("2026-10-19T10:00:00Z"),
            end: String::from("2026-10-19T11:00:00Z"),
            calendar_id: String::from("primary"),
            calendar_name: String::from("Work"),
            calendar_color: String::from("#4285f4"),
        }]
    }

    #[test]
    fn it_serves_fresh_entries() {
        let mut cache = EventCache::default();
        let t0 = Instant::now();
        cache.put("me@example.com", events(), t0);

        assert_eq!(cache.get("me@example.com", t0), Some(events()));
        assert_eq!(
            cache.get("me@example.com", t0 + Duration::from_secs(299)),
            Some(events())
        );
        assert!(cache.get("other@example.com", t0).is_none());
    }

    #[test]
    fn it_expires_entries_after_ttl() {
        let mut cache = EventCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.put("me@example.com", events(), t0);

        assert!(cache.get("me@example.com", t0 + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn it_treats_empty_results_as_a_miss() {
        let mut cache = EventCache::default();
        let t0 = Instant::now();
        cache.put("me@example.com", vec![], t0);

        assert!(cache.get("me@example.com", t0).is_none());
    }

    #[test]
    fn it_overwrites_with_the_latest_fetch() {
        let mut cache = EventCache::default();
        let t0 = Instant::now();
        cache.put("me@example.com", events(), t0);
        cache.put("me@example.com", vec![], t0 + Duration::from_secs(1));

        assert!(cache.get("me@example.com", t0 + Duration::from_secs(2)).is_none());
    }
}
