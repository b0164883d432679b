//! Subtracts busy intervals from the business-hours grid.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

use super::events::BusyInterval;
use super::query::QueryIntent;

/// A free tick of time that can be offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: u32,
}

/// Shape of the daily grid slots are cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub tick_minutes: u32,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("Invalid day start"),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).expect("Invalid day end"),
            tick_minutes: 30,
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn overlaps(start: NaiveDateTime, end: NaiveDateTime, busy: &BusyInterval) -> bool {
    start < busy.end && end > busy.start
}

/// Date of the last instant inside `[start, end)`.
fn last_day(start: NaiveDateTime, end: NaiveDateTime) -> Option<NaiveDate> {
    if end <= start {
        return None;
    }
    Some((end - Duration::nanoseconds(1)).date())
}

/// Every free tick in the intent's range that starts after `now`.
///
/// Ticks are laid out from the start of each day's window so they stay
/// on the same grid whether or not the day is already underway. Output
/// is ordered by start time.
pub fn generate_slots(
    busy: &[BusyInterval],
    intent: &QueryIntent,
    policy: &SlotPolicy,
    now: NaiveDateTime,
) -> Vec<CandidateSlot> {
    let mut slots = Vec::new();
    if policy.tick_minutes == 0 {
        return slots;
    }
    let Some(last) = last_day(intent.range_start, intent.range_end) else {
        return slots;
    };

    let tick = Duration::minutes(policy.tick_minutes as i64);
    let include_weekends = intent.time_range.includes_weekends();
    let window_start = intent.start_time_constraint.unwrap_or(policy.day_start);
    let window_end = intent.end_time_constraint.unwrap_or(policy.day_end);

    for day in intent.range_start.date().iter_days() {
        if day > last {
            break;
        }
        if is_weekend(day) && !include_weekends {
            continue;
        }

        let day_end = day.and_time(window_end);
        let mut tick_start = day.and_time(window_start);

        while tick_start + tick <= day_end {
            let tick_end = tick_start + tick;
            let is_free = !busy.iter().any(|b| overlaps(tick_start, tick_end, b));

            if is_free && tick_start > now {
                slots.push(CandidateSlot {
                    start: tick_start,
                    end: tick_end,
                    duration_minutes: policy.tick_minutes,
                });
            }
            tick_start = tick_end;
        }
    }

    tracing::debug!(
        "Generated {} slots for {} against {} busy intervals",
        slots.len(),
        intent.time_range,
        busy.len()
    );

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::query::{TimeRange, interpret_query};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn busy(start: &str, end: &str) -> BusyInterval {
        BusyInterval {
            start: at(start),
            end: at(end),
            calendar_id: String::from("primary"),
            label: String::from("Busy"),
            color: String::from("#4285f4"),
        }
    }

    fn starts(slots: &[CandidateSlot]) -> Vec<NaiveDateTime> {
        slots.iter().map(|s| s.start).collect()
    }

    // 2026-10-19 is a Monday
    #[test]
    fn it_excludes_busy_ticks_today() {
        let now = at("2026-10-19 08:00");
        let intent = interpret_query("today", now);
        let events = vec![busy("2026-10-19 10:00", "2026-10-19 10:30")];

        let slots = generate_slots(&events, &intent, &SlotPolicy::default(), now);
        let starts = starts(&slots);

        assert!(!starts.contains(&at("2026-10-19 10:00")));
        assert!(starts.contains(&at("2026-10-19 09:30")));
        assert!(starts.contains(&at("2026-10-19 10:30")));
        // 16 ticks in 09:00-17:00 minus the busy one
        assert_eq!(slots.len(), 15);
        assert_eq!(slots[0].start, at("2026-10-19 09:00"));
        assert_eq!(slots.last().unwrap().end, at("2026-10-19 17:00"));
    }

    #[test]
    fn it_only_returns_ticks_after_now() {
        let now = at("2026-10-19 10:10");
        let intent = interpret_query("today", now);
        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);

        assert_eq!(slots[0].start, at("2026-10-19 10:30"));
        assert!(slots.iter().all(|s| s.start > now));

        // A tick starting exactly now is already underway
        let now = at("2026-10-19 10:30");
        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);
        assert_eq!(slots[0].start, at("2026-10-19 11:00"));
    }

    #[test]
    fn it_never_overlaps_busy_intervals() {
        let now = at("2026-10-19 07:00");
        let intent = interpret_query("next month", now);
        let events = vec![
            busy("2026-10-19 09:15", "2026-10-19 09:45"),
            busy("2026-10-20 00:00", "2026-10-21 00:00"),
            busy("2026-10-22 12:00", "2026-10-22 15:10"),
            busy("2026-10-23 16:59", "2026-10-23 17:00"),
        ];

        let slots = generate_slots(&events, &intent, &SlotPolicy::default(), now);
        assert!(!slots.is_empty());
        for slot in &slots {
            for b in &events {
                assert!(!(slot.start < b.end && slot.end > b.start));
            }
        }
        assert!(!starts(&slots).contains(&at("2026-10-19 09:00")));
        assert!(!starts(&slots).contains(&at("2026-10-19 09:30")));
        assert!(starts(&slots).contains(&at("2026-10-22 15:30")));
        assert!(!slots.iter().any(|s| s.start.date() == at("2026-10-20 00:00").date()));
    }

    #[test]
    fn it_is_idempotent_and_ordered() {
        let now = at("2026-10-19 11:20");
        let intent = interpret_query("a week", now);
        let events = vec![busy("2026-10-21 13:00", "2026-10-21 14:00")];

        let first = generate_slots(&events, &intent, &SlotPolicy::default(), now);
        let second = generate_slots(&events, &intent, &SlotPolicy::default(), now);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn it_includes_weekends_for_week_ranges() {
        let now = at("2026-10-19 07:00");
        let intent = interpret_query("a week", now);
        assert_eq!(intent.time_range, TimeRange::AWeek);

        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);
        assert!(slots.iter().any(|s| is_weekend(s.start.date())));
        // Seven days of 16 ticks, the range end is exclusive
        assert_eq!(slots.len(), 7 * 16);
    }

    #[test]
    fn it_skips_weekends_by_default() {
        let now = at("2026-10-19 07:00");
        let intent = interpret_query("whenever works", now);
        assert_eq!(intent.time_range, TimeRange::Default);

        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);
        assert!(!slots.iter().any(|s| is_weekend(s.start.date())));
        assert_eq!(slots.len(), 5 * 16);
    }

    #[test]
    fn it_covers_only_tomorrow() {
        let now = at("2026-10-19 07:00");
        let intent = interpret_query("tomorrow", now);
        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);

        assert_eq!(slots.len(), 16);
        assert!(slots.iter().all(|s| s.start.date() == at("2026-10-20 00:00").date()));
    }

    #[test]
    fn it_includes_named_weekend_days() {
        let now = at("2026-10-19 07:00");
        let slots = generate_slots(
            &[],
            &interpret_query("next saturday", now),
            &SlotPolicy::default(),
            now,
        );
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].start, at("2026-10-24 09:00"));

        let slots = generate_slots(
            &[],
            &interpret_query("over the weekend", now),
            &SlotPolicy::default(),
            now,
        );
        assert_eq!(slots.len(), 32);
    }

    #[test]
    fn it_applies_time_constraints_to_every_day() {
        let now = at("2026-10-19 07:00");
        let intent = interpret_query("tomorrow", now).with_time_constraints(
            Some(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(15, 45, 0).unwrap()),
        );

        let slots = generate_slots(&[], &intent, &SlotPolicy::default(), now);
        assert_eq!(
            starts(&slots),
            vec![
                at("2026-10-20 14:00"),
                at("2026-10-20 14:30"),
                at("2026-10-20 15:00"),
            ]
        );
        assert!(slots.iter().all(|s| s.duration_minutes == 30));
    }

    #[test]
    fn it_returns_nothing_for_empty_ranges() {
        let now = at("2026-10-19 07:00");
        let mut intent = interpret_query("tomorrow", now);
        intent.range_end = intent.range_start;
        assert!(generate_slots(&[], &intent, &SlotPolicy::default(), now).is_empty());
    }
}
