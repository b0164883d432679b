//! Turns a free-text scheduling request into a `QueryIntent`.
//!
//! Each extraction step runs a fixed, ordered list of rules against the
//! lower-cased text and the first rule that matches wins.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_BUFFER_MINUTES: u32 = 30;

/// Named date range a query resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Tomorrow,
    NextWeek,
    ThisWeek,
    AWeek,
    Today,
    Weekend,
    NextMonth,
    TwoDays,
    ThreeDays,
    FiveDays,
    // No phrase maps to the multi-week labels; they resolve like `Default`
    TwoWeeks,
    ThreeWeeks,
    FourWeeks,
    NextMonday,
    NextTuesday,
    NextWednesday,
    NextThursday,
    NextFriday,
    NextSaturday,
    NextSunday,
    Default,
}

/// Concrete bounds computed for a `TimeRange`. The end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub num_days: u32,
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn days_from(start: NaiveDateTime, days: u32) -> ResolvedRange {
    ResolvedRange {
        start,
        end: start + Duration::days(days as i64),
        num_days: days,
    }
}

/// The next date after `today` that falls on `target`. When today is
/// already `target` this is a week later.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut days_ahead =
        target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64;
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    today + Duration::days(days_ahead)
}

impl TimeRange {
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Tomorrow => "tomorrow",
            TimeRange::NextWeek => "next_week",
            TimeRange::ThisWeek => "this_week",
            TimeRange::AWeek => "a_week",
            TimeRange::Today => "today",
            TimeRange::Weekend => "weekend",
            TimeRange::NextMonth => "next_month",
            TimeRange::TwoDays => "two_days",
            TimeRange::ThreeDays => "three_days",
            TimeRange::FiveDays => "five_days",
            TimeRange::TwoWeeks => "two_weeks",
            TimeRange::ThreeWeeks => "three_weeks",
            TimeRange::FourWeeks => "four_weeks",
            TimeRange::NextMonday => "next_monday",
            TimeRange::NextTuesday => "next_tuesday",
            TimeRange::NextWednesday => "next_wednesday",
            TimeRange::NextThursday => "next_thursday",
            TimeRange::NextFriday => "next_friday",
            TimeRange::NextSaturday => "next_saturday",
            TimeRange::NextSunday => "next_sunday",
            TimeRange::Default => "default",
        }
    }

    /// The weekday targeted by a `next <weekday>` range.
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            TimeRange::NextMonday => Some(Weekday::Mon),
            TimeRange::NextTuesday => Some(Weekday::Tue),
            TimeRange::NextWednesday => Some(Weekday::Wed),
            TimeRange::NextThursday => Some(Weekday::Thu),
            TimeRange::NextFriday => Some(Weekday::Fri),
            TimeRange::NextSaturday => Some(Weekday::Sat),
            TimeRange::NextSunday => Some(Weekday::Sun),
            _ => None,
        }
    }

    /// Whether Saturdays and Sundays inside the range produce slots.
    ///
    /// Ranges spanning whole weeks include them, as do ranges where the
    /// user named the day(s) outright.
    pub fn includes_weekends(&self) -> bool {
        matches!(
            self,
            TimeRange::NextWeek
                | TimeRange::AWeek
                | TimeRange::ThisWeek
                | TimeRange::TwoWeeks
                | TimeRange::ThreeWeeks
                | TimeRange::FourWeeks
                | TimeRange::Weekend
        ) || self.weekday().is_some()
    }

    pub fn resolve(&self, now: NaiveDateTime) -> ResolvedRange {
        let today = start_of_day(now.date());

        if let Some(target) = self.weekday() {
            return days_from(start_of_day(next_weekday(now.date(), target)), 1);
        }

        match self {
            TimeRange::Tomorrow => days_from(today + Duration::days(1), 1),
            TimeRange::NextWeek | TimeRange::ThisWeek | TimeRange::AWeek => days_from(today, 7),
            TimeRange::Today => ResolvedRange {
                start: now,
                end: today + Duration::days(1) - Duration::microseconds(1),
                num_days: 1,
            },
            TimeRange::Weekend => {
                let until_saturday = (Weekday::Sat.num_days_from_monday() as i64
                    - now.weekday().num_days_from_monday() as i64)
                    .rem_euclid(7);
                days_from(today + Duration::days(until_saturday), 2)
            }
            TimeRange::NextMonth => days_from(today, 30),
            TimeRange::TwoDays => days_from(today, 2),
            TimeRange::ThreeDays => days_from(today, 3),
            TimeRange::FiveDays => days_from(today, 5),
            _ => days_from(today, 7),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured form of a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    pub duration_minutes: u32,
    /// Parsed but not applied when generating slots.
    pub buffer_minutes: u32,
    pub time_range: TimeRange,
    pub range_start: NaiveDateTime,
    pub range_end: NaiveDateTime,
    #[serde(with = "hh_mm::option")]
    pub start_time_constraint: Option<NaiveTime>,
    #[serde(with = "hh_mm::option")]
    pub end_time_constraint: Option<NaiveTime>,
    pub num_days: u32,
}

impl QueryIntent {
    /// Returns a copy bounded to the given time-of-day window.
    pub fn with_time_constraints(self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self {
            start_time_constraint: start,
            end_time_constraint: end,
            ..self
        }
    }
}

/// Parse an `HH:MM` time-of-day.
pub fn parse_time_of_day(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| anyhow::anyhow!("Invalid time '{}', expected HH:MM", value))
}

mod hh_mm {
    pub mod option {
        use chrono::NaiveTime;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
                None => serializer.serialize_none(),
            }
        }
    }
}

type Converter = fn(u32) -> Option<u32>;

fn minutes(n: u32) -> Option<u32> {
    Some(n)
}

fn hours(n: u32) -> Option<u32> {
    n.checked_mul(60)
}

static DURATION_PATTERNS: LazyLock<Vec<(Regex, Converter)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(\d+)\s*(?:min|minute|minutes)").expect("Invalid duration pattern"),
            minutes as Converter,
        ),
        (
            Regex::new(r"(\d+)\s*(?:hour|hours)").expect("Invalid duration pattern"),
            hours as Converter,
        ),
        (
            Regex::new(r"(\d+)\s*(?:hr|hrs)").expect("Invalid duration pattern"),
            hours as Converter,
        ),
    ]
});

static BUFFER_PATTERNS: LazyLock<Vec<(Regex, Converter)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(\d+)\s*(?:min|minute|minutes?)\s*(?:break|buffer)")
                .expect("Invalid buffer pattern"),
            minutes as Converter,
        ),
        (
            Regex::new(r"(\d+)\s*(?:hour|hours?)\s*(?:break|buffer)")
                .expect("Invalid buffer pattern"),
            hours as Converter,
        ),
    ]
});

static NO_BUFFER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"no\s+break").expect("Invalid buffer pattern"),
        Regex::new(r"no\s+buffer").expect("Invalid buffer pattern"),
    ]
});

fn first_quantity(text: &str, patterns: &[(Regex, Converter)]) -> Option<u32> {
    patterns.iter().find_map(|(re, convert)| {
        let caps = re.captures(text)?;
        let n: u32 = caps.get(1)?.as_str().parse().ok()?;
        convert(n)
    })
}

/// Meeting length in minutes. Expects lower-cased text.
pub fn extract_duration(text: &str) -> u32 {
    first_quantity(text, &DURATION_PATTERNS)
        .filter(|minutes| *minutes > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Break between meetings in minutes. Expects lower-cased text.
pub fn extract_buffer(text: &str) -> u32 {
    if let Some(buffer) = first_quantity(text, &BUFFER_PATTERNS) {
        return buffer;
    }
    if NO_BUFFER_PATTERNS.iter().any(|re| re.is_match(text)) {
        return 0;
    }
    DEFAULT_BUFFER_MINUTES
}

/// Keyword groups checked in order, first hit decides the range.
pub const RANGE_RULES: &[(&[&str], TimeRange)] = &[
    (&["tomorrow"], TimeRange::Tomorrow),
    (&["next week"], TimeRange::NextWeek),
    (&["this week"], TimeRange::ThisWeek),
    (&["a week", "one week", "7 days"], TimeRange::AWeek),
    (&["today"], TimeRange::Today),
    (&["weekend"], TimeRange::Weekend),
    (&["next month"], TimeRange::NextMonth),
    (&["2 days", "two days"], TimeRange::TwoDays),
    (&["3 days", "three days"], TimeRange::ThreeDays),
    (&["5 days", "five days"], TimeRange::FiveDays),
    (&["next monday"], TimeRange::NextMonday),
    (&["next tuesday"], TimeRange::NextTuesday),
    (&["next wednesday"], TimeRange::NextWednesday),
    (&["next thursday"], TimeRange::NextThursday),
    (&["next friday"], TimeRange::NextFriday),
    (&["next saturday"], TimeRange::NextSaturday),
    (&["next sunday"], TimeRange::NextSunday),
];

/// Range label for lower-cased text.
pub fn match_time_range(text: &str) -> TimeRange {
    RANGE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, range)| *range)
        .unwrap_or(TimeRange::Default)
}

pub fn interpret_query(text: &str, now: NaiveDateTime) -> QueryIntent {
    let text = text.to_lowercase();
    let time_range = match_time_range(&text);
    let ResolvedRange {
        start,
        end,
        num_days,
    } = time_range.resolve(now);

    tracing::debug!(
        "Resolved '{}' to {} ({} to {})",
        text,
        time_range,
        start,
        end
    );

    QueryIntent {
        duration_minutes: extract_duration(&text),
        buffer_minutes: extract_buffer(&text),
        time_range,
        range_start: start,
        range_end: end,
        start_time_constraint: None,
        end_time_constraint: None,
        num_days,
    }
}
