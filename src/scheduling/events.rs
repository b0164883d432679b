//! Normalizes calendar event bounds into naive local busy intervals.
//!
//! Google returns either an all-day `date` or a zoned `dateTime` for
//! each bound. Everything downstream compares naive wall-clock values
//! so the offset is either dropped or, in `TimeMode::Local`, used to
//! convert the instant into the host's zone first.

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A flattened event record as returned by the calendar collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub calendar_id: String,
    pub calendar_name: String,
    pub calendar_color: String,
}

/// An occupied span of time taken from a calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub calendar_id: String,
    pub label: String,
    pub color: String,
}

/// How zoned timestamps are turned into naive values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeMode {
    /// Keep the wall-clock reading and drop the offset.
    #[default]
    Naive,
    /// Convert the instant into the host's local timezone.
    Local,
}

impl FromStr for TimeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "naive" => Ok(TimeMode::Naive),
            "local" => Ok(TimeMode::Local),
            other => bail!("Unknown time mode '{}', expected 'naive' or 'local'", other),
        }
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Parse a single event bound into a naive timestamp.
///
/// Values containing a `T` are timestamps, everything else is treated
/// as a `YYYY-MM-DD` date starting at midnight.
pub fn parse_event_time(value: &str, mode: TimeMode) -> Result<NaiveDateTime> {
    let value = value.trim();

    if !value.contains('T') {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| anyhow!("Invalid date '{}': {}", value, e))?;
        return Ok(date.and_time(NaiveTime::MIN));
    }

    let value = match value.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };

    let zoned = DateTime::parse_from_rfc3339(&value).ok().or_else(|| {
        ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(&value, fmt).ok())
    });
    if let Some(zoned) = zoned {
        return Ok(match mode {
            TimeMode::Naive => zoned.naive_local(),
            TimeMode::Local => zoned.with_timezone(&Local).naive_local(),
        });
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        .ok_or_else(|| anyhow!("Invalid timestamp '{}'", value))
}

pub fn to_busy_interval(event: &CalendarEvent, mode: TimeMode) -> Result<BusyInterval> {
    let start = parse_event_time(&event.start, mode)?;
    let end = parse_event_time(&event.end, mode)?;
    if start > end {
        bail!("Event '{}' ends before it starts", event.summary);
    }

    Ok(BusyInterval {
        start,
        end,
        calendar_id: event.calendar_id.clone(),
        label: event.summary.clone(),
        color: event.calendar_color.clone(),
    })
}

/// Convert every event that can be parsed, skipping the rest.
pub fn normalize_events(events: &[CalendarEvent], mode: TimeMode) -> Vec<BusyInterval> {
    events
        .iter()
        .filter_map(|event| match to_busy_interval(event, mode) {
            Ok(interval) => Some(interval),
            Err(e) => {
                tracing::warn!("Skipping event from {}: {}", event.calendar_id, e);
                None
            }
        })
        .collect()
}
