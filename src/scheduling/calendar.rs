//! Seam between slot finding and whatever provides calendar data.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::future::join_all;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::events::CalendarEvent;

pub const DEFAULT_CALENDAR_NAME: &str = "Unknown Calendar";
pub const DEFAULT_CALENDAR_COLOR: &str = "#4285f4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub id: String,
    pub display_name: String,
    pub color: String,
}

#[async_trait]
pub trait CalendarSource {
    async fn list_calendars(&self) -> Result<Vec<CalendarSummary>>;

    async fn list_events(
        &self,
        calendar: &CalendarSummary,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Fetch events from every calendar, sorted by start.
///
/// A calendar that fails to load is logged and left out.
pub async fn collect_events<S>(
    source: &S,
    calendars: &[CalendarSummary],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<CalendarEvent>
where
    S: CalendarSource + Sync + ?Sized,
{
    let fetches = calendars.iter().map(|calendar| async move {
        match source.list_events(calendar, start, end).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(
                    "Failed fetching events from {}: {}",
                    calendar.display_name,
                    e
                );
                vec![]
            }
        }
    });

    join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .sorted_by(|a, b| a.start.cmp(&b.start))
        .collect()
}
