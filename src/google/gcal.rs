//! Google Calendar API v3 client for calendar lists and events.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::scheduling::calendar::{DEFAULT_CALENDAR_COLOR, DEFAULT_CALENDAR_NAME};
use crate::scheduling::{CalendarEvent, CalendarSource, CalendarSummary};

const MAX_RESULTS: &str = "1000";

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    summary: Option<String>,
    background_color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    summary: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
}

/// Either `dateTime` for timed events or `date` for all-day ones.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventDateTime {
    fn value(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

/// Bounds are sent as UTC-marked wall-clock values.
fn format_bound(value: NaiveDateTime) -> String {
    format!("{}Z", value.format("%Y-%m-%dT%H:%M:%S"))
}

pub struct GoogleCalendar {
    client: Client,
    api_url: String,
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(api_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let res = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Calendar request failed: {} ({})", status, text);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarSummary>> {
        let url = format!("{}/users/me/calendarList", self.api_url);
        let resp: CalendarListResponse = self.get(&url, &[]).await?;

        Ok(resp
            .items
            .into_iter()
            .map(|entry| CalendarSummary {
                id: entry.id,
                display_name: entry
                    .summary
                    .unwrap_or_else(|| DEFAULT_CALENDAR_NAME.to_string()),
                color: entry
                    .background_color
                    .unwrap_or_else(|| DEFAULT_CALENDAR_COLOR.to_string()),
            })
            .collect())
    }

    async fn list_events(
        &self,
        calendar: &CalendarSummary,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_url,
            urlencoding::encode(&calendar.id)
        );
        let query = [
            ("timeMin", format_bound(start)),
            ("timeMax", format_bound(end)),
            ("singleEvents", String::from("true")),
            ("orderBy", String::from("startTime")),
            ("maxResults", String::from(MAX_RESULTS)),
        ];
        let resp: EventsResponse = self.get(&url, &query).await?;

        let events = resp
            .items
            .into_iter()
            .filter_map(|event| {
                let start = event.start.and_then(EventDateTime::value)?;
                let end = event.end.and_then(EventDateTime::value)?;
                Some(CalendarEvent {
                    summary: event.summary.unwrap_or_else(|| "No title".to_string()),
                    start,
                    end,
                    calendar_id: calendar.id.clone(),
                    calendar_name: calendar.display_name.clone(),
                    calendar_color: calendar.color.clone(),
                })
            })
            .collect();

        Ok(events)
    }
}
