//! Public types for the calendar API
use serde::{Deserialize, Serialize};

pub use crate::scheduling::CalendarEvent;

#[derive(Deserialize)]
pub struct EventsQuery {
    pub email: Option<String>,
}

/// Bounds accept a date, a naive timestamp or one with an offset/`Z`.
#[derive(Deserialize)]
pub struct EventsRangeRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct EventsResponse {
    pub success: bool,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventsResponse {
    pub fn ok(events: Vec<CalendarEvent>) -> Self {
        Self {
            success: true,
            events,
            error: None,
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            success: false,
            events: vec![],
            error: Some(error.to_string()),
        }
    }
}
