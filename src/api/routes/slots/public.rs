//! Public types for the slots API
use serde::{Deserialize, Serialize};

use crate::scheduling::{CalendarEvent, CandidateSlot, Insights, QueryIntent};

const SLOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A free-text request such as "30 min call tomorrow". The optional
/// `HH:MM` bounds narrow the daily window.
#[derive(Deserialize)]
pub struct FindSlotsRequest {
    #[serde(default)]
    pub query: String,
    pub email: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SlotResponse {
    pub start_time: String,
    pub end_time: String,
    pub duration: u32,
}

impl From<&CandidateSlot> for SlotResponse {
    fn from(slot: &CandidateSlot) -> Self {
        Self {
            start_time: slot.start.format(SLOT_TIME_FORMAT).to_string(),
            end_time: slot.end.format(SLOT_TIME_FORMAT).to_string(),
            duration: slot.duration_minutes,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum FindSlotsResponse {
    Found {
        success: bool,
        slots: Vec<SlotResponse>,
        events: Vec<CalendarEvent>,
        intent: QueryIntent,
        agent_insights: Insights,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl FindSlotsResponse {
    pub fn failed(error: &str) -> Self {
        FindSlotsResponse::Failed {
            success: false,
            error: error.to_string(),
        }
    }
}
