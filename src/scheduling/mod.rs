//! Query interpretation and free slot computation.

pub mod cache;
pub mod calendar;
pub mod events;
pub mod insights;
pub mod query;
pub mod slots;

pub use cache::EventCache;
pub use calendar::{CalendarSource, CalendarSummary, collect_events};
pub use events::{BusyInterval, CalendarEvent, TimeMode, normalize_events};
pub use insights::{Insights, QueryMemory};
pub use query::{QueryIntent, TimeRange, interpret_query, parse_time_of_day};
pub use slots::{CandidateSlot, SlotPolicy, generate_slots};
