//! Phrase frequency tracking and advisory annotations for responses.
//!
//! Nothing in here changes which slots are returned.

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use super::query::{QueryIntent, TimeRange};

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

const TIME_PATTERNS: [&str; 5] = [
    r"\d+\s*(?:min|minute|hour|hr)s?",
    r"(?:next|this)\s+week",
    r"(?:next|this)\s+month",
    r"today|tomorrow",
    r"a\s+week|one\s+week|7\s+days",
];

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TIME_PATTERNS
        .iter()
        .map(|p| (*p, Regex::new(p).expect("Invalid time pattern")))
        .collect()
});

/// Which known time phrases appear in the query.
pub fn extract_patterns(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    COMPILED_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&query))
        .map(|(name, _)| *name)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    pub query: String,
    pub intent: QueryIntent,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub contextual_message: String,
    pub suggestions: Vec<String>,
    pub patterns_learned: usize,
    pub successful_queries: usize,
}

/// Counts of phrases seen plus a bounded log of recent queries.
#[derive(Debug)]
pub struct QueryMemory {
    pattern_counts: HashMap<&'static str, u64>,
    history: VecDeque<QueryRecord>,
    capacity: usize,
}

impl Default for QueryMemory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl QueryMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            pattern_counts: HashMap::new(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Count the phrases in `query` and remember it, evicting the
    /// oldest entry once the history is full.
    pub fn learn(&mut self, query: &str, intent: &QueryIntent, now: NaiveDateTime) {
        for pattern in extract_patterns(query) {
            *self.pattern_counts.entry(pattern).or_insert(0) += 1;
        }

        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(QueryRecord {
            query: query.to_string(),
            intent: intent.clone(),
            recorded_at: now,
        });
    }

    pub fn pattern_count(&self, pattern: &str) -> u64 {
        self.pattern_counts.get(pattern).copied().unwrap_or(0)
    }

    pub fn patterns_learned(&self) -> usize {
        self.pattern_counts.len()
    }

    pub fn history(&self) -> impl Iterator<Item = &QueryRecord> {
        self.history.iter()
    }

    pub fn annotate(&self, query: &str, intent: &QueryIntent) -> Insights {
        let query = query.to_lowercase();

        let mut contextual_message = if query.contains("urgent") || query.contains("asap") {
            String::from("🚨 I found urgent time slots for you!")
        } else if query.contains("flexible") || query.contains("anytime") {
            String::from("📅 Here are all available flexible time slots!")
        } else if query.contains("meeting") {
            String::from("🤝 Perfect meeting times found!")
        } else if query.contains("call") {
            String::from("📞 Available call slots!")
        } else {
            String::from("⏰ Available time slots found!")
        };

        let suffix = match intent.time_range {
            TimeRange::AWeek => Some(" (Showing next 7 days including weekends)"),
            TimeRange::NextWeek => Some(" (Showing business days of next week)"),
            TimeRange::Today => Some(" (Showing remaining time today)"),
            TimeRange::Tomorrow => Some(" (Showing available slots for tomorrow)"),
            _ => None,
        };
        if let Some(suffix) = suffix {
            contextual_message.push_str(suffix);
        }

        let suggestions = if self.history.is_empty() {
            vec![]
        } else {
            vec![
                String::from("Try asking for specific time ranges like 'between 2 pm and 5 pm'"),
                String::from("You can also specify duration like '1 hour meeting'"),
            ]
        };

        Insights {
            contextual_message,
            suggestions,
            patterns_learned: self.patterns_learned(),
            successful_queries: self.history.len(),
        }
    }
}
