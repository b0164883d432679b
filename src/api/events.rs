//! Loading calendar events for request handlers, through the cache.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use anyhow::Result;
use tokio_rusqlite::Connection;

use crate::api::state::AppState;
use crate::core::db::list_accounts;
use crate::google::{fetch_window, load_account_events, sort_events};
use crate::scheduling::CalendarEvent;

type SharedState = Arc<RwLock<AppState>>;

/// The requested account, or every account with a stored credential.
pub async fn accounts_for(db: &Connection, email: Option<String>) -> Result<Vec<String>> {
    match email {
        Some(email) if !email.trim().is_empty() => Ok(vec![email.trim().to_string()]),
        _ => list_accounts(db).await,
    }
}

/// Events for each account, served from the cache while fresh.
///
/// The lock is released while fetching so two requests missing the
/// cache at once both fetch and the later one overwrites the entry.
pub async fn cached_events(state: &SharedState, accounts: &[String]) -> Vec<CalendarEvent> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };
    let (start, end) = fetch_window(&config, chrono::Local::now().naive_local());

    let mut events = Vec::new();
    for account in accounts {
        let cached = state
            .read()
            .expect("Unable to read shared state")
            .event_cache
            .get(account, Instant::now());
        if let Some(cached) = cached {
            tracing::debug!("Using cached events for {}", account);
            events.extend(cached);
            continue;
        }

        if let Some(found) = load_account_events(&config, &db, account, start, end).await {
            state
                .write()
                .expect("Unable to write shared state")
                .event_cache
                .put(account, found.clone(), Instant::now());
            events.extend(found);
        }
    }

    sort_events(&mut events);
    events
}
