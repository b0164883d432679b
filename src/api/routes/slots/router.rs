//! Router for the slots API

use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::{Router, extract::State, response::Json};
use chrono::NaiveTime;

use super::public;
use crate::api::events::{accounts_for, cached_events};
use crate::api::state::AppState;
use crate::scheduling::{generate_slots, interpret_query, normalize_events, parse_time_of_day};

type SharedState = Arc<RwLock<AppState>>;

fn parse_constraint(value: Option<&str>) -> Result<Option<NaiveTime>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(parse_time_of_day)
        .transpose()
}

/// Find open slots for a free-text request
async fn find_slots(
    State(state): State<SharedState>,
    Json(payload): Json<public::FindSlotsRequest>,
) -> Json<public::FindSlotsResponse> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Json(public::FindSlotsResponse::failed("No query provided"));
    }

    let constraints = parse_constraint(payload.start_time.as_deref())
        .and_then(|start| Ok((start, parse_constraint(payload.end_time.as_deref())?)));
    let (start_time, end_time) = match constraints {
        Ok(constraints) => constraints,
        Err(e) => return Json(public::FindSlotsResponse::failed(&e.to_string())),
    };

    let now = chrono::Local::now().naive_local();
    let intent = interpret_query(query, now).with_time_constraints(start_time, end_time);

    let (db, config) = {
        let mut shared_state = state.write().expect("Unable to write shared state");
        shared_state.query_memory.learn(query, &intent, now);
        (shared_state.db.clone(), shared_state.config.clone())
    };

    // A storage failure leaves us with no accounts, so everything is free
    let accounts = accounts_for(&db, payload.email).await.unwrap_or_else(|e| {
        tracing::error!("Failed listing accounts: {}", e);
        vec![]
    });
    let events = cached_events(&state, &accounts).await;

    let busy = normalize_events(&events, config.time_mode);
    let slots = generate_slots(&busy, &intent, &config.slot_policy(), now);
    tracing::info!(
        "Found {} slots for '{}' ({} busy intervals)",
        slots.len(),
        query,
        busy.len()
    );

    let agent_insights = state
        .read()
        .expect("Unable to read shared state")
        .query_memory
        .annotate(query, &intent);

    Json(public::FindSlotsResponse::Found {
        success: true,
        slots: slots.iter().map(public::SlotResponse::from).collect(),
        events,
        intent,
        agent_insights,
    })
}

/// Create the slots router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::post(find_slots))
}
