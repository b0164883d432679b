//! Router for the calendar API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::events::{accounts_for, cached_events};
use crate::api::state::AppState;
use crate::google::fetch_events;
use crate::scheduling::events::parse_event_time;

type SharedState = Arc<RwLock<AppState>>;

/// Events across all calendars, served from the cache while fresh
async fn events_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::EventsQuery>,
) -> Result<Json<public::EventsResponse>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let accounts = accounts_for(&db, params.email).await?;
    let events = cached_events(&state, &accounts).await;

    Ok(Json(public::EventsResponse::ok(events)))
}

/// Events for an explicit range, always fetched fresh
async fn events_range_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::EventsRangeRequest>,
) -> Result<Json<public::EventsResponse>, crate::api::public::ApiError> {
    let (Some(start_date), Some(end_date)) = (payload.start_date, payload.end_date) else {
        return Ok(Json(public::EventsResponse::failed(
            "Start and end dates required",
        )));
    };

    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };

    let bounds = parse_event_time(&start_date, config.time_mode)
        .and_then(|start| Ok((start, parse_event_time(&end_date, config.time_mode)?)));
    let (start, end) = match bounds {
        Ok(bounds) => bounds,
        Err(e) => return Ok(Json(public::EventsResponse::failed(&e.to_string()))),
    };

    let accounts = accounts_for(&db, payload.email).await?;
    let events = fetch_events(&config, &db, &accounts, start, end).await;

    Ok(Json(public::EventsResponse::ok(events)))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events", axum::routing::get(events_handler))
        .route("/events/range", axum::routing::post(events_range_handler))
}
