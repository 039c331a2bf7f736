//! HTTP handlers for the collector API.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde_json::Value;

use super::api::{EventResponse, EventsQuery};
use super::store::EventStore;
use crate::dashboard::render::{render_events, render_org_stats};
use crate::dashboard::{
    render_page, OrgStats, StatsSummary, EVENTS_LIST, ORG_STATS_CONTAINER, STAT_MATCH, STAT_NEW,
    STAT_SPOOFING, STAT_TOTAL,
};
use crate::display;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Received events.
    pub store: EventStore,
    /// Events returned when no `limit` is given.
    pub default_limit: usize,
}

impl AppState {
    #[must_use]
    pub fn new(store: EventStore, default_limit: usize) -> Self {
        Self {
            store,
            default_limit,
        }
    }
}

/// POST /api/event - Receive one detection event.
pub async fn post_event(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<EventResponse>) {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected event body");
            return (
                StatusCode::BAD_REQUEST,
                Json(EventResponse::error(rejection.body_text())),
            );
        }
    };

    match state.store.record(event).await {
        Ok(stored) => {
            display::print_event_received(&stored);
            (StatusCode::OK, Json(EventResponse::success()))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected event");
            (StatusCode::BAD_REQUEST, Json(EventResponse::error(e.to_string())))
        }
    }
}

/// GET /api/events - Most recent events, newest first.
///
/// A missing or unparseable `limit` falls back to the default.
pub async fn get_events(
    State(state): State<AppState>,
    query: Option<Query<EventsQuery>>,
) -> Json<Vec<Value>> {
    let limit = query
        .and_then(|Query(query)| query.limit)
        .unwrap_or(state.default_limit);
    Json(state.store.recent(limit).await)
}

/// GET /api/stats - Totals per event type.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSummary> {
    Json(state.store.stats().await)
}

/// GET /api/org-stats - Report counts per reporting organization.
pub async fn get_org_stats(State(state): State<AppState>) -> Json<OrgStats> {
    Json(state.store.org_stats().await)
}

/// GET / - Dashboard page rendered from the current store.
pub async fn get_index(State(state): State<AppState>) -> Html<String> {
    let stats = state.store.stats().await;
    let org_stats = state.store.org_stats().await;
    let events = state.store.recent_typed(state.default_limit).await;

    let regions: HashMap<String, String> = [
        (STAT_TOTAL, stats.total.to_string()),
        (STAT_SPOOFING, stats.spoofing.to_string()),
        (STAT_NEW, stats.new_devices.to_string()),
        (STAT_MATCH, stats.matches.to_string()),
        (ORG_STATS_CONTAINER, render_org_stats(&org_stats)),
        (EVENTS_LIST, render_events(&events)),
    ]
    .into_iter()
    .map(|(id, html)| (id.to_string(), html))
    .collect();

    Html(render_page(&regions, None))
}
