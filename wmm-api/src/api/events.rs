//! Calendar event endpoints
//!
//! Events live only in the local database; nothing is pushed to an
//! external calendar.

use super::DeletedResponse;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use wmm_common::db::events;
use wmm_common::db::{Assignment, Event, EventInput, Member};

/// Inclusive date range; either end may be omitted
#[derive(Debug, Deserialize)]
pub struct EventRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SetSetlistRequest {
    /// `null` unlinks the setlist
    pub setlist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    pub member_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RosterRequest {
    pub member_ids: Vec<String>,
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(range): Query<EventRange>,
) -> ApiResult<Json<Vec<Event>>> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::BadRequest(format!(
                "Range start {} is after end {}",
                from, to
            )));
        }
    }
    Ok(Json(events::list_events(&state.db, range.from, range.to).await?))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = events::create_event(&state.db, &input).await?;
    info!("Created event '{}' on {} ({})", event.name, event.event_date, event.guid);
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    Ok(Json(events::get_event(&state.db, &id).await?))
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> ApiResult<Json<Event>> {
    Ok(Json(events::update_event(&state.db, &id, &input).await?))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    events::delete_event(&state.db, &id).await?;
    info!("Deleted event {}", id);
    Ok(Json(DeletedResponse { success: true }))
}

/// PUT /api/events/:id/setlist
pub async fn set_setlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetSetlistRequest>,
) -> ApiResult<Json<Event>> {
    Ok(Json(
        events::set_setlist(&state.db, &id, request.setlist_id.as_deref()).await?,
    ))
}

/// GET /api/events/:id/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Assignment>>> {
    events::get_event(&state.db, &id).await?;
    Ok(Json(events::list_assignments(&state.db, &id).await?))
}

/// POST /api/events/:id/assignments
pub async fn add_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let assignment =
        events::add_assignment(&state.db, &id, &request.member_id, &request.role).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/assignments/:id
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    events::remove_assignment(&state.db, &id).await?;
    Ok(Json(DeletedResponse { success: true }))
}

/// GET /api/events/:id/members
pub async fn list_event_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Member>>> {
    events::get_event(&state.db, &id).await?;
    Ok(Json(events::list_event_members(&state.db, &id).await?))
}

/// PUT /api/events/:id/members
///
/// Replaces the whole roster.
pub async fn replace_event_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RosterRequest>,
) -> ApiResult<Json<Vec<Member>>> {
    let roster = events::replace_event_members(&state.db, &id, &request.member_ids).await?;
    info!("Event {} roster now has {} member(s)", id, roster.len());
    Ok(Json(roster))
}

/// Build event routes
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/:id/setlist", put(set_setlist))
        .route(
            "/api/events/:id/assignments",
            get(list_assignments).post(add_assignment),
        )
        .route("/api/assignments/:id", delete(remove_assignment))
        .route(
            "/api/events/:id/members",
            get(list_event_members).put(replace_event_members),
        )
}
