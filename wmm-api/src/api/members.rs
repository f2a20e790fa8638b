//! Member endpoints

use super::DeletedResponse;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::info;
use wmm_common::db::members;
use wmm_common::db::{Member, MemberRoster, NewMember};

/// GET /api/members
///
/// Each member carries the events they are rostered on.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<MemberRoster>>> {
    Ok(Json(members::list_members(&state.db).await?))
}

/// POST /api/members
pub async fn create_member(
    State(state): State<AppState>,
    Json(new): Json<NewMember>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let member = members::create_member(&state.db, &new).await?;
    info!("Added member '{}' ({})", member.name, member.guid);
    Ok((StatusCode::CREATED, Json(member)))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    members::delete_member(&state.db, &id).await?;
    info!("Deleted member {}", id);
    Ok(Json(DeletedResponse { success: true }))
}

/// Build member routes
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/api/members", get(list_members).post(create_member))
        .route("/api/members/:id", delete(delete_member))
}
