//! Setlist endpoints

use super::DeletedResponse;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use wmm_common::db::setlists;
use wmm_common::db::{AddSongOutcome, MoveDirection, Setlist, SetlistDetail, SetlistEntry};

#[derive(Debug, Deserialize)]
pub struct CreateSetlistRequest {
    pub name: String,
    /// Seed the new setlist with this song at position 1
    #[serde(default)]
    pub song_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSetlistRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub song_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveEntryRequest {
    pub direction: MoveDirection,
}

/// GET /api/setlists
pub async fn list_setlists(State(state): State<AppState>) -> ApiResult<Json<Vec<Setlist>>> {
    Ok(Json(setlists::list_setlists(&state.db).await?))
}

/// POST /api/setlists
pub async fn create_setlist(
    State(state): State<AppState>,
    Json(request): Json<CreateSetlistRequest>,
) -> ApiResult<(StatusCode, Json<Setlist>)> {
    let setlist =
        setlists::create_setlist(&state.db, &request.name, request.song_id.as_deref()).await?;
    info!("Created setlist '{}' ({})", setlist.name, setlist.guid);
    Ok((StatusCode::CREATED, Json(setlist)))
}

/// GET /api/setlists/:id
pub async fn get_setlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SetlistDetail>> {
    Ok(Json(setlists::get_setlist(&state.db, &id).await?))
}

/// PATCH /api/setlists/:id
pub async fn rename_setlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenameSetlistRequest>,
) -> ApiResult<Json<Setlist>> {
    Ok(Json(setlists::rename_setlist(&state.db, &id, &request.name).await?))
}

/// DELETE /api/setlists/:id
pub async fn delete_setlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    setlists::delete_setlist(&state.db, &id).await?;
    info!("Deleted setlist {}", id);
    Ok(Json(DeletedResponse { success: true }))
}

/// POST /api/setlists/:id/songs
///
/// A song already in the setlist is not an error: the response carries
/// `added: false` and an explanatory message.
pub async fn add_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddSongRequest>,
) -> ApiResult<(StatusCode, Json<AddSongOutcome>)> {
    let outcome = setlists::add_song(&state.db, &id, &request.song_id).await?;
    let status = if outcome.added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// GET /api/setlists/:id/export
pub async fn export_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let text = setlists::export_text(&state.db, &id).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// DELETE /api/setlist-entries/:id
pub async fn remove_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    setlists::remove_entry(&state.db, &id).await?;
    Ok(Json(DeletedResponse { success: true }))
}

/// POST /api/setlist-entries/:id/move
///
/// Returns the setlist's entries in their new order.
pub async fn move_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveEntryRequest>,
) -> ApiResult<Json<Vec<SetlistEntry>>> {
    Ok(Json(setlists::move_entry(&state.db, &id, request.direction).await?))
}

/// Build setlist routes
pub fn setlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/setlists", get(list_setlists).post(create_setlist))
        .route(
            "/api/setlists/:id",
            get(get_setlist).patch(rename_setlist).delete(delete_setlist),
        )
        .route("/api/setlists/:id/songs", post(add_song))
        .route("/api/setlists/:id/export", get(export_text))
        .route("/api/setlist-entries/:id", delete(remove_entry))
        .route("/api/setlist-entries/:id/move", post(move_entry))
}
