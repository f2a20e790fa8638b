//! Song catalog endpoints
//!
//! - `GET /api/songs`: paged catalog with search and letter filters
//! - `POST /api/songs`: create a custom song and its asset manifest
//! - `GET /api/songs/:id`: missing asset links are filled from the manifest
//! - `DELETE /api/songs/:id`: custom songs only, assets released first

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use wmm_common::db::settings::CatalogSettings;
use wmm_common::db::songs;
use wmm_common::db::{NewSong, Song, SongPage, SongQuery};

/// JSON manifest written next to a new song's assets
#[derive(Debug, Serialize)]
pub struct SongManifest<'a> {
    pub title: &'a str,
    pub artist: Option<&'a str>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub pdf_path: Option<&'a str>,
    pub audio_path: Option<&'a str>,
    pub authors: &'a [String],
    pub reference_links: &'a [Value],
}

impl<'a> SongManifest<'a> {
    fn for_song(song: &'a Song) -> Self {
        Self {
            title: &song.title,
            artist: song.artist.as_deref(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            pdf_path: song.pdf_path.as_deref(),
            audio_path: song.audio_path.as_deref(),
            authors: &song.authors,
            reference_links: &song.tags,
        }
    }
}

/// Asset links read back from a song manifest
#[derive(Debug, Default, Deserialize)]
struct ManifestLinks {
    #[serde(default)]
    pdf_path: Option<String>,
    #[serde(default)]
    audio_path: Option<String>,
    #[serde(default)]
    reference_links: Vec<Value>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Fill asset links the row lacks from the manifest at `json_path`
///
/// An unreadable manifest leaves the song as stored.
async fn fill_from_manifest(state: &AppState, song: &mut Song) {
    let Some(key) = song.json_path.clone() else {
        return;
    };
    if !is_blank(&song.pdf_path) && !is_blank(&song.audio_path) && !song.tags.is_empty() {
        return;
    }

    let links: ManifestLinks = match state.assets.read_json(&key).await {
        Ok(links) => links,
        Err(e) => {
            warn!("Could not read manifest {} for song {}: {}", key, song.guid, e);
            return;
        }
    };

    if is_blank(&song.pdf_path) {
        song.pdf_path = links.pdf_path.filter(|p| !p.trim().is_empty());
    }
    if is_blank(&song.audio_path) {
        song.audio_path = links.audio_path.filter(|p| !p.trim().is_empty());
    }
    if song.tags.is_empty() {
        song.tags = links.reference_links;
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteSongResponse {
    pub success: bool,
    pub id: String,
    /// Asset keys that were removed from the store
    pub released: Vec<String>,
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<SongPage>> {
    let settings = CatalogSettings::load(&state.db).await?;
    let page = songs::list_songs(&state.db, &query, settings.page_size).await?;
    Ok(Json(page))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    let mut song = songs::get_song(&state.db, &id).await?;
    fill_from_manifest(&state, &mut song).await;
    Ok(Json(song))
}

/// POST /api/songs
///
/// The row is authoritative; a manifest write failure is logged and the
/// song is still returned.
pub async fn create_song(
    State(state): State<AppState>,
    Json(new): Json<NewSong>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let millis = Utc::now().timestamp_millis();
    let song = songs::create_song(&state.db, &new, millis).await?;
    info!("Created custom song '{}' ({})", song.title, song.guid);

    if let Some(key) = &song.json_path {
        if let Err(e) = state.assets.write_json(key, &SongManifest::for_song(&song)).await {
            warn!("Failed to write manifest {} for song {}: {}", key, song.guid, e);
        }
    }

    Ok((StatusCode::CREATED, Json(song)))
}

/// DELETE /api/songs/:id
///
/// Only songs created here (`is_custom`) may be deleted. Asset release
/// failures are logged and do not block the delete.
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteSongResponse>> {
    let song = songs::find_deletable_song(&state.db, &id).await?;

    let mut released = Vec::new();
    let keys = [&song.audio_path, &song.pdf_path, &song.json_path];
    for key in keys.into_iter().flatten() {
        match state.assets.release(key).await {
            Ok(true) => released.push(key.clone()),
            Ok(false) => warn!("Asset {} for song {} was already gone", key, song.guid),
            Err(e) => warn!("Failed to delete asset {}: {}", key, e),
        }
    }

    if !songs::delete_song_row(&state.db, &id).await? {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }
    info!("Deleted custom song '{}' ({})", song.title, song.guid);

    Ok(Json(DeleteSongResponse {
        success: true,
        id,
        released,
    }))
}

/// Build song catalog routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(create_song))
        .route("/api/songs/:id", get(get_song).delete(delete_song))
}
