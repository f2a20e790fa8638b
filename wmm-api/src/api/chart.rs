//! Chord chart endpoints
//!
//! - `GET /api/songs/:id/chart?key=`: a stored song's lyrics rendered in
//!   the selected key (or `NN` for Nashville numbers)
//! - `POST /api/transpose`: the same rendering for caller-supplied lyrics

use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wmm_common::chords::{normalize_key, render_chart, DisplayKey, Lyrics, Note, KEY_CHOICES};
use wmm_common::db::settings::CatalogSettings;
use wmm_common::db::songs;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Display key; defaults to the song's own key
    #[serde(default)]
    pub key: Option<String>,
}

/// A rendered chart and the key selector state
#[derive(Debug, Serialize)]
pub struct ChartView {
    pub original_key: Note,
    pub display_key: DisplayKey,
    /// The display key's enharmonic twin, e.g. `Db` when showing `C#`
    pub enharmonic: Option<Note>,
    pub is_nashville: bool,
    pub has_lyrics: bool,
    pub lyrics: Lyrics,
    pub key_choices: &'static [&'static str],
}

impl ChartView {
    fn render(lyrics: Lyrics, original_key: Note, display_key: DisplayKey) -> Self {
        let rendered = render_chart(&lyrics, original_key, display_key);
        Self {
            original_key,
            display_key,
            enharmonic: display_key.enharmonic_label(),
            is_nashville: display_key.is_nashville(),
            has_lyrics: lyrics.has_content(),
            lyrics: rendered,
            key_choices: &KEY_CHOICES,
        }
    }
}

/// Pick the display key: an explicit non-blank choice wins
fn display_key_for(requested: Option<&str>, original_key: Note) -> DisplayKey {
    match requested.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => DisplayKey::parse(key),
        None => DisplayKey::Key(original_key),
    }
}

/// GET /api/songs/:id/chart
pub async fn song_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<ChartView>> {
    let song = songs::get_song(&state.db, &id).await?;

    let original_key = match song.original_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => normalize_key(key),
        _ => CatalogSettings::load(&state.db).await?.default_song_key,
    };
    let display_key = display_key_for(query.key.as_deref(), original_key);
    debug!("Rendering song {} from {} in {}", id, original_key, display_key);

    let lyrics = Lyrics::from_json(song.lyrics.unwrap_or(Value::Null));
    Ok(Json(ChartView::render(lyrics, original_key, display_key)))
}

#[derive(Debug, Deserialize)]
pub struct TransposeRequest {
    /// A string, an array of lines or an object of sections
    pub lyrics: Value,
    /// Key the lyrics are written in; blank or invalid means `C`
    #[serde(default)]
    pub original_key: Option<String>,
    /// Display key (`NN` for Nashville); defaults to the original key
    #[serde(default)]
    pub key: Option<String>,
}

/// POST /api/transpose
pub async fn transpose(Json(request): Json<TransposeRequest>) -> ApiResult<Json<ChartView>> {
    let original_key = normalize_key(request.original_key.as_deref().unwrap_or(""));
    let display_key = display_key_for(request.key.as_deref(), original_key);
    let lyrics = Lyrics::from_json(request.lyrics);
    Ok(Json(ChartView::render(lyrics, original_key, display_key)))
}

/// Build chart routes
pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs/:id/chart", get(song_chart))
        .route("/api/transpose", post(transpose))
}
