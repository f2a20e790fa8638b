//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Full song row
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub guid: String,
    pub external_id: Option<String>,
    pub title: String,
    pub artist: Option<String>,
    pub authors: Vec<String>,
    pub song_map: Option<String>,
    pub tempo: Option<String>,
    pub time_signature: Option<String>,
    pub meter: Option<String>,
    pub style: Option<String>,
    pub theme: Option<String>,
    pub original_key: Option<String>,
    pub lyrics: Option<Value>,
    pub tags: Vec<Value>,
    pub audio_path: Option<String>,
    pub pdf_path: Option<String>,
    pub json_path: Option<String>,
    pub is_custom: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Catalog list row
#[derive(Debug, Clone, Serialize)]
pub struct SongSummary {
    pub guid: String,
    pub title: String,
    pub artist: Option<String>,
    pub original_key: Option<String>,
    pub theme: Option<String>,
    pub is_custom: bool,
}

/// Song form input
///
/// Optional fields that are blank after trimming are stored as NULL.
/// `authors` is a comma-separated list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSong {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub song_map: Option<String>,
    #[serde(default)]
    pub tempo: Option<String>,
    #[serde(default)]
    pub time_signature: Option<String>,
    #[serde(default)]
    pub meter: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub original_key: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub tags: Vec<Value>,
}

/// Column searched by the catalog `q` filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    Title,
    Artist,
    Theme,
    Lyrics,
}

impl SearchField {
    pub fn column(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Artist => "artist",
            SearchField::Theme => "theme",
            SearchField::Lyrics => "lyrics",
        }
    }
}

/// Catalog list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub field: SearchField,
    #[serde(default)]
    pub letter: Option<String>,
}

/// One catalog page
#[derive(Debug, Clone, Serialize)]
pub struct SongPage {
    pub songs: Vec<SongSummary>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Setlist {
    pub guid: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A song's place in a setlist
#[derive(Debug, Clone, Serialize)]
pub struct SetlistEntry {
    pub guid: String,
    pub setlist_id: String,
    pub song_id: String,
    pub position: i64,
    pub title: String,
    pub artist: Option<String>,
    pub original_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetlistDetail {
    #[serde(flatten)]
    pub setlist: Setlist,
    pub entries: Vec<SetlistEntry>,
}

/// Result of adding a song to a setlist
#[derive(Debug, Clone, Serialize)]
pub struct AddSongOutcome {
    pub added: bool,
    pub message: String,
    pub entry: Option<SetlistEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub guid: String,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub event_type: Option<String>,
    pub notes: Option<String>,
    pub setlist_id: Option<String>,
    pub setlist_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Event form input (create and full update)
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setlist_id: Option<String>,
}

/// A member's role on one event
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub guid: String,
    pub event_id: String,
    pub member_id: String,
    pub member_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub guid: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// An event a member is rostered on
#[derive(Debug, Clone, Serialize)]
pub struct RosteredEvent {
    pub guid: String,
    pub name: String,
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub setlist_id: Option<String>,
    pub setlist_name: Option<String>,
    /// The linked setlist's songs in order
    pub songs: Vec<SetlistEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberRoster {
    #[serde(flatten)]
    pub member: Member,
    pub events: Vec<RosteredEvent>,
}

/// Trim an optional form value, mapping blank to `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
