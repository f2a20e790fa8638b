//! Song catalog queries

use super::models::{non_blank, NewSong, Song, SongPage, SongQuery, SongSummary};
use crate::chords::Lyrics;
use crate::pagination::calculate_pagination;
use crate::{Error, Result};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

const SONG_COLUMNS: &str = r#"
    guid, external_id, title, artist, authors, song_map, tempo, time_signature,
    meter, style, theme, original_key, lyrics, tags, audio_path, pdf_path,
    json_path, is_custom, created_at, updated_at
"#;

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Append the catalog filters as a WHERE clause
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, query: &'a SongQuery) {
    let mut first = true;
    let mut and = |builder: &mut QueryBuilder<'a, Sqlite>| {
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(q) = non_blank(query.q.as_deref()) {
        and(builder);
        builder
            .push(query.field.column())
            .push(" LIKE ")
            .push_bind(format!("%{}%", escape_like(&q)))
            .push(" ESCAPE '\\'");
    }

    if let Some(letter) = non_blank(query.letter.as_deref()) {
        and(builder);
        builder
            .push("title LIKE ")
            .push_bind(format!("{}%", escape_like(&letter)))
            .push(" ESCAPE '\\'");
    }
}

/// One page of the catalog, ordered by title
///
/// `total` and `total_pages` count only the songs matching the filters.
pub async fn list_songs(pool: &SqlitePool, query: &SongQuery, page_size: i64) -> Result<SongPage> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM songs");
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let pagination = calculate_pagination(total, query.page.unwrap_or(1), page_size);

    let mut select = QueryBuilder::<Sqlite>::new(
        "SELECT guid, title, artist, original_key, theme, is_custom FROM songs",
    );
    push_filters(&mut select, query);
    select
        .push(" ORDER BY title COLLATE NOCASE, guid LIMIT ")
        .push_bind(pagination.page_size)
        .push(" OFFSET ")
        .push_bind(pagination.offset);

    let rows = select.build().fetch_all(pool).await?;
    let songs = rows
        .iter()
        .map(|row| SongSummary {
            guid: row.get("guid"),
            title: row.get("title"),
            artist: row.get("artist"),
            original_key: row.get("original_key"),
            theme: row.get("theme"),
            is_custom: row.get("is_custom"),
        })
        .collect();

    Ok(SongPage {
        songs,
        page: pagination.page,
        page_size: pagination.page_size,
        total,
        total_pages: pagination.total_pages,
    })
}

/// Normalize the stored `authors` column to a list of names
///
/// A JSON array keeps its string entries (other scalars are stringified).
/// A JSON string is decoded again in case it holds an encoded array, and
/// otherwise becomes a single author. Anything unparsable is empty.
pub fn normalize_authors(raw: Option<&str>) -> Vec<String> {
    fn from_value(value: Value, depth: u8) -> Vec<String> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Value::String(s) if depth == 0 => match serde_json::from_str::<Value>(&s) {
                Ok(inner) => from_value(inner, depth + 1),
                Err(_) => vec![s],
            },
            Value::String(s) => vec![s],
            Value::Null => Vec::new(),
            other => vec![other.to_string()],
        }
    }

    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => serde_json::from_str::<Value>(text)
            .map(|v| from_value(v, 0))
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

fn parse_json_column(raw: Option<String>) -> Option<Value> {
    raw.and_then(|text| serde_json::from_str(&text).ok())
}

fn song_from_row(row: &SqliteRow) -> Song {
    let authors: Option<String> = row.get("authors");
    let tags = match parse_json_column(row.get("tags")) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    Song {
        guid: row.get("guid"),
        external_id: row.get("external_id"),
        title: row.get("title"),
        artist: row.get("artist"),
        authors: normalize_authors(authors.as_deref()),
        song_map: row.get("song_map"),
        tempo: row.get("tempo"),
        time_signature: row.get("time_signature"),
        meter: row.get("meter"),
        style: row.get("style"),
        theme: row.get("theme"),
        original_key: row.get("original_key"),
        lyrics: parse_json_column(row.get("lyrics")),
        tags,
        audio_path: row.get("audio_path"),
        pdf_path: row.get("pdf_path"),
        json_path: row.get("json_path"),
        is_custom: row.get("is_custom"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn find_song(pool: &SqlitePool, id: &str) -> Result<Option<Song>> {
    let sql = format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(song_from_row))
}

pub async fn get_song(pool: &SqlitePool, id: &str) -> Result<Song> {
    find_song(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Song not found: {}", id)))
}

/// Song that may be deleted: it must exist and have been created here
pub async fn find_deletable_song(pool: &SqlitePool, id: &str) -> Result<Song> {
    let song = find_song(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Song not found".to_string()))?;
    if !song.is_custom {
        return Err(Error::Forbidden(
            "Refusing to delete non-custom song".to_string(),
        ));
    }
    Ok(song)
}

/// Reference links as submitted, trimmed; blanks and non-strings dropped
pub fn clean_links(links: &[Value]) -> Vec<String> {
    links
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect()
}

/// Asset folder for a new song: `songs/<slug>_<millis>`
///
/// The slug is the title with every run of non-alphanumeric characters
/// replaced by `_`, trimmed of leading and trailing `_`.
pub fn song_folder(title: &str, millis: i64) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    let slug = if slug.is_empty() { "song" } else { slug };
    format!("songs/{}_{}", slug, millis)
}

/// Manifest key inside a song folder
pub fn manifest_key(folder: &str) -> String {
    format!("{}/song.json", folder)
}

/// Insert a user-created song
///
/// Title is required. The song is marked custom and given an asset folder
/// derived from its title and `millis`.
pub async fn create_song(pool: &SqlitePool, new: &NewSong, millis: i64) -> Result<Song> {
    let title = non_blank(Some(&new.title))
        .ok_or_else(|| Error::InvalidInput("Title is required".to_string()))?;

    let authors: Vec<String> = new
        .authors
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    let lyrics = new
        .lyrics
        .as_deref()
        .and_then(Lyrics::storage_value)
        .map(|v| v.to_string());

    let folder = song_folder(&title, millis);
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO songs (
            guid, external_id, title, artist, authors, song_map, tempo,
            time_signature, meter, style, theme, original_key, lyrics, tags,
            json_path, is_custom
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(&guid)
    .bind(&folder)
    .bind(&title)
    .bind(non_blank(new.artist.as_deref()))
    .bind(serde_json::to_string(&authors)?)
    .bind(non_blank(new.song_map.as_deref()))
    .bind(non_blank(new.tempo.as_deref()))
    .bind(non_blank(new.time_signature.as_deref()))
    .bind(non_blank(new.meter.as_deref()))
    .bind(non_blank(new.style.as_deref()))
    .bind(non_blank(new.theme.as_deref()))
    .bind(non_blank(new.original_key.as_deref()))
    .bind(lyrics)
    .bind(serde_json::to_string(&clean_links(&new.tags))?)
    .bind(manifest_key(&folder))
    .execute(pool)
    .await?;

    get_song(pool, &guid).await
}

/// Delete the song row; setlist entries cascade. Returns whether a row went.
pub async fn delete_song_row(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
