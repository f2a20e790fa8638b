//! Setlist queries
//!
//! Entries carry a 1-based `position`. New songs go after the current
//! maximum; moving an entry swaps positions with its neighbour.

use super::models::{
    non_blank, AddSongOutcome, MoveDirection, Setlist, SetlistDetail, SetlistEntry,
};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

const ENTRY_SELECT: &str = r#"
    SELECT ss.guid, ss.setlist_id, ss.song_id, ss.position,
           s.title, s.artist, s.original_key
    FROM setlist_songs ss
    JOIN songs s ON s.guid = ss.song_id
"#;

fn setlist_from_row(row: &SqliteRow) -> Setlist {
    Setlist {
        guid: row.get("guid"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn entry_from_row(row: &SqliteRow) -> SetlistEntry {
    SetlistEntry {
        guid: row.get("guid"),
        setlist_id: row.get("setlist_id"),
        song_id: row.get("song_id"),
        position: row.get("position"),
        title: row.get("title"),
        artist: row.get("artist"),
        original_key: row.get("original_key"),
    }
}

fn required_name(name: &str) -> Result<String> {
    non_blank(Some(name)).ok_or_else(|| Error::InvalidInput("Setlist name is required".to_string()))
}

/// All setlists, newest first
pub async fn list_setlists(pool: &SqlitePool) -> Result<Vec<Setlist>> {
    let rows = sqlx::query(
        "SELECT guid, name, created_at, updated_at FROM setlists ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(setlist_from_row).collect())
}

/// Create a setlist, optionally seeding it with its first song
pub async fn create_setlist(
    pool: &SqlitePool,
    name: &str,
    first_song: Option<&str>,
) -> Result<Setlist> {
    let name = required_name(name)?;
    let guid = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;
    sqlx::query("INSERT INTO setlists (guid, name) VALUES (?, ?)")
        .bind(&guid)
        .bind(&name)
        .execute(&mut *tx)
        .await?;

    if let Some(song_id) = first_song {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM songs WHERE guid = ?)")
            .bind(song_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(Error::NotFound(format!("Song not found: {}", song_id)));
        }
        sqlx::query(
            "INSERT INTO setlist_songs (guid, setlist_id, song_id, position) VALUES (?, ?, ?, 1)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&guid)
        .bind(song_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    find_setlist(pool, &guid)
        .await?
        .ok_or_else(|| Error::Internal(format!("Setlist vanished after insert: {}", guid)))
}

pub async fn find_setlist(pool: &SqlitePool, id: &str) -> Result<Option<Setlist>> {
    let row = sqlx::query("SELECT guid, name, created_at, updated_at FROM setlists WHERE guid = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(setlist_from_row))
}

async fn require_setlist(pool: &SqlitePool, id: &str) -> Result<Setlist> {
    find_setlist(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Setlist not found: {}", id)))
}

/// Entries of a setlist ordered by position
pub async fn list_entries(pool: &SqlitePool, setlist_id: &str) -> Result<Vec<SetlistEntry>> {
    let sql = format!("{} WHERE ss.setlist_id = ? ORDER BY ss.position, ss.rowid", ENTRY_SELECT);
    let rows = sqlx::query(&sql).bind(setlist_id).fetch_all(pool).await?;
    Ok(rows.iter().map(entry_from_row).collect())
}

/// Entries of every setlist linked to a rostered event, keyed by setlist
pub async fn rostered_setlist_entries(
    pool: &SqlitePool,
) -> Result<HashMap<String, Vec<SetlistEntry>>> {
    let sql = format!(
        r#"{} WHERE ss.setlist_id IN (
            SELECT DISTINCT e.setlist_id
            FROM event_members em
            JOIN events e ON e.guid = em.event_id
            WHERE e.setlist_id IS NOT NULL
        )
        ORDER BY ss.setlist_id, ss.position, ss.rowid"#,
        ENTRY_SELECT
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut by_setlist: HashMap<String, Vec<SetlistEntry>> = HashMap::new();
    for entry in rows.iter().map(entry_from_row) {
        by_setlist
            .entry(entry.setlist_id.clone())
            .or_default()
            .push(entry);
    }
    Ok(by_setlist)
}

pub async fn get_setlist(pool: &SqlitePool, id: &str) -> Result<SetlistDetail> {
    let setlist = require_setlist(pool, id).await?;
    let entries = list_entries(pool, id).await?;
    Ok(SetlistDetail { setlist, entries })
}

pub async fn rename_setlist(pool: &SqlitePool, id: &str, name: &str) -> Result<Setlist> {
    let name = required_name(name)?;
    let result = sqlx::query(
        "UPDATE setlists SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(&name)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Setlist not found: {}", id)));
    }
    require_setlist(pool, id).await
}

/// Delete a setlist and its entries; events pointing at it are unlinked
pub async fn delete_setlist(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM setlists WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Setlist not found: {}", id)));
    }
    Ok(())
}

async fn find_entry(pool: &SqlitePool, entry_id: &str) -> Result<Option<SetlistEntry>> {
    let sql = format!("{} WHERE ss.guid = ?", ENTRY_SELECT);
    let row = sqlx::query(&sql).bind(entry_id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(entry_from_row))
}

/// Append a song to a setlist unless it is already there
pub async fn add_song(pool: &SqlitePool, setlist_id: &str, song_id: &str) -> Result<AddSongOutcome> {
    require_setlist(pool, setlist_id).await?;

    let song_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM songs WHERE guid = ?)")
        .bind(song_id)
        .fetch_one(pool)
        .await?;
    if !song_exists {
        return Err(Error::NotFound(format!("Song not found: {}", song_id)));
    }

    let mut tx = pool.begin().await?;

    let already: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM setlist_songs WHERE setlist_id = ? AND song_id = ?)",
    )
    .bind(setlist_id)
    .bind(song_id)
    .fetch_one(&mut *tx)
    .await?;
    if already {
        return Ok(AddSongOutcome {
            added: false,
            message: "That song is already in this setlist.".to_string(),
            entry: None,
        });
    }

    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM setlist_songs WHERE setlist_id = ?",
    )
    .bind(setlist_id)
    .fetch_one(&mut *tx)
    .await?;

    let entry_id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO setlist_songs (guid, setlist_id, song_id, position) VALUES (?, ?, ?, ?)")
        .bind(&entry_id)
        .bind(setlist_id)
        .bind(song_id)
        .bind(next_position)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE setlists SET updated_at = CURRENT_TIMESTAMP WHERE guid = ?")
        .bind(setlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(AddSongOutcome {
        added: true,
        message: "Added to setlist!".to_string(),
        entry: find_entry(pool, &entry_id).await?,
    })
}

pub async fn remove_entry(pool: &SqlitePool, entry_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM setlist_songs WHERE guid = ?")
        .bind(entry_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Setlist entry not found: {}", entry_id)));
    }
    Ok(())
}

/// Swap an entry with its neighbour; a no-op at either end
///
/// Returns the setlist's entries after the move.
pub async fn move_entry(
    pool: &SqlitePool,
    entry_id: &str,
    direction: MoveDirection,
) -> Result<Vec<SetlistEntry>> {
    let entry = find_entry(pool, entry_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Setlist entry not found: {}", entry_id)))?;

    let entries = list_entries(pool, &entry.setlist_id).await?;
    let Some(index) = entries.iter().position(|e| e.guid == entry.guid) else {
        return Ok(entries);
    };

    let neighbour = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|i| *i < entries.len()),
    };
    let Some(neighbour) = neighbour.map(|i| &entries[i]) else {
        return Ok(entries);
    };

    let mut tx = pool.begin().await?;
    for (guid, position) in [
        (&entry.guid, neighbour.position),
        (&neighbour.guid, entry.position),
    ] {
        sqlx::query("UPDATE setlist_songs SET position = ? WHERE guid = ?")
            .bind(position)
            .bind(guid)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    list_entries(pool, &entry.setlist_id).await
}

/// Plain-text rendering for sharing a setlist
pub fn format_setlist_text(name: &str, entries: &[SetlistEntry]) -> String {
    let mut lines = vec![format!("Setlist: {}", name), String::new()];
    lines.extend(entries.iter().map(|e| {
        format!(
            "{}. {} ({})",
            e.position,
            e.title,
            e.artist.as_deref().filter(|a| !a.is_empty()).unwrap_or("Unknown")
        )
    }));
    lines.join("\n")
}

pub async fn export_text(pool: &SqlitePool, id: &str) -> Result<String> {
    let detail = get_setlist(pool, id).await?;
    Ok(format_setlist_text(&detail.setlist.name, &detail.entries))
}
