//! Runtime settings
//!
//! Key/value rows in the `settings` table. Defaults are written at startup
//! so every key is present; readers still fall back to the default when a
//! row is missing or unparsable.

use crate::chords::{normalize_key, Note};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{info, warn};

/// Key used when a song has no `original_key`
pub const DEFAULT_SONG_KEY: &str = "default_song_key";

/// Songs per catalog page
pub const CATALOG_PAGE_SIZE: &str = "catalog_page_size";

/// Write default values for any missing or NULL setting
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, DEFAULT_SONG_KEY, "C").await?;
    ensure_setting(pool, CATALOG_PAGE_SIZE, &DEFAULT_PAGE_SIZE.to_string()).await?;
    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let current: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match current {
        None => {
            // INSERT OR IGNORE tolerates a concurrent initializer
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;
            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

/// Generic setting getter
///
/// Returns `None` if the key doesn't exist.
pub async fn get_setting<T: FromStr>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value.flatten() {
        Some(s) => match s.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter (insert or update)
pub async fn set_setting<T: ToString>(pool: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Settings the catalog reads on every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    pub default_song_key: Note,
    pub page_size: i64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_song_key: Note::C,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogSettings {
    /// Load catalog settings, falling back to defaults for bad values
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let defaults = Self::default();

        let default_song_key = match get_setting::<String>(pool, DEFAULT_SONG_KEY).await? {
            Some(key) => normalize_key(&key),
            None => defaults.default_song_key,
        };

        let page_size = match get_setting::<i64>(pool, CATALOG_PAGE_SIZE).await {
            Ok(Some(size)) if size > 0 => size,
            Ok(_) => defaults.page_size,
            Err(Error::Config(msg)) => {
                warn!("{}, using {}", msg, defaults.page_size);
                defaults.page_size
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            default_song_key,
            page_size,
        })
    }
}
