//! Database initialization against a real file

use tempfile::TempDir;
use wmm_common::db::init::{init_database, SCHEMA_VERSION};
use wmm_common::db::settings::{get_setting, set_setting, CATALOG_PAGE_SIZE, DEFAULT_SONG_KEY};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("wmm.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("wmm.db")).await.unwrap();

    for table in [
        "schema_version",
        "settings",
        "songs",
        "setlists",
        "setlist_songs",
        "events",
        "members",
        "assignments",
        "event_members",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Table {} missing", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_reopen_keeps_settings() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("wmm.db");

    let pool = init_database(&db_path).await.unwrap();
    let page_size: Option<i64> = get_setting(&pool, CATALOG_PAGE_SIZE).await.unwrap();
    assert_eq!(page_size, Some(15));

    set_setting(&pool, DEFAULT_SONG_KEY, "Eb").await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let key: Option<String> = get_setting(&pool, DEFAULT_SONG_KEY).await.unwrap();
    assert_eq!(key.as_deref(), Some("Eb"));
}
