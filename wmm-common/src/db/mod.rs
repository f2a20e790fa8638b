//! Database schema, models and queries

pub mod events;
pub mod init;
pub mod members;
pub mod models;
pub mod setlists;
pub mod settings;
pub mod songs;

pub use init::*;
pub use models::*;

/// Single-connection in-memory database with the schema applied
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    settings::init_default_settings(&pool).await.unwrap();
    pool
}
