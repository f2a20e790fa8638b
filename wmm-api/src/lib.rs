//! wmm-api library interface
//!
//! HTTP service for the Worship Ministry Manager: song catalog with chord
//! chart rendering, setlists, events and members. Exposed as a library so
//! integration tests can drive the router directly.

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wmm_common::assets::AssetStore;

/// One-line build identification: version, commit, build time and profile
pub fn build_id() -> String {
    format!(
        "v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Song audio, PDFs and manifests
    pub assets: AssetStore,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, assets: AssetStore) -> Self {
        Self {
            db,
            assets,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(state.assets.root().to_path_buf());

    Router::new()
        .merge(api::song_routes())
        .merge(api::chart_routes())
        .merge(api::setlist_routes())
        .merge(api::event_routes())
        .merge(api::member_routes())
        .merge(api::health_routes())
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_names_version_and_profile() {
        let id = build_id();
        assert!(id.starts_with(&format!("v{} [", env!("CARGO_PKG_VERSION"))));
        assert!(id.ends_with(&format!("({})", env!("BUILD_PROFILE"))));
        assert!(!env!("GIT_HASH").is_empty());
        assert!(!env!("BUILD_TIMESTAMP").is_empty());
    }
}
