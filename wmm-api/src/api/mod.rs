//! HTTP API handlers for wmm-api

pub mod chart;
pub mod events;
pub mod health;
pub mod members;
pub mod setlists;
pub mod songs;

use serde::Serialize;

pub use chart::chart_routes;
pub use events::event_routes;
pub use health::health_routes;
pub use members::member_routes;
pub use setlists::setlist_routes;
pub use songs::song_routes;

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}
