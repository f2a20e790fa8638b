//! # WMM Common Library
//!
//! Shared code for the Worship Ministry Manager:
//! - Chord chart engine (transposition, Nashville numbers)
//! - Database schema, settings and queries (songs, setlists, events, members)
//! - Bootstrap configuration and root folder resolution
//! - Local asset store for song files
//! - Pagination helpers

pub mod assets;
pub mod chords;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;

pub use error::{Error, Result};
