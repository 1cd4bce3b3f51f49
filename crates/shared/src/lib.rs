//! Shared library for the media-feed workspace.
//!
//! This crate provides common functionality used by the feed crates:
//! - Configuration management
//! - Logging infrastructure
//! - Catalog vocabulary (media types, sort keys, seasons)
//! - Season calculation

pub mod config;
pub mod logging;
pub mod models;
pub mod season;

// Re-export commonly used types
pub use config::Config;
pub use logging::{LogConfig, LogGuard};
pub use models::*;
pub use season::{next_season, season_of};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
