//! AniList GraphQL client implementation.
//!
//! This module provides a rate-limited, retry-enabled client for the AniList
//! media catalog, together with the query documents it sends and the payload
//! types it decodes.

pub mod client;
pub mod query;
pub mod rate_limiter;
pub mod types;

pub use client::AniListClient;
pub use query::{MediaListRequest, SearchRequest};
pub use rate_limiter::RateLimiter;
pub use types::*;
