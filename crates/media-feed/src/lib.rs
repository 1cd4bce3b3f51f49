//! Media feed library for browsing and searching the AniList catalog.
//!
//! This library provides a GraphQL media-list source, a pass-through
//! repository, and single-flight aggregators that turn several list queries
//! into immutable snapshots for a presentation layer.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod repository;
pub mod search;
pub mod single_flight;
pub mod source;

#[cfg(test)]
mod test_support;

pub use api::{AniListClient, MediaListRequest, MediaPage, RateLimiter, SearchRequest};
pub use dashboard::{
    Dashboard, DashboardList, DashboardOptions, DashboardPlan, DashboardState, ListState,
    RunStatus,
};
pub use error::{MediaError, NetworkError};
pub use repository::MediaListRepository;
pub use search::{MediaSearch, SearchState};
pub use single_flight::RunId;
pub use source::{MediaListSource, NetworkMediaListSource};
