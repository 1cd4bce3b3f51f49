//! Media list sources.
//!
//! A source issues exactly one logical query per call. Requests are validated
//! before anything touches the network, so a malformed request never costs a
//! round-trip.

use crate::api::{AniListClient, MediaListRequest, MediaPage, SearchRequest};
use crate::error::MediaError;
use async_trait::async_trait;
use tracing::debug;

/// Catalog query boundary
#[async_trait]
pub trait MediaListSource: Send + Sync {
    /// Fetch one page of media
    async fn fetch(&self, request: &MediaListRequest) -> Result<MediaPage, MediaError>;

    /// Fetch one page of search results
    async fn search(&self, request: &SearchRequest) -> Result<MediaPage, MediaError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Source backed by the AniList GraphQL API
pub struct NetworkMediaListSource {
    client: AniListClient,
}

impl NetworkMediaListSource {
    pub fn new(client: AniListClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaListSource for NetworkMediaListSource {
    async fn fetch(&self, request: &MediaListRequest) -> Result<MediaPage, MediaError> {
        request.validate()?;
        let page = self.client.fetch_media_list(request).await?;
        debug!(items = page.len(), "Media list fetched");
        Ok(page)
    }

    async fn search(&self, request: &SearchRequest) -> Result<MediaPage, MediaError> {
        request.validate()?;
        let page = self.client.search_media(request).await?;
        debug!(items = page.len(), "Search results fetched");
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "anilist"
    }
}
