//! Media list repository.
//!
//! Thin indirection between the aggregators and whichever source backs
//! them; it forwards every call unchanged.

use crate::api::{MediaListRequest, MediaPage, SearchRequest};
use crate::error::MediaError;
use crate::source::MediaListSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct MediaListRepository {
    source: Arc<dyn MediaListSource>,
}

impl MediaListRepository {
    pub fn new(source: Arc<dyn MediaListSource>) -> Self {
        Self { source }
    }

    pub async fn fetch_media_list(
        &self,
        request: &MediaListRequest,
    ) -> Result<MediaPage, MediaError> {
        self.source.fetch(request).await
    }

    pub async fn search_media(&self, request: &SearchRequest) -> Result<MediaPage, MediaError> {
        self.source.search(request).await
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}
