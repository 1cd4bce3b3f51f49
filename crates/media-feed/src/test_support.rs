//! In-memory source for aggregator tests.

use crate::api::{Media, MediaListRequest, MediaPage, MediaTitle, SearchRequest};
use crate::error::{MediaError, NetworkError};
use crate::source::MediaListSource;
use async_trait::async_trait;
use shared::MediaType;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Deterministic source: every request maps to a page derived from its
/// parameters, so expected results can be rebuilt from the request alone
pub struct FakeSource {
    list_calls: Mutex<Vec<MediaListRequest>>,
    search_calls: Mutex<Vec<SearchRequest>>,
    fail_list: Option<Predicate<MediaListRequest>>,
    hold_type: Option<MediaType>,
    gate: Arc<Semaphore>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            list_calls: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
            fail_list: None,
            hold_type: None,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Fail list requests matching `predicate` with a network error
    pub fn failing_when(
        mut self,
        predicate: impl Fn(&MediaListRequest) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_list = Some(Box::new(predicate));
        self
    }

    /// Block every request for `media_type` until [`FakeSource::release`]
    pub fn holding(mut self, media_type: MediaType) -> Self {
        self.hold_type = Some(media_type);
        self
    }

    pub fn release(&self) {
        self.gate.add_permits(1_000);
    }

    pub fn list_calls(&self) -> Vec<MediaListRequest> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.search_calls.lock().unwrap().clone()
    }

    async fn wait_if_held(&self, media_type: MediaType) {
        if self.hold_type == Some(media_type) {
            let _permit = self.gate.acquire().await;
        }
    }
}

pub fn page_for(request: &MediaListRequest) -> MediaPage {
    let label = format!(
        "{} {:?} {:?}",
        request.media_type,
        request.sort,
        request.season_filter()
    );
    page_titled(label)
}

pub fn search_page_for(request: &SearchRequest) -> MediaPage {
    page_titled(format!("{} search {}", request.media_type, request.query.trim()))
}

fn page_titled(label: String) -> MediaPage {
    MediaPage {
        page_info: None,
        media: vec![Media {
            id: label.len() as i64,
            title: Some(MediaTitle {
                romaji: Some(label),
                english: None,
                native: None,
            }),
            cover_image: None,
            banner_image: None,
            season: None,
            season_year: None,
            average_score: None,
        }],
    }
}

#[async_trait]
impl MediaListSource for FakeSource {
    async fn fetch(&self, request: &MediaListRequest) -> Result<MediaPage, MediaError> {
        request.validate()?;
        self.list_calls.lock().unwrap().push(request.clone());
        self.wait_if_held(request.media_type).await;

        if self.fail_list.as_ref().map_or(false, |fail| fail(request)) {
            return Err(NetworkError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            }
            .into());
        }
        Ok(page_for(request))
    }

    async fn search(&self, request: &SearchRequest) -> Result<MediaPage, MediaError> {
        request.validate()?;
        self.search_calls.lock().unwrap().push(request.clone());
        self.wait_if_held(request.media_type).await;
        Ok(search_page_for(request))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
