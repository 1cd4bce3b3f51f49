//! Catalog search session.
//!
//! Each keystroke-level `search` call supersedes the previous one, exactly
//! like a dashboard refresh. A blank query clears the results without a
//! network call.

use crate::api::SearchRequest;
use crate::dashboard::ListState;
use crate::error::NetworkError;
use crate::repository::MediaListRepository;
use crate::single_flight::{RunId, SingleFlight};
use shared::MediaType;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Search results snapshot
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub run: Option<RunId>,
    pub media_type: Option<MediaType>,
    /// Trimmed query; empty when cleared
    pub query: String,
    pub results: ListState,
}

struct Shared {
    repository: MediaListRepository,
    query_timeout: Option<Duration>,
    flight: SingleFlight,
    state_tx: watch::Sender<Arc<SearchState>>,
}

impl Shared {
    async fn execute(self: Arc<Self>, run: RunId, request: SearchRequest) {
        let query = self.repository.search_media(&request);
        let result = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .unwrap_or_else(|_| Err(NetworkError::Timeout.into())),
            None => query.await,
        };

        match &result {
            Ok(page) => debug!(%run, results = page.len(), "Search finished"),
            Err(e) => warn!(%run, query = %request.query, error = %e, "Search failed"),
        }

        let state = SearchState {
            run: Some(run),
            media_type: Some(request.media_type),
            query: request.query,
            results: result.into(),
        };
        let published = self.flight.publish_if_current(run, || {
            self.state_tx.send_replace(Arc::new(state));
        });
        if !published {
            debug!(%run, "Search superseded, results discarded");
        }
    }
}

/// Single-flight catalog search
pub struct MediaSearch {
    shared: Arc<Shared>,
}

impl MediaSearch {
    pub fn new(
        repository: MediaListRepository,
        executor: Handle,
        query_timeout: Option<Duration>,
    ) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(SearchState::default()));
        Self {
            shared: Arc::new(Shared {
                repository,
                query_timeout,
                flight: SingleFlight::new(executor),
                state_tx,
            }),
        }
    }

    /// Search for `query`, superseding any search in flight
    ///
    /// Returns `None` when the query is blank and the results were cleared.
    pub fn search(&self, media_type: MediaType, query: &str) -> Option<RunId> {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return None;
        }

        let request = SearchRequest::new(media_type, query);
        let shared = &self.shared;
        let (run, superseded) = shared.flight.launch(|run| {
            shared.state_tx.send_replace(Arc::new(SearchState {
                run: Some(run),
                media_type: Some(media_type),
                query: request.query.clone(),
                results: ListState::Pending,
            }));
            Arc::clone(shared).execute(run, request)
        });

        info!(%run, superseded = ?superseded, %media_type, query, "Search started");
        Some(run)
    }

    /// Cancel any search in flight and drop the results
    pub fn clear(&self) {
        let state_tx = &self.shared.state_tx;
        self.shared.flight.cancel(|cancelled| {
            if let Some(run) = cancelled {
                debug!(%run, "Search cancelled");
            }
            state_tx.send_replace(Arc::new(SearchState::default()));
        });
    }

    pub fn state(&self) -> Arc<SearchState> {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SearchState>> {
        self.shared.state_tx.subscribe()
    }

    pub fn is_searching(&self) -> bool {
        self.shared.flight.is_running()
    }
}

impl Drop for MediaSearch {
    fn drop(&mut self) {
        self.shared.flight.cancel(|_| {});
    }
}
