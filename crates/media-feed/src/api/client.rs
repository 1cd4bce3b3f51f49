//! AniList API client with rate limiting and retry logic.

use super::query::{MediaListRequest, SearchRequest, MEDIA_LIST_QUERY, SEARCH_QUERY};
use super::rate_limiter::RateLimiter;
use super::types::*;
use crate::error::NetworkError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::config::AniListConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// AniList GraphQL client
pub struct AniListClient {
    /// HTTP client
    client: Client,
    /// GraphQL endpoint
    base_url: String,
    /// Rate limiter shared by concurrent queries
    rate_limiter: Mutex<RateLimiter>,
    /// Maximum retries for transient failures
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay_ms: u64,
}

impl AniListClient {
    /// Create a new AniList client
    pub fn new(
        base_url: String,
        user_agent: &str,
        timeout: Duration,
        rate_limiter: RateLimiter,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            rate_limiter: Mutex::new(rate_limiter),
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a client from the `[anilist]` configuration section
    pub fn from_config(config: &AniListConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
            RateLimiter::from_config(&config.rate_limit),
            config.max_retries,
            config.retry_delay_ms,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of media for the given list request
    pub async fn fetch_media_list(
        &self,
        request: &MediaListRequest,
    ) -> Result<MediaPage, NetworkError> {
        info!(
            media_type = %request.media_type,
            page = request.page,
            per_page = request.per_page,
            season = ?request.season_filter(),
            "Fetching media list"
        );
        let data: PageData = self.post(MEDIA_LIST_QUERY, request.variables()).await?;
        Ok(data.page)
    }

    /// Fetch one page of search results
    pub async fn search_media(&self, request: &SearchRequest) -> Result<MediaPage, NetworkError> {
        info!(
            media_type = %request.media_type,
            query = %request.query,
            "Searching catalog"
        );
        let data: PageData = self.post(SEARCH_QUERY, request.variables()).await?;
        Ok(data.page)
    }

    /// POST a GraphQL query with rate limiting and retry logic
    async fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, NetworkError> {
        let body = GraphQlRequest { query, variables };
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.lock().await.acquire().await;

            debug!(url = %self.base_url, attempt = attempt + 1, "Sending GraphQL query");

            match self.send_once(&body).await {
                Ok(data) => {
                    debug!(url = %self.base_url, "Query successful");
                    return Ok(data);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        url = %self.base_url,
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "Query failed, retrying after delay"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        url = %self.base_url,
                        error = %e,
                        attempts = attempt + 1,
                        "Query failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        body: &GraphQlRequest<'_>,
    ) -> Result<T, NetworkError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response.text().await.map_err(classify)?;
        let envelope: GraphQlResponse<T> =
            serde_json::from_str(&text).map_err(|e| NetworkError::Decode(e.to_string()))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            // AniList reports throttling and outages in the body as well
            let status = errors
                .iter()
                .filter_map(|e| e.status)
                .find(|status| *status == 429 || *status >= 500);
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();

            return Err(match status {
                Some(status) => NetworkError::Status {
                    status,
                    body: messages.join(", "),
                },
                None => NetworkError::GraphQl(messages),
            });
        }

        envelope
            .data
            .ok_or_else(|| NetworkError::Decode("response contained no data".to_string()))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(
            self.retry_delay_ms
                .saturating_mul(2u64.saturating_pow(attempt)),
        )
    }
}

fn classify(error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout
    } else {
        NetworkError::Request(error)
    }
}
