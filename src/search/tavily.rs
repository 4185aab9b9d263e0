//! Tavily Search client
//!
//! Implements [`SearchProvider`] over the Tavily Search API.
//!
//! - Bearer-token auth, JSON request/response
//! - Per-request HTTP timeout
//! - Typed errors per HTTP status
//!
//! Failures are returned as-is, without retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{SearchHit, SearchOptions, SearchProvider};
use crate::error::SearchError;

/// Default Tavily endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Default timeout for Tavily API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tavily Search client
///
/// # Example
/// ```ignore
/// let client = TavilyClient::new("your-api-key");
/// let hits = client.search("Rust async", &SearchOptions::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TavilyClient {
    api_key: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl TavilyClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create from environment variable TAVILY_API_KEY
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| {
            SearchError::Config("TAVILY_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the client at a different endpoint (proxies, mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute_request(&self, request: &TavilyRequest<'_>) -> Result<TavilyResponse, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<TavilyResponse>()
                .await
                .map_err(|e| SearchError::Parse(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Tavily request rejected");

        match status.as_u16() {
            401 => Err(SearchError::Unauthorized),
            429 => Err(SearchError::RateLimited),
            400 => Err(SearchError::BadRequest(error_text)),
            500..=599 => Err(SearchError::ServerError(status.as_u16(), error_text)),
            _ => Err(SearchError::HttpError(status.as_u16(), error_text)),
        }
    }
}

/// Request body for Tavily API
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    topic: &'static str,
    include_answer: bool,
    include_raw_content: bool,
}

/// Response from Tavily API
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

impl From<TavilyResult> for SearchHit {
    fn from(r: TavilyResult) -> Self {
        SearchHit {
            url: r.url,
            title: r.title,
            content: r.content,
            score: r.score,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let request = TavilyRequest {
            query,
            max_results: options.clamped_max_results(),
            search_depth: options.depth.as_str(),
            topic: "general",
            include_answer: false,
            include_raw_content: false,
        };

        debug!(
            query = %query,
            max_results = request.max_results,
            depth = request.search_depth,
            "Executing Tavily search"
        );

        let response = self.execute_request(&request).await?;
        let hits: Vec<SearchHit> = response.results.into_iter().map(SearchHit::from).collect();

        info!(query = %query, count = hits.len(), "Search completed");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
