//! Search capability
//!
//! A search provider turns a query into an ordered list of documents, each
//! carrying at least a URL and its textual content.

pub mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub use tavily::TavilyClient;

/// Upper bound accepted by the Tavily API
pub const MAX_RESULTS_LIMIT: u32 = 20;

/// Search depth
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results
    Basic,
    /// More thorough search with detailed results
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for SearchDepth {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            other => Err(SearchError::Config(format!(
                "unknown search depth '{}' (expected basic or advanced)",
                other
            ))),
        }
    }
}

/// Per-call search settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results to return
    pub max_results: u32,
    pub depth: SearchDepth,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            depth: SearchDepth::Advanced,
        }
    }
}

impl SearchOptions {
    pub fn new(max_results: u32, depth: SearchDepth) -> Self {
        Self { max_results, depth }
    }

    /// Result count clamped to what the API accepts
    pub fn clamped_max_results(&self) -> u32 {
        self.max_results.clamp(1, MAX_RESULTS_LIMIT)
    }
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    /// Extracted page content/snippet
    pub content: String,
    /// Relevance score (0-1)
    pub score: f64,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: content.into(),
            score: 0.0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Normalized evidence line that downstream synthesis can cite
    pub fn to_evidence(&self) -> String {
        format!("SOURCE ({}): {}", self.url, self.content)
    }
}

/// Provider-agnostic web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query, returning results in relevance order
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
