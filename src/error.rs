//! Error types for the research agent
//!
//! Each capability boundary has its own error enum. Only [`ResearchError`]
//! can abort a run; generation failures are absorbed by the step that made
//! the call.

use thiserror::Error;

use crate::workflow::graph::StepKind;

/// Failure of the text-generation capability.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Create a request error from any displayable provider error
    pub fn request(err: impl std::fmt::Display) -> Self {
        Self::Request(err.to_string())
    }
}

/// Failure of the search capability.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Search configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else if e.is_decode() {
            SearchError::Parse(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

/// Run-aborting errors raised by the controller.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Research topic must not be empty")]
    EmptyTopic,

    #[error("Search failed during research step: {0}")]
    Search(#[from] SearchError),

    #[error("Routing error after {from}: no target for '{label}'")]
    Routing { from: StepKind, label: String },

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("Invalid workflow graph: {0}")]
    Graph(#[from] GraphBuildError),
}

impl ResearchError {
    /// Create a routing error
    pub fn routing(from: StepKind, label: impl Into<String>) -> Self {
        Self::Routing {
            from,
            label: label.into(),
        }
    }
}

/// Errors that can occur while building a workflow graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphBuildError {
    #[error("workflow entry point not set")]
    NoEntryPoint,

    #[error("step {0} has no outgoing edge")]
    MissingEdge(StepKind),

    #[error("step {0} has more than one outgoing edge rule")]
    DuplicateEdge(StepKind),

    #[error("conditional edge from {0} declares no branches")]
    EmptyBranches(StepKind),
}

/// Errors while exporting run artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
