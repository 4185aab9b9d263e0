//! # Configuration Module
//!
//! Loads runtime settings from the process environment (and `.env`, if
//! present). Everything is read once at startup; the workflow itself only
//! ever sees the capabilities and [`ResearchOptions`] built from it.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm::LlmProvider;
use crate::search::tavily::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::search::{SearchDepth, SearchOptions, TavilyClient, MAX_RESULTS_LIMIT};
use crate::workflow::steps::{ResearchOptions, DEFAULT_MAX_ITERATIONS};

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the research agent.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which LLM backend to use
    pub provider: LlmProvider,

    /// Model override; `None` means the provider's default model
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f64,

    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,

    /// Results requested per search round
    pub max_search_results: u32,
    pub search_depth: SearchDepth,

    /// Research rounds before the evaluator stops the loop
    pub max_research_rounds: u32,

    /// HTTP timeout for search requests, in seconds
    pub request_timeout_secs: u64,
}

// =============================================================================
// DEFAULT IMPLEMENTATION
// =============================================================================
impl Default for Config {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: None,
            temperature: 0.1,
            google_api_key: None,
            openai_api_key: None,
            ollama_host: "http://localhost:11434".to_string(),
            tavily_api_key: None,
            tavily_base_url: DEFAULT_BASE_URL.to_string(),
            max_search_results: 5,
            search_depth: SearchDepth::Advanced,
            max_research_rounds: DEFAULT_MAX_ITERATIONS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Example
    /// ```ignore
    /// let config = Config::from_env()?;
    /// config.validate()?;
    /// ```
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key/value source.
    ///
    /// Unset and blank values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(val) = get("LLM_PROVIDER") {
            config.provider = val
                .parse()
                .context("LLM_PROVIDER must be one of gemini, openai, ollama")?;
        }

        if let Some(val) = get("LLM_MODEL") {
            config.model = Some(val);
        }

        if let Some(val) = get("TEMPERATURE") {
            config.temperature = val
                .trim()
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.1)")?;
        }

        config.google_api_key = get("GOOGLE_API_KEY");
        config.openai_api_key = get("OPENAI_API_KEY");
        config.tavily_api_key = get("TAVILY_API_KEY");

        if let Some(val) = get("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Some(val) = get("TAVILY_API_BASE_URL") {
            config.tavily_base_url = val;
        }

        if let Some(val) = get("MAX_SEARCH_RESULTS") {
            config.max_search_results = val
                .trim()
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Some(val) = get("SEARCH_DEPTH") {
            config.search_depth = val.parse().context("SEARCH_DEPTH must be basic or advanced")?;
        }

        if let Some(val) = get("MAX_RESEARCH_ROUNDS") {
            config.max_research_rounds = val
                .trim()
                .parse()
                .context("MAX_RESEARCH_ROUNDS must be a valid positive integer")?;
        }

        if let Some(val) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = val
                .trim()
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;
        }

        Ok(config)
    }

    /// Effective model name
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Validate the configuration.
    ///
    /// Fails fast on anything that would otherwise surface mid-run.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_search_results) {
            bail!(
                "MAX_SEARCH_RESULTS must be between 1 and {}, got: {}",
                MAX_RESULTS_LIMIT,
                self.max_search_results
            );
        }

        if self.max_research_rounds == 0 {
            bail!("MAX_RESEARCH_ROUNDS must be at least 1");
        }

        if self.model().trim().is_empty() {
            bail!("LLM_MODEL cannot be empty");
        }

        match self.provider {
            LlmProvider::Gemini if self.google_api_key.is_none() => {
                bail!("GOOGLE_API_KEY is required for the gemini provider")
            }
            LlmProvider::Openai if self.openai_api_key.is_none() => {
                bail!("OPENAI_API_KEY is required for the openai provider")
            }
            _ => {}
        }

        if self.tavily_api_key.is_none() {
            bail!("TAVILY_API_KEY is required for web search");
        }

        Ok(())
    }

    /// Workflow options derived from this configuration.
    ///
    /// The step ceiling grows with the round limit, so a validated config
    /// always runs to a report.
    pub fn research_options(&self) -> ResearchOptions {
        ResearchOptions::default()
            .with_search(SearchOptions::new(self.max_search_results, self.search_depth))
            .with_max_iterations(self.max_research_rounds)
    }

    /// Construct the Tavily search client
    pub fn build_search(&self) -> Result<TavilyClient> {
        let key = self
            .tavily_api_key
            .clone()
            .context("TAVILY_API_KEY environment variable not set")?;

        Ok(TavilyClient::new(key)
            .with_base_url(&self.tavily_base_url)
            .with_timeout(Duration::from_secs(self.request_timeout_secs)))
    }
}
