//! Text-generation capability
//!
//! The workflow only ever needs "prompt in, text out", so the boundary is a
//! single-method trait. Concrete providers are Rig agents wrapped in
//! [`RigGenerator`]; tests substitute scripted fakes.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      workflow step fns       │
//! └──────────────┬───────────────┘
//!                │ generate(prompt)
//!                ▼
//! ┌──────────────────────────────┐
//! │   TextGenerator (trait)      │
//! └──────────────┬───────────────┘
//!                │ implemented by
//!                ▼
//! ┌──────────────────────────────┐
//! │   RigGenerator<M>            │
//! │   (wraps rig Agent<M>)       │
//! └──────────────┬───────────────┘
//!       ┌────────┼─────────┐
//!       ▼        ▼         ▼
//!    Gemini   OpenAI    Ollama
//! ```

mod rig_adapter;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::{gemini, ollama, openai};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::LlmError;

pub use rig_adapter::RigGenerator;

/// Provider-agnostic text generation.
///
/// Implementations must be safe to share across tasks; the controller holds
/// one instance for the whole process.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier for logging
    fn model(&self) -> &str;
}

/// Supported LLM providers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini via GOOGLE_API_KEY
    #[default]
    #[value(alias = "google")]
    Gemini,
    /// OpenAI via OPENAI_API_KEY
    Openai,
    /// Local models via an Ollama server
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Openai => "openai",
            LlmProvider::Ollama => "ollama",
        }
    }

    /// Model used when none is configured explicitly
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.5-flash",
            LlmProvider::Openai => "gpt-4.1",
            LlmProvider::Ollama => "llama3.2",
        }
    }

    /// Whether the provider needs an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::Openai),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(LlmError::Config(format!(
                "unknown LLM provider '{}' (expected gemini, openai or ollama)",
                other
            ))),
        }
    }
}

/// Build the process-wide text generator described by `config`.
///
/// Call once at startup and inject the result into the controller.
///
/// # Side effects
///
/// For [`LlmProvider::Ollama`] this sets the `OLLAMA_API_BASE_URL`
/// environment variable to `config.ollama_host`, because Rig's Ollama client
/// only takes its base URL from the environment. Call it before spawning
/// threads that read the environment, not from inside concurrent tasks.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let model = config.model().to_string();
    debug!(provider = %config.provider, model = %model, "Building text generator");

    match config.provider {
        LlmProvider::Gemini => {
            let key = config.google_api_key.clone().ok_or_else(|| {
                LlmError::Config("GOOGLE_API_KEY environment variable not set".to_string())
            })?;
            let agent = gemini::Client::from_val(key.into())
                .agent(&model)
                .temperature(config.temperature)
                .build();
            Ok(Arc::new(RigGenerator::with_names(agent, "gemini", model)))
        }
        LlmProvider::Openai => {
            let key = config.openai_api_key.clone().ok_or_else(|| {
                LlmError::Config("OPENAI_API_KEY environment variable not set".to_string())
            })?;
            let agent = openai::Client::from_val(key.into())
                .agent(&model)
                .temperature(config.temperature)
                .build();
            Ok(Arc::new(RigGenerator::with_names(agent, "openai", model)))
        }
        LlmProvider::Ollama => {
            std::env::set_var("OLLAMA_API_BASE_URL", &config.ollama_host);
            let agent = ollama::Client::from_env()
                .agent(&model)
                .temperature(config.temperature)
                .build();
            Ok(Arc::new(RigGenerator::with_names(agent, "ollama", model)))
        }
    }
}
